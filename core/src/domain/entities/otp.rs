//! One-time passcode challenge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const OTP_LENGTH: usize = 6;

/// Minimum gap between two issued codes, independent of the code TTL
pub const OTP_COOLDOWN_SECONDS: i64 = 60;

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OtpChallenge {
    pub code: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

// The code never goes to logs.
impl std::fmt::Debug for OtpChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpChallenge")
            .field("code", &"******")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
