//! Verified flags and contact details owned by the host's user profile.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A verified flag with the moment it was granted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifiedStatus {
    pub verified_at: DateTime<Utc>,
}

impl VerifiedStatus {
    pub fn new(verified_at: DateTime<Utc>) -> Self {
        Self { verified_at }
    }

    /// `None` (never expires) when the interval is 0 or lands past the last representable date
    pub fn expires_at(&self, reverification_interval_days: u32) -> Option<DateTime<Utc>> {
        if reverification_interval_days == 0 {
            return None;
        }
        self.verified_at
            .checked_add_signed(Duration::days(i64::from(reverification_interval_days)))
    }

    pub fn is_active(&self, now: DateTime<Utc>, reverification_interval_days: u32) -> bool {
        match self.expires_at(reverification_interval_days) {
            None => true,
            Some(expires_at) => now < expires_at,
        }
    }
}

/// Answer to "what is this subject verified as?"
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubjectStatus {
    pub is_veteran: bool,
    pub is_military: bool,
    pub veteran_verified_at: Option<DateTime<Utc>>,
    pub military_verified_at: Option<DateTime<Utc>>,
    pub veteran_expires_at: Option<DateTime<Utc>>,
    pub military_expires_at: Option<DateTime<Utc>>,
    pub has_pending: bool,
}

/// Contact details used to address notifications and correlate names
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubjectContact {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
}

impl SubjectContact {
    /// Name used in a greeting, falling back to "Customer"
    pub fn greeting_name(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            String::from("Customer")
        } else {
            full
        }
    }
}
