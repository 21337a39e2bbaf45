//! Failed-attempt counter and time-boxed lockout per subject and verification type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LockoutState {
    pub failed_count: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub lockout_until: Option<DateTime<Utc>>,
}

impl LockoutState {
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        matches!(self.lockout_until, Some(until) if now < until)
    }

    /// A lockout was imposed and has since run out
    pub fn has_expired_lockout(&self, now: DateTime<Utc>) -> bool {
        matches!(self.lockout_until, Some(until) if now >= until)
    }

    /// Ceiling of remaining seconds / 60, zero when not locked
    pub fn remaining_minutes(&self, now: DateTime<Utc>) -> i64 {
        match self.lockout_until {
            Some(until) if now < until => {
                let seconds = (until - now).num_seconds().max(1);
                (seconds + 59) / 60
            }
            _ => 0,
        }
    }
}
