use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use mv_shared::config::MilitaryOtpSettings;
use rand::{rngs::OsRng, Rng};
use std::sync::Arc;
use tracing::{debug, info};

use super::EmailPolicy;
use crate::clock::Clock;
use crate::domain::entities::{OtpChallenge, VerificationType, OTP_COOLDOWN_SECONDS, OTP_LENGTH};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::EphemeralCache;
use crate::services::lockout::LockoutGuard;

fn challenge_key(subject_id: &str) -> String {
    format!("otp:{}", subject_id)
}

fn issued_key(subject_id: &str) -> String {
    format!("otp_sent:{}", subject_id)
}

/// OTP state machine per subject: no challenge, issued, then consumed or expired.
///
/// Calls for one subject must be serialized by the caller.
pub struct OtpEngine {
    cache: Arc<dyn EphemeralCache>,
    lockout: Arc<LockoutGuard>,
    clock: Arc<dyn Clock>,
    settings: MilitaryOtpSettings,
    policy: EmailPolicy,
}

impl OtpEngine {
    pub fn new(
        cache: Arc<dyn EphemeralCache>,
        lockout: Arc<LockoutGuard>,
        clock: Arc<dyn Clock>,
        settings: MilitaryOtpSettings,
    ) -> DomainResult<Self> {
        let policy = EmailPolicy::from_settings(&settings)?;
        Ok(Self {
            cache,
            lockout,
            clock,
            settings,
            policy,
        })
    }

    pub fn policy(&self) -> &EmailPolicy {
        &self.policy
    }

    pub fn expiry_minutes(&self) -> u32 {
        self.settings.otp_expiry_minutes
    }

    /// Uniform digit draws from the OS RNG
    pub fn generate_code() -> String {
        let mut rng = OsRng;
        (0..OTP_LENGTH)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }

    /// Issue a new challenge, replacing any live one
    pub async fn generate(&self, subject_id: &str) -> DomainResult<OtpChallenge> {
        let now = self.clock.now();
        let ttl_seconds = u64::from(self.settings.otp_expiry_minutes) * 60;
        let challenge = OtpChallenge {
            code: Self::generate_code(),
            issued_at: now,
            expires_at: now + Duration::minutes(i64::from(self.settings.otp_expiry_minutes)),
        };

        let raw = serde_json::to_string(&challenge)
            .map_err(|e| DomainError::internal(format!("Failed to serialize challenge: {}", e)))?;
        self.cache
            .set_with_ttl(&challenge_key(subject_id), &raw, ttl_seconds)
            .await
            .map_err(DomainError::storage)?;

        // The cooldown stamp must outlive the cooldown even with a very short code TTL
        let issued_ttl = ttl_seconds.max(OTP_COOLDOWN_SECONDS as u64);
        self.cache
            .set_with_ttl(&issued_key(subject_id), &now.to_rfc3339(), issued_ttl)
            .await
            .map_err(DomainError::storage)?;

        info!(subject_id = subject_id, event = "otp_issued", "Verification code issued");
        Ok(challenge)
    }

    /// Validate a submitted code.
    ///
    /// Fails with `LockedOut` before looking at the code when the subject is locked out.
    pub async fn validate(&self, subject_id: &str, input_code: &str) -> DomainResult<bool> {
        self.lockout
            .ensure_not_locked(subject_id, VerificationType::Military)
            .await?;

        let now = self.clock.now();
        let challenge = self.load_challenge(subject_id).await?.filter(|c| !c.is_expired(now));

        let matches = match &challenge {
            Some(challenge) => {
                let input = input_code.trim();
                input.len() == challenge.code.len()
                    && constant_time_eq(input.as_bytes(), challenge.code.as_bytes())
            }
            None => false,
        };

        if matches {
            self.invalidate(subject_id).await?;
            self.lockout
                .record_success(subject_id, VerificationType::Military)
                .await?;
            info!(subject_id = subject_id, event = "otp_verified", "Verification code accepted");
            return Ok(true);
        }

        let attempts = self
            .lockout
            .record_failure(subject_id, VerificationType::Military)
            .await?;
        debug!(
            subject_id = subject_id,
            attempts = attempts,
            had_challenge = challenge.is_some(),
            event = "otp_rejected",
            "Verification code rejected"
        );
        Ok(false)
    }

    /// Drop the live challenge and its cooldown stamp
    pub async fn invalidate(&self, subject_id: &str) -> DomainResult<()> {
        self.cache
            .delete(&challenge_key(subject_id))
            .await
            .map_err(DomainError::storage)?;
        self.cache
            .delete(&issued_key(subject_id))
            .await
            .map_err(DomainError::storage)
    }

    pub async fn can_request(&self, subject_id: &str) -> DomainResult<bool> {
        Ok(self.cooldown_remaining(subject_id).await? == 0)
    }

    /// Seconds until a new code may be requested
    pub async fn cooldown_remaining(&self, subject_id: &str) -> DomainResult<i64> {
        let issued_at = match self.load_issued_at(subject_id).await? {
            Some(issued_at) => issued_at,
            None => return Ok(0),
        };
        let elapsed = (self.clock.now() - issued_at).num_seconds();
        Ok((OTP_COOLDOWN_SECONDS - elapsed).max(0))
    }

    /// Seconds until the live code expires
    pub async fn expiry_remaining(&self, subject_id: &str) -> DomainResult<i64> {
        Ok(self
            .load_challenge(subject_id)
            .await?
            .map(|c| c.seconds_until_expiry(self.clock.now()))
            .unwrap_or(0))
    }

    async fn load_challenge(&self, subject_id: &str) -> DomainResult<Option<OtpChallenge>> {
        let raw = self
            .cache
            .get(&challenge_key(subject_id))
            .await
            .map_err(DomainError::storage)?;
        Ok(raw.and_then(|raw| serde_json::from_str(&raw).ok()))
    }

    async fn load_issued_at(&self, subject_id: &str) -> DomainResult<Option<DateTime<Utc>>> {
        let raw = self
            .cache
            .get(&issued_key(subject_id))
            .await
            .map_err(DomainError::storage)?;
        Ok(raw
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|t| t.with_timezone(&Utc)))
    }
}
