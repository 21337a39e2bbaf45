use chrono::Duration;
use mv_shared::config::SecuritySettings;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::domain::entities::{LockoutState, VerificationType};
use crate::errors::{DomainError, DomainResult};
use crate::repositories::KeyValueStore;
use crate::services::notification::{Notification, Notifier};

fn state_key(subject_id: &str, verification_type: VerificationType) -> String {
    format!("lockout:{}:{}", verification_type.as_str(), subject_id)
}

/// Failed-attempt counter with time-boxed lockout.
///
/// Read-modify-write calls for one subject must be serialized by the caller.
pub struct LockoutGuard {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    settings: SecuritySettings,
    notifier: Option<Arc<Notifier>>,
}

impl LockoutGuard {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        settings: SecuritySettings,
        notifier: Option<Arc<Notifier>>,
    ) -> Self {
        Self {
            store,
            clock,
            settings,
            notifier,
        }
    }

    fn max_attempts(&self, verification_type: VerificationType) -> u32 {
        match verification_type {
            VerificationType::Veteran => self.settings.max_failed_veteran_attempts,
            VerificationType::Military => self.settings.max_failed_military_attempts,
        }
    }

    fn lockout_minutes(&self, verification_type: VerificationType) -> u32 {
        match verification_type {
            VerificationType::Veteran => self.settings.veteran_lockout_minutes,
            VerificationType::Military => self.settings.military_lockout_minutes,
        }
    }

    pub async fn lockout_state(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
    ) -> DomainResult<LockoutState> {
        let raw = self
            .store
            .get(&state_key(subject_id, verification_type))
            .await
            .map_err(DomainError::storage)?;

        match raw {
            None => Ok(LockoutState::default()),
            Some(raw) => Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(
                    subject_id = subject_id,
                    error = %e,
                    event = "lockout_state_corrupted",
                    "Unreadable lockout state, treating as clean"
                );
                LockoutState::default()
            })),
        }
    }

    async fn save_state(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
        state: &LockoutState,
    ) -> DomainResult<()> {
        let raw = serde_json::to_string(state)
            .map_err(|e| DomainError::internal(format!("Failed to serialize lockout state: {}", e)))?;
        self.store
            .set(&state_key(subject_id, verification_type), &raw)
            .await
            .map_err(DomainError::storage)
    }

    pub async fn is_locked_out(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
    ) -> DomainResult<bool> {
        if !self.settings.enable_lockout {
            return Ok(false);
        }
        let state = self.lockout_state(subject_id, verification_type).await?;
        Ok(state.is_locked(self.clock.now()))
    }

    pub async fn get_remaining_minutes(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
    ) -> DomainResult<i64> {
        if !self.settings.enable_lockout {
            return Ok(0);
        }
        let state = self.lockout_state(subject_id, verification_type).await?;
        Ok(state.remaining_minutes(self.clock.now()))
    }

    pub async fn failed_attempts(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
    ) -> DomainResult<u32> {
        Ok(self.lockout_state(subject_id, verification_type).await?.failed_count)
    }

    /// Fail with `LockedOut` when the subject may not attempt this type right now
    pub async fn ensure_not_locked(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
    ) -> DomainResult<()> {
        let remaining_minutes = self.get_remaining_minutes(subject_id, verification_type).await?;
        if remaining_minutes > 0 {
            return Err(DomainError::LockedOut {
                verification_type: verification_type.as_str().to_string(),
                remaining_minutes,
            });
        }
        Ok(())
    }

    /// Count a failed attempt and lock the subject out once the threshold is reached.
    /// Returns the new count.
    pub async fn record_failure(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
    ) -> DomainResult<u32> {
        if !self.settings.enable_lockout {
            return Ok(0);
        }

        let now = self.clock.now();
        let mut state = self.lockout_state(subject_id, verification_type).await?;

        // A lockout that has run out starts the subject over
        if state.has_expired_lockout(now) {
            state = LockoutState::default();
        }

        state.failed_count += 1;
        state.last_attempt_at = Some(now);
        self.save_state(subject_id, verification_type, &state).await?;

        let max_attempts = self.max_attempts(verification_type);
        warn!(
            subject_id = subject_id,
            verification_type = %verification_type,
            attempts = state.failed_count,
            max_attempts = max_attempts,
            event = "verification_attempt_failed",
            "Failed verification attempt recorded"
        );

        if state.failed_count >= max_attempts {
            self.set_lockout(subject_id, verification_type, self.lockout_minutes(verification_type))
                .await?;
        }

        Ok(state.failed_count)
    }

    /// Clear the counter and any lockout for this type only
    pub async fn record_success(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
    ) -> DomainResult<()> {
        self.store
            .delete(&state_key(subject_id, verification_type))
            .await
            .map_err(DomainError::storage)?;
        Ok(())
    }

    pub async fn set_lockout(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
        duration_minutes: u32,
    ) -> DomainResult<()> {
        let now = self.clock.now();
        let mut state = self.lockout_state(subject_id, verification_type).await?;
        state.lockout_until = Some(now + Duration::minutes(i64::from(duration_minutes)));
        self.save_state(subject_id, verification_type, &state).await?;

        info!(
            subject_id = subject_id,
            verification_type = %verification_type,
            duration_minutes = duration_minutes,
            event = "verification_locked_out",
            "Subject locked out of verification"
        );

        if self.settings.send_lockout_notification {
            if let Some(notifier) = &self.notifier {
                notifier
                    .notify_best_effort(
                        subject_id,
                        &Notification::Lockout {
                            verification_type,
                            minutes: duration_minutes,
                        },
                    )
                    .await;
            }
        }
        Ok(())
    }

    /// Administrative override
    pub async fn unlock(&self, subject_id: &str, verification_type: VerificationType) -> DomainResult<()> {
        self.record_success(subject_id, verification_type).await?;
        info!(
            subject_id = subject_id,
            verification_type = %verification_type,
            event = "verification_unlocked",
            "Lockout cleared by administrator"
        );
        Ok(())
    }
}
