use mv_shared::config::{EncryptionConfig, VerificationSettings};
use mv_shared::validation::{is_valid_email, normalize_email};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::domain::entities::{
    ConfirmationOutcome, ConnectionTestResult, FormPayload, OtpReceipt, OtpVerifyOutcome,
    SubjectContact, SubjectStatus, SubmissionOutcome, VerificationRecord, VerificationType,
    VerifiedStatus,
};
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::repositories::{EphemeralCache, KeyValueStore, ProfileRepository};
use crate::services::audit::AuditLogger;
use crate::services::confirmation::{build_request_body, ConfirmationClient, ConfirmationTransport};
use crate::services::encryption::{build_payload_cipher, KeyManager, PayloadCipher};
use crate::services::lockout::LockoutGuard;
use crate::services::locks::{InFlight, SubjectLocks};
use crate::services::notification::{MailService, Notification, Notifier};
use crate::services::otp::OtpEngine;
use crate::services::queue::VerificationQueue;
use crate::services::scheduler::{RetryScheduler, SweepReport};

/// Host collaborators the core depends on
#[derive(Clone)]
pub struct ServicePorts {
    pub store: Arc<dyn KeyValueStore>,
    pub cache: Arc<dyn EphemeralCache>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub mail: Arc<dyn MailService>,
    pub transport: Arc<dyn ConfirmationTransport>,
    pub clock: Arc<dyn Clock>,
}

/// Diagnostics for the admin surface
#[derive(Debug, Clone, Serialize)]
pub struct EncryptionStatus {
    pub authenticated: bool,
    pub key_source: Option<&'static str>,
    pub self_test_passed: bool,
}

pub struct VerificationService {
    settings: VerificationSettings,
    clock: Arc<dyn Clock>,
    profiles: Arc<dyn ProfileRepository>,
    locks: Arc<SubjectLocks>,
    submissions: InFlight,
    keys: Arc<KeyManager>,
    cipher: Arc<dyn PayloadCipher>,
    queue: Arc<VerificationQueue>,
    lockout: Arc<LockoutGuard>,
    otp: Arc<OtpEngine>,
    client: Arc<ConfirmationClient>,
    notifier: Arc<Notifier>,
    audit: Arc<AuditLogger>,
    scheduler: Arc<RetryScheduler>,
}

impl VerificationService {
    /// Wire every component from the host ports and settings
    pub fn new(
        ports: ServicePorts,
        settings: VerificationSettings,
        encryption: EncryptionConfig,
        site_title: impl Into<String>,
    ) -> DomainResult<Self> {
        let ServicePorts {
            store,
            cache,
            profiles,
            mail,
            transport,
            clock,
        } = ports;

        let locks = Arc::new(SubjectLocks::new());
        let keys = Arc::new(KeyManager::new(store.clone(), encryption));
        let cipher = build_payload_cipher(&settings.general, keys.clone());
        let notifier = Arc::new(Notifier::new(mail, profiles.clone(), site_title));
        let audit = Arc::new(AuditLogger::new(store.clone(), clock.clone(), settings.audit.clone()));
        let queue = Arc::new(VerificationQueue::new(
            store.clone(),
            cipher.clone(),
            clock.clone(),
            settings.queue.clone(),
        ));
        let lockout = Arc::new(LockoutGuard::new(
            store,
            clock.clone(),
            settings.security.clone(),
            Some(notifier.clone()),
        ));
        let otp = Arc::new(OtpEngine::new(
            cache,
            lockout.clone(),
            clock.clone(),
            settings.military_otp.clone(),
        )?);
        let client = Arc::new(ConfirmationClient::new(
            transport,
            audit.clone(),
            settings.va_api.clone(),
        ));
        let scheduler = Arc::new(RetryScheduler::new(
            queue.clone(),
            client.clone(),
            profiles.clone(),
            notifier.clone(),
            audit.clone(),
            locks.clone(),
            clock.clone(),
        ));

        Ok(Self {
            settings,
            clock,
            profiles,
            locks,
            submissions: InFlight::new(),
            keys,
            cipher,
            queue,
            lockout,
            otp,
            client,
            notifier,
            audit,
            scheduler,
        })
    }

    pub fn settings(&self) -> &VerificationSettings {
        &self.settings
    }

    pub fn queue(&self) -> &Arc<VerificationQueue> {
        &self.queue
    }

    pub fn lockout(&self) -> &Arc<LockoutGuard> {
        &self.lockout
    }

    pub fn otp(&self) -> &Arc<OtpEngine> {
        &self.otp
    }

    pub fn audit(&self) -> &Arc<AuditLogger> {
        &self.audit
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn scheduler(&self) -> Arc<RetryScheduler> {
        self.scheduler.clone()
    }

    fn ensure_enabled(&self) -> DomainResult<()> {
        if !self.settings.general.enabled {
            return Err(DomainError::configuration("Verification is disabled"));
        }
        Ok(())
    }

    async fn verified(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
    ) -> DomainResult<Option<VerifiedStatus>> {
        self.profiles
            .get_verified(subject_id, verification_type)
            .await
            .map_err(DomainError::storage)
    }

    async fn is_verified(&self, subject_id: &str, verification_type: VerificationType) -> DomainResult<bool> {
        let interval = self.settings.general.reverification_interval_days;
        let now = self.clock.now();
        Ok(self
            .verified(subject_id, verification_type)
            .await?
            .map_or(false, |status| status.is_active(now, interval)))
    }

    pub async fn get_status(&self, subject_id: &str) -> DomainResult<SubjectStatus> {
        let interval = self.settings.general.reverification_interval_days;
        let now = self.clock.now();

        let veteran = self.verified(subject_id, VerificationType::Veteran).await?;
        let military = self.verified(subject_id, VerificationType::Military).await?;
        let has_pending = {
            let _guard = self.locks.lock(subject_id).await;
            self.queue.peek(subject_id).await?.is_some()
        };

        Ok(SubjectStatus {
            is_veteran: veteran.map_or(false, |s| s.is_active(now, interval)),
            is_military: military.map_or(false, |s| s.is_active(now, interval)),
            veteran_verified_at: veteran.map(|s| s.verified_at),
            military_verified_at: military.map(|s| s.verified_at),
            veteran_expires_at: veteran.and_then(|s| s.expires_at(interval)),
            military_expires_at: military.and_then(|s| s.expires_at(interval)),
            has_pending,
        })
    }

    /// Try to confirm veteran status now; transient failures are queued for the scheduler
    pub async fn submit_veteran_verification(
        &self,
        subject_id: &str,
        payload: FormPayload,
    ) -> DomainResult<SubmissionOutcome> {
        self.ensure_enabled()?;
        if !self.settings.va_api.enabled {
            return Err(DomainError::configuration("Veteran verification is disabled"));
        }
        build_request_body(&payload)?;

        let _claim = self
            .submissions
            .claim(subject_id)
            .ok_or_else(|| DomainError::business_rule("A veteran verification is already in progress"))?;

        {
            let _guard = self.locks.lock(subject_id).await;

            self.lockout
                .ensure_not_locked(subject_id, VerificationType::Veteran)
                .await?;

            if self.is_verified(subject_id, VerificationType::Veteran).await? {
                return Err(DomainError::business_rule("Veteran status is already verified"));
            }
            if self.queue.peek(subject_id).await?.is_some() {
                return Err(DomainError::business_rule(
                    "A veteran verification request is already pending",
                ));
            }
        }

        // The subject lock is not held across the remote call; the claim keeps
        // other submissions for this subject out until the outcome is applied.
        let outcome = self.client.verify(subject_id, &payload).await;
        let _guard = self.locks.lock(subject_id).await;

        match outcome {
            Ok(ConfirmationOutcome::Confirmed) => {
                self.profiles
                    .set_verified(
                        subject_id,
                        VerificationType::Veteran,
                        Some(VerifiedStatus::new(self.clock.now())),
                    )
                    .await
                    .map_err(DomainError::storage)?;
                self.lockout
                    .record_success(subject_id, VerificationType::Veteran)
                    .await?;
                info!(subject_id = subject_id, event = "veteran_verified", "Veteran status confirmed");
                Ok(SubmissionOutcome::Approved)
            }
            Ok(ConfirmationOutcome::NotConfirmed(reason)) if reason.is_transient() => {
                self.enqueue_unless_pending(subject_id, payload).await?;
                Ok(SubmissionOutcome::Queued)
            }
            Ok(ConfirmationOutcome::NotConfirmed(reason)) => {
                let attempts = self
                    .lockout
                    .record_failure(subject_id, VerificationType::Veteran)
                    .await?;
                info!(
                    subject_id = subject_id,
                    reason = %reason,
                    attempts = attempts,
                    event = "veteran_denied",
                    "Veteran status not confirmed"
                );
                Ok(SubmissionOutcome::denied(reason))
            }
            Err(DomainError::Transient { message }) => {
                warn!(
                    subject_id = subject_id,
                    error = %message,
                    event = "veteran_verification_deferred",
                    "Confirmation unavailable, queueing for retry"
                );
                self.enqueue_unless_pending(subject_id, payload).await?;
                Ok(SubmissionOutcome::Queued)
            }
            Err(e) => Err(e),
        }
    }

    /// Caller holds the subject lock
    async fn enqueue_unless_pending(&self, subject_id: &str, payload: FormPayload) -> DomainResult<()> {
        if self.queue.peek(subject_id).await?.is_none() {
            self.queue
                .enqueue(subject_id, VerificationType::Veteran, payload)
                .await?;
        }
        Ok(())
    }

    /// Issue a code and mail it to the address being verified
    pub async fn request_otp(&self, subject_id: &str, email: &str) -> DomainResult<OtpReceipt> {
        self.ensure_enabled()?;
        if !self.settings.military_otp.enabled {
            return Err(DomainError::configuration("Military verification is disabled"));
        }

        let email = normalize_email(email);
        if email.is_empty() {
            return Err(ValidationError::required("email").into());
        }
        if !is_valid_email(&email) {
            return Err(ValidationError::InvalidEmail.into());
        }

        let _guard = self.locks.lock(subject_id).await;

        self.lockout
            .ensure_not_locked(subject_id, VerificationType::Military)
            .await?;

        if self.is_verified(subject_id, VerificationType::Military).await? {
            return Err(DomainError::business_rule("Military status is already verified"));
        }

        let policy = self.otp.policy();
        if !policy.is_eligible_email(&email) {
            return Err(ValidationError::IneligibleEmail.into());
        }

        if policy.name_match().is_required() {
            let contact = self
                .profiles
                .get_contact(subject_id)
                .await
                .map_err(DomainError::storage)?
                .unwrap_or_default();
            let first_name = contact
                .first_name
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| ValidationError::required("first_name"))?;
            let last_name = contact
                .last_name
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| ValidationError::required("last_name"))?;

            if !policy.matches_identity(&email, &first_name, &last_name) {
                return Err(ValidationError::NameMismatch.into());
            }
        }

        if !self.otp.can_request(subject_id).await? {
            return Err(DomainError::CooldownActive {
                remaining_seconds: self.otp.cooldown_remaining(subject_id).await?,
            });
        }

        let challenge = self.otp.generate(subject_id).await?;
        let notification = Notification::Otp {
            code: challenge.code.clone(),
            expiry_minutes: self.otp.expiry_minutes(),
        };

        if let Err(e) = self.notifier.send_to(subject_id, &email, &notification).await {
            // An undelivered code must not hold the cooldown
            self.otp.invalidate(subject_id).await?;
            warn!(subject_id = subject_id, error = %e, event = "otp_delivery_failed", "Failed to send verification code");
            return Err(e);
        }

        Ok(OtpReceipt {
            expires_in_seconds: challenge.seconds_until_expiry(self.clock.now()),
        })
    }

    pub async fn verify_otp(&self, subject_id: &str, code: &str) -> DomainResult<OtpVerifyOutcome> {
        self.ensure_enabled()?;
        if !self.settings.military_otp.enabled {
            return Err(DomainError::configuration("Military verification is disabled"));
        }
        if code.trim().is_empty() {
            return Err(ValidationError::required("code").into());
        }

        let _guard = self.locks.lock(subject_id).await;

        if !self.otp.validate(subject_id, code).await? {
            return Ok(OtpVerifyOutcome::Invalid);
        }

        self.profiles
            .set_verified(
                subject_id,
                VerificationType::Military,
                Some(VerifiedStatus::new(self.clock.now())),
            )
            .await
            .map_err(DomainError::storage)?;
        info!(subject_id = subject_id, event = "military_verified", "Military status verified");
        Ok(OtpVerifyOutcome::Approved)
    }

    /// Administrative override of the verified flag
    pub async fn set_verified(
        &self,
        subject_id: &str,
        verification_type: VerificationType,
        verified: bool,
    ) -> DomainResult<()> {
        let _guard = self.locks.lock(subject_id).await;
        let status = verified.then(|| VerifiedStatus::new(self.clock.now()));
        self.profiles
            .set_verified(subject_id, verification_type, status)
            .await
            .map_err(DomainError::storage)?;

        info!(
            subject_id = subject_id,
            verification_type = %verification_type,
            verified = verified,
            event = "verified_flag_overridden",
            "Verified flag set by administrator"
        );
        Ok(())
    }

    /// Host-side sync of the name and address used for notifications and name matching
    pub async fn update_contact(&self, subject_id: &str, contact: SubjectContact) -> DomainResult<()> {
        let _guard = self.locks.lock(subject_id).await;
        self.profiles
            .set_contact(subject_id, contact)
            .await
            .map_err(DomainError::storage)
    }

    pub async fn cancel_pending(&self, subject_id: &str) -> DomainResult<bool> {
        let _guard = self.locks.lock(subject_id).await;
        let removed = self.queue.remove(subject_id).await?;
        if removed {
            info!(subject_id = subject_id, event = "pending_cancelled", "Pending verification cancelled");
        }
        Ok(removed)
    }

    pub async fn cancel_all_pending(&self) -> DomainResult<usize> {
        let removed = self.queue.cancel_all(&self.locks).await?;
        info!(removed = removed, event = "pending_cancelled_all", "All pending verifications cancelled");
        Ok(removed)
    }

    pub async fn pending_details(&self) -> DomainResult<Vec<VerificationRecord>> {
        self.queue.pending_details(&self.locks).await
    }

    pub async fn unlock(&self, subject_id: &str, verification_type: VerificationType) -> DomainResult<()> {
        let _guard = self.locks.lock(subject_id).await;
        self.lockout.unlock(subject_id, verification_type).await
    }

    pub async fn run_scheduled_sweep(&self) -> DomainResult<Option<SweepReport>> {
        self.scheduler.run_scheduled_sweep().await
    }

    pub async fn run_manual_sweep(&self) -> DomainResult<SweepReport> {
        self.scheduler.run_manual_sweep().await
    }

    pub async fn test_connection(&self) -> ConnectionTestResult {
        self.client.test_connection().await
    }

    pub async fn encryption_status(&self) -> EncryptionStatus {
        let key_source = if self.cipher.is_authenticated() {
            match self.keys.key_source().await {
                Ok(source) => Some(source.as_str()),
                Err(e) => {
                    warn!(error = %e, event = "encryption_key_unavailable", "Encryption key could not be resolved");
                    None
                }
            }
        } else {
            None
        };

        EncryptionStatus {
            authenticated: self.cipher.is_authenticated(),
            key_source,
            self_test_passed: self.cipher.test_encryption().await,
        }
    }
}
