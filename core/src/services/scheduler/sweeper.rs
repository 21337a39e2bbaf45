//! Retry scheduler for queued veteran verifications.
//!
//! The confirmation call runs without holding the subject's lock. The outcome is
//! applied under the lock only if the record is still the revision that was sent.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::domain::entities::{
    ConfirmationOutcome, DenialReason, VerificationRecord, VerificationType, VerifiedStatus,
};
use crate::errors::{DomainError, DomainResult, ErrorKind};
use crate::repositories::ProfileRepository;
use crate::services::audit::AuditLogger;
use crate::services::confirmation::ConfirmationClient;
use crate::services::locks::SubjectLocks;
use crate::services::notification::{Notification, Notifier};
use crate::services::queue::VerificationQueue;

use super::{SweepReport, SweepStep};

pub struct RetryScheduler {
    queue: Arc<VerificationQueue>,
    client: Arc<ConfirmationClient>,
    profiles: Arc<dyn ProfileRepository>,
    notifier: Arc<Notifier>,
    audit: Arc<AuditLogger>,
    locks: Arc<SubjectLocks>,
    clock: Arc<dyn Clock>,
    sweep_lock: Mutex<()>,
}

impl RetryScheduler {
    pub fn new(
        queue: Arc<VerificationQueue>,
        client: Arc<ConfirmationClient>,
        profiles: Arc<dyn ProfileRepository>,
        notifier: Arc<Notifier>,
        audit: Arc<AuditLogger>,
        locks: Arc<SubjectLocks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            queue,
            client,
            profiles,
            notifier,
            audit,
            locks,
            clock,
            sweep_lock: Mutex::new(()),
        }
    }

    /// Periodic entry point. Returns `None` when another sweep is still running.
    pub async fn run_scheduled_sweep(&self) -> DomainResult<Option<SweepReport>> {
        let _sweep = match self.sweep_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!(event = "sweep_skipped", "Previous sweep still running, skipping this tick");
                return Ok(None);
            }
        };
        self.sweep().await.map(Some)
    }

    /// Operator-initiated drain; waits for any running sweep to finish first
    pub async fn run_manual_sweep(&self) -> DomainResult<SweepReport> {
        let _sweep = self.sweep_lock.lock().await;
        self.sweep().await
    }

    async fn sweep(&self) -> DomainResult<SweepReport> {
        let mut report = SweepReport::default();

        if !self.client.settings().enabled {
            info!(event = "sweep_disabled", "Veteran confirmation disabled, sweep is a no-op");
            return Ok(report);
        }

        let pending = self.queue.list_pending().await?;
        if pending.is_empty() {
            return Ok(report);
        }

        info!(pending = pending.len(), event = "sweep_started", "Processing pending verifications");

        for subject_id in pending {
            match self.process_subject(&subject_id).await {
                Ok(step) => report.record(step),
                Err(e) => {
                    error!(
                        subject_id = %subject_id,
                        error = %e,
                        event = "sweep_subject_failed",
                        "Failed to process pending verification"
                    );
                    report.record_failure();
                }
            }
        }

        info!(
            processed = report.processed,
            approved = report.approved,
            denied = report.denied,
            retried = report.retried,
            exhausted = report.exhausted,
            failed = report.failed,
            event = "sweep_completed",
            "Sweep completed"
        );
        Ok(report)
    }

    async fn process_subject(&self, subject_id: &str) -> DomainResult<SweepStep> {
        let snapshot = {
            let _guard = self.locks.lock(subject_id).await;
            match self.queue.peek(subject_id).await? {
                Some(record) => record,
                None => {
                    self.queue.remove(subject_id).await?;
                    return Ok(SweepStep::Dangling);
                }
            }
        };

        if !self.queue.is_ready_for_retry(&snapshot) {
            return Ok(SweepStep::NotReady);
        }

        if self.queue.has_exceeded_retries(&snapshot) {
            return self.exhaust(subject_id, &snapshot).await;
        }

        if snapshot.verification_type != VerificationType::Veteran {
            // Email verification is synchronous and never queued
            warn!(
                subject_id = subject_id,
                verification_type = %snapshot.verification_type,
                event = "queue_record_unsupported",
                "Dropping queued record of a type the sweep cannot confirm"
            );
            let _guard = self.locks.lock(subject_id).await;
            self.queue.remove(subject_id).await?;
            return Ok(SweepStep::Dangling);
        }

        let verdict = self.client.verify(subject_id, &snapshot.payload).await;

        let guard = self.locks.lock(subject_id).await;
        if !self.is_current(subject_id, &snapshot).await? {
            return Ok(SweepStep::Stale);
        }

        match verdict {
            Ok(ConfirmationOutcome::Confirmed) => {
                self.profiles
                    .set_verified(
                        subject_id,
                        VerificationType::Veteran,
                        Some(VerifiedStatus::new(self.clock.now())),
                    )
                    .await
                    .map_err(DomainError::storage)?;
                self.queue.remove(subject_id).await?;
                drop(guard);

                info!(subject_id = subject_id, event = "verification_approved", "Queued verification confirmed");
                self.notifier
                    .notify_best_effort(
                        subject_id,
                        &Notification::Approved {
                            verification_type: VerificationType::Veteran,
                        },
                    )
                    .await;
                Ok(SweepStep::Approved)
            }
            Ok(ConfirmationOutcome::NotConfirmed(reason)) if reason.is_transient() => {
                self.queue.increment_retry(subject_id).await?;
                Ok(SweepStep::Retried)
            }
            Ok(ConfirmationOutcome::NotConfirmed(reason)) => {
                self.queue.remove(subject_id).await?;
                drop(guard);

                info!(
                    subject_id = subject_id,
                    reason = %reason,
                    event = "verification_denied",
                    "Queued verification denied"
                );
                self.notify_denied(subject_id, snapshot.verification_type, reason).await;
                Ok(SweepStep::Denied)
            }
            // Retrying cannot fix a missing credential
            Err(e) if e.kind() == ErrorKind::Configuration => Err(e),
            Err(e) => {
                let record = self.queue.increment_retry(subject_id).await?;
                warn!(
                    subject_id = subject_id,
                    retry_count = record.retry_count,
                    error = %e,
                    event = "verification_retry_scheduled",
                    "Confirmation failed, will retry"
                );
                Ok(SweepStep::Retried)
            }
        }
    }

    async fn exhaust(&self, subject_id: &str, snapshot: &VerificationRecord) -> DomainResult<SweepStep> {
        {
            let _guard = self.locks.lock(subject_id).await;
            if !self.is_current(subject_id, snapshot).await? {
                return Ok(SweepStep::Stale);
            }
            self.queue.remove(subject_id).await?;
        }

        warn!(
            subject_id = subject_id,
            retry_count = snapshot.retry_count,
            event = "verification_retries_exhausted",
            "Giving up on queued verification"
        );
        self.notify_denied(subject_id, snapshot.verification_type, DenialReason::MaxRetriesExceeded)
            .await;
        Ok(SweepStep::Exhausted)
    }

    async fn is_current(&self, subject_id: &str, snapshot: &VerificationRecord) -> DomainResult<bool> {
        Ok(matches!(
            self.queue.peek(subject_id).await?,
            Some(current) if current.same_revision(snapshot)
        ))
    }

    async fn notify_denied(&self, subject_id: &str, verification_type: VerificationType, reason: DenialReason) {
        self.notifier
            .notify_best_effort(
                subject_id,
                &Notification::Denied {
                    verification_type,
                    reason,
                },
            )
            .await;
    }

    /// Spawn the periodic trigger: sweep, then prune the audit log, every interval
    pub fn start_background_task(self: Arc<Self>) {
        let interval_secs = self.queue.settings().sweep_interval_secs;
        if interval_secs == 0 {
            warn!("Verification retry scheduler is disabled");
            return;
        }

        tokio::spawn(async move {
            info!(
                interval_secs = interval_secs,
                "Verification retry scheduler started"
            );

            let mut timer = tokio::time::interval(Duration::from_secs(interval_secs));

            loop {
                timer.tick().await;

                if let Err(e) = self.run_scheduled_sweep().await {
                    error!(error = %e, event = "sweep_failed", "Scheduled sweep failed");
                }
                if let Err(e) = self.audit.prune_expired().await {
                    error!(error = %e, event = "audit_prune_failed", "Audit log pruning failed");
                }
            }
        });
    }
}
