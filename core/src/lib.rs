//! # MilVerify Core
//!
//! Verification orchestration for veteran and active-duty military status:
//! encrypted retry queue, attempt lockout, email OTP, confirmation API client,
//! retry scheduler and audit log. Host collaborators are reached through the
//! port traits in [`repositories`] and [`services`].

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types for convenience
pub use clock::{Clock, MockClock, SystemClock};
pub use domain::entities::{
    FormPayload, SubjectContact, SubjectStatus, SubmissionOutcome, VerificationRecord,
    VerificationType, VerifiedStatus,
};
pub use errors::{DomainError, DomainResult, ErrorKind, ValidationError};
pub use repositories::{EphemeralCache, KeyValueStore, ProfileRepository};
pub use services::{
    ConfirmationTransport, MailService, RetryScheduler, ServicePorts, SweepReport,
    VerificationService,
};
