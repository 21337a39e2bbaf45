//! Domain entities representing verification state.

pub mod audit;
pub mod lockout;
pub mod otp;
pub mod outcome;
pub mod status;
pub mod verification;

#[cfg(test)]
mod tests;

pub use audit::{AuditLogEntry, AuditResponse, AuditStatus};
pub use lockout::LockoutState;
pub use otp::{OtpChallenge, OTP_COOLDOWN_SECONDS, OTP_LENGTH};
pub use outcome::{
    ConfirmationOutcome, ConnectionTestResult, DenialReason, OtpReceipt, OtpVerifyOutcome,
    SubmissionOutcome,
};
pub use status::{SubjectContact, SubjectStatus, VerifiedStatus};
pub use verification::{FormPayload, RecordStatus, VerificationRecord, VerificationType};
