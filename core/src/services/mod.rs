//! Verification services: the components and the facade that wires them.

pub mod audit;
pub mod confirmation;
pub mod encryption;
pub mod lockout;
pub mod locks;
pub mod notification;
pub mod otp;
pub mod queue;
pub mod scheduler;
pub mod verification;

pub use audit::AuditLogger;
pub use confirmation::{ConfirmationClient, ConfirmationTransport, StubConfirmationTransport};
pub use encryption::{KeyManager, PayloadCipher};
pub use lockout::LockoutGuard;
pub use locks::{InFlight, InFlightClaim, SubjectLocks};
pub use notification::{MailService, Notifier, RecordingMailService};
pub use otp::OtpEngine;
pub use queue::VerificationQueue;
pub use scheduler::{RetryScheduler, SweepReport};
pub use verification::{EncryptionStatus, ServicePorts, VerificationService};
