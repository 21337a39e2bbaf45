//! Host-facing verification operations
//!
//! [`VerificationService`] wires the queue, lockout guard, OTP engine, confirmation
//! client, scheduler and audit log together and exposes the operations the host calls.

mod service;

#[cfg(test)]
mod tests;

pub use service::{EncryptionStatus, ServicePorts, VerificationService};
