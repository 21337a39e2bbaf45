//! Audit log of confirmation API exchanges, redacted and capped.

mod logger;

pub use logger::{redact, AuditLogger, AUDIT_LOG_KEY, REDACTED, REDACTED_FIELDS};
