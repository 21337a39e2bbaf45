//! Email one-time passcodes for active-duty military verification
//!
//! - Code generation with uniform digit draws and TTL-bounded storage
//! - Fixed 60 second cooldown between issued codes
//! - Constant-time validation gated by the lockout guard
//! - Allow/deny glob patterns and name correlation for candidate addresses

mod email_policy;
mod engine;


pub use email_policy::{glob_to_regex, EmailPolicy};
pub use engine::OtpEngine;
