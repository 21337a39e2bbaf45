//! Attempt-based lockout per subject and verification type
//!
//! Counters for veteran and military verification are independent: a lockout in one
//! type never blocks the other.

mod guard;


pub use guard::LockoutGuard;
