//! Durable queue of pending verification records
//!
//! One encrypted record per subject plus a global index of subjects with pending work.

mod service;

#[cfg(test)]
mod tests;

pub use service::{VerificationQueue, QUEUE_INDEX_KEY};
