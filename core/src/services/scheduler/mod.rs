//! Periodic sweep of the pending verification queue

mod report;
mod sweeper;

pub use report::{SweepReport, SweepStep};
pub use sweeper::RetryScheduler;

#[cfg(test)]
mod tests;
