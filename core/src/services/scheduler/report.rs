use serde::{Deserialize, Serialize};

/// What happened to one subject during a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStep {
    Approved,
    Denied,
    Retried,
    /// Retries used up; record dropped with a terminal denial
    Exhausted,
    /// Index entry without a usable record
    Dangling,
    NotReady,
    /// Record changed while the confirmation call was in flight
    Stale,
}

/// Per-sweep tally. `processed` counts every indexed subject visited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub processed: usize,
    pub approved: usize,
    pub denied: usize,
    pub retried: usize,
    pub exhausted: usize,
    pub dangling: usize,
    pub skipped_not_ready: usize,
    pub stale: usize,
    pub failed: usize,
}

impl SweepReport {
    pub fn record(&mut self, step: SweepStep) {
        self.processed += 1;
        match step {
            SweepStep::Approved => self.approved += 1,
            SweepStep::Denied => self.denied += 1,
            SweepStep::Retried => self.retried += 1,
            SweepStep::Exhausted => self.exhausted += 1,
            SweepStep::Dangling => self.dangling += 1,
            SweepStep::NotReady => self.skipped_not_ready += 1,
            SweepStep::Stale => self.stale += 1,
        }
    }

    pub fn record_failure(&mut self) {
        self.processed += 1;
        self.failed += 1;
    }

    /// Subjects whose record was resolved or advanced
    pub fn changed(&self) -> usize {
        self.approved + self.denied + self.retried + self.exhausted
    }
}
