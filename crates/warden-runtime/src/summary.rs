//! Per-run outcome counters, logged at the end of every batch.

use tracing::info;

/// Collected per-item outcomes of one batch run. One bad item never
/// aborts the batch; it lands in `errored` instead.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub reminded: usize,
    pub closed: usize,
    pub marked_valid: usize,
    pub hinted: usize,
    pub labeled: usize,
    pub skipped: usize,
    pub errored: usize,
}

impl RunSummary {
    pub fn log(&self) {
        info!(
            processed = self.processed,
            reminded = self.reminded,
            closed = self.closed,
            marked_valid = self.marked_valid,
            hinted = self.hinted,
            labeled = self.labeled,
            skipped = self.skipped,
            errored = self.errored,
            "run complete"
        );
    }
}
