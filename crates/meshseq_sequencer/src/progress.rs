// SPDX-License-Identifier: MIT OR Apache-2.0
//! Progress reporting seam.

/// Receives advisory progress while a sequence is processed
pub trait ProgressReporter {
    /// Start a run of `total` steps
    fn begin(&mut self, total: usize);
    /// Report the current step
    fn update(&mut self, current: usize);
    /// Finish the run
    fn end(&mut self);
}

/// Discards all progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn begin(&mut self, _total: usize) {}
    fn update(&mut self, _current: usize) {}
    fn end(&mut self) {}
}

/// Emits progress as `tracing` events
#[derive(Debug, Clone, Default)]
pub struct LogProgress {
    total: usize,
    last_percent: Option<usize>,
}

impl LogProgress {
    /// Create a new reporter
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for LogProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.last_percent = None;
        tracing::debug!("Progress: 0/{total}");
    }

    fn update(&mut self, current: usize) {
        if self.total == 0 {
            return;
        }
        let percent = (current.min(self.total) * 100) / self.total;
        // One event per 10% step
        if self.last_percent.map_or(true, |last| percent / 10 > last / 10) {
            self.last_percent = Some(percent);
            tracing::debug!("Progress: {current}/{} ({percent}%)", self.total);
        }
    }

    fn end(&mut self) {
        tracing::debug!("Progress: done");
    }
}

/// Records every call; used by tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingProgress {
    pub(crate) begun: Vec<usize>,
    pub(crate) updates: Vec<usize>,
    pub(crate) ended: usize,
}

#[cfg(test)]
impl ProgressReporter for RecordingProgress {
    fn begin(&mut self, total: usize) {
        self.begun.push(total);
    }

    fn update(&mut self, current: usize) {
        self.updates.push(current);
    }

    fn end(&mut self) {
        self.ended += 1;
    }
}
