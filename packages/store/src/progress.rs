//! UI-progress seam.
//!
//! Publish/schedule transitions bracket their network calls with a begin
//! and a finish so a shell can show an indeterminate bar. The store talks
//! to an injected reporter; the default does nothing.

use std::sync::Mutex;

pub trait ProgressReporter: Send + Sync {
    fn begin(&self);
    fn finish(&self);
}

#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn begin(&self) {}
    fn finish(&self) {}
}

/// Records bracket events in order, for sequencing assertions
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<ProgressEvent>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    Begin,
    Finish,
}

impl ProgressReporter for RecordingProgress {
    fn begin(&self) {
        self.events.lock().unwrap().push(ProgressEvent::Begin);
    }

    fn finish(&self) {
        self.events.lock().unwrap().push(ProgressEvent::Finish);
    }
}
