//! Metric sink used by input plugins
//!
//! Inputs never talk to outputs directly. They push records and errors into
//! an `Accumulator`; the agent decides what happens next (filtering, global
//! tags, serialization). Implementations are shared by concurrently running
//! pipelines and must be `Send + Sync`.

use parking_lot::Mutex;

use crate::metric::Record;

pub trait Accumulator: Send + Sync {
    /// Accept one normalized record
    fn add_record(&self, record: Record);

    /// Report a non-fatal error raised while gathering
    fn add_error(&self, error: anyhow::Error);
}

/// Accumulator that keeps everything in memory.
///
/// Handy for one-shot collection and for tests.
#[derive(Default)]
pub struct MemoryAccumulator {
    records: Mutex<Vec<Record>>,
    errors: Mutex<Vec<String>>,
}

impl MemoryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Rendered error messages, including their source chain
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    pub fn find(&self, name: &str) -> Vec<Record> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.name == name)
            .cloned()
            .collect()
    }

    pub fn take_records(&self) -> Vec<Record> {
        std::mem::take(&mut *self.records.lock())
    }
}

impl Accumulator for MemoryAccumulator {
    fn add_record(&self, record: Record) {
        self.records.lock().push(record);
    }

    fn add_error(&self, error: anyhow::Error) {
        self.errors.lock().push(format!("{:#}", error));
    }
}
