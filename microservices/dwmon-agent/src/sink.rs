//! Accumulator handed to each configured input
//!
//! Applies the input's filter, merges the global tags and writes what is
//! left to the output. Per-input errors are logged and counted.

use dwmon_core::{Accumulator, Record, Tags};
use dwmon_telemetry::Counter;
use std::sync::Arc;
use tracing::{error, warn};

use crate::filter::MetricFilter;
use crate::output::LineOutput;

/// Counters shared by every input's sink
#[derive(Clone)]
pub struct SinkStats {
    pub records: Counter,
    pub dropped: Counter,
    pub errors: Counter,
}

impl Default for SinkStats {
    fn default() -> Self {
        Self {
            records: Counter::new("records_written_total"),
            dropped: Counter::new("records_dropped_total"),
            errors: Counter::new("gather_errors_total"),
        }
    }
}

pub struct AgentSink {
    input: String,
    filter: MetricFilter,
    tags: Arc<Tags>,
    output: Arc<LineOutput>,
    stats: SinkStats,
}

impl AgentSink {
    pub fn new(input: &str, filter: MetricFilter, tags: Arc<Tags>, output: Arc<LineOutput>, stats: SinkStats) -> Self {
        Self {
            input: input.to_string(),
            filter,
            tags,
            output,
            stats,
        }
    }

    fn apply_tags(&self, record: &mut Record) {
        if self.tags.is_empty() {
            return;
        }
        let tags = record.tags.get_or_insert_with(Tags::new);
        for (k, v) in self.tags.iter() {
            // tags set by the input win
            tags.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }
}

impl Accumulator for AgentSink {
    fn add_record(&self, record: Record) {
        let Some(mut record) = self.filter.apply(record) else {
            self.stats.dropped.inc();
            return;
        };
        self.apply_tags(&mut record);

        match self.output.write(&record) {
            Ok(true) => self.stats.records.inc(),
            Ok(false) => self.stats.dropped.inc(),
            Err(e) => {
                self.stats.errors.inc();
                error!(input = %self.input, metric = %record.name, error = %e, "Failed to write record");
            }
        }
    }

    fn add_error(&self, err: anyhow::Error) {
        self.stats.errors.inc();
        warn!(input = %self.input, "{:#}", err);
    }
}
