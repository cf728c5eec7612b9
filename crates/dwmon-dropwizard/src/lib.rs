//! Dropwizard metrics input
//!
//! Polls HTTP endpoints serving the JSON written by Dropwizard's
//! `MetricsServlet` and turns gauges, counters, histograms, meters and
//! timers into normalized `dwmon_core::Record`s.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use dwmon_core::MemoryAccumulator;
//! use dwmon_dropwizard::{DropwizardConfig, DropwizardInput};
//!
//! let input = DropwizardInput::new(DropwizardConfig::with_urls(["http://app:8081/metrics"]));
//! let acc = Arc::new(MemoryAccumulator::new());
//! let report = input.gather_pass(acc.clone()).await?;
//! println!("{} records, {} failed endpoints", report.records(), report.errors().len());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod decode;
mod error;
mod fetch;
mod gauge;
mod input;
mod normalize;
pub mod schema;

pub use client::build_client;
pub use config::{DropwizardConfig, TlsConfig, DEFAULT_TIMEOUT, DEFAULT_URL};
pub use decode::{decode_document, decode_reader};
pub use error::{CollectError, Result};
pub use fetch::Fetcher;
pub use gauge::GaugeValue;
pub use input::{DropwizardInput, EndpointOutcome, GatherReport, DESCRIPTION, SAMPLE_CONFIG};
pub use normalize::{normalize, HISTOGRAM_FIELDS, METER_FIELDS, TIMER_FIELDS};
pub use schema::MetricsDocument;

use dwmon_core::{Input, InputRegistry};

/// Name the input is registered under
pub const INPUT_NAME: &str = "dropwizard";

fn create(config: serde_json::Value) -> anyhow::Result<Box<dyn Input>> {
    let config: DropwizardConfig = if config.is_null() {
        DropwizardConfig::default()
    } else {
        serde_json::from_value(config)?
    };
    Ok(Box::new(DropwizardInput::new(config)))
}

/// Add the Dropwizard input to an agent's registry
pub fn register(registry: &mut InputRegistry) {
    registry.add(INPUT_NAME, create);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_create() {
        let mut registry = InputRegistry::new();
        register(&mut registry);
        assert!(registry.contains(INPUT_NAME));

        let input = registry
            .create(INPUT_NAME, serde_json::json!({"urls": ["http://a:8081/metrics"], "timeout": "2s"}))
            .unwrap();
        assert_eq!(input.description(), DESCRIPTION);
    }

    #[test]
    fn test_create_with_empty_section() {
        let mut registry = InputRegistry::new();
        register(&mut registry);
        assert!(registry.create(INPUT_NAME, serde_json::Value::Null).is_ok());
    }

    #[test]
    fn test_create_rejects_bad_timeout() {
        let mut registry = InputRegistry::new();
        register(&mut registry);
        assert!(registry
            .create(INPUT_NAME, serde_json::json!({"timeout": "whenever"}))
            .is_err());
    }
}
