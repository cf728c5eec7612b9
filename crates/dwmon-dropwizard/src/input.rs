//! Concurrent collection across endpoints
//!
//! Every pass spawns one task per URL running fetch → decode → normalize.
//! Tasks only share the read-only client and the accumulator, a failing
//! endpoint is reported with its URL and never stops its siblings, and the
//! pass returns once every task has finished.

use async_trait::async_trait;
use chrono::Utc;
use dwmon_core::{Accumulator, Input};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::client::build_client;
use crate::config::DropwizardConfig;
use crate::decode::decode_document;
use crate::error::{CollectError, Result};
use crate::fetch::Fetcher;
use crate::normalize::normalize;

pub const DESCRIPTION: &str = "Read Dropwizard-formatted JSON metrics from one or more HTTP endpoints";

pub const SAMPLE_CONFIG: &str = r#"
  ## Works with the Dropwizard metrics servlet out of the box

  ## Endpoints serving Dropwizard-formatted JSON.
  ## Default is "http://localhost:8081/metrics".
  urls:
    - "http://localhost:8081/metrics"

  ## Optional TLS config
  # ssl_ca: "/etc/dwmon/ca.pem"
  # ssl_cert: "/etc/dwmon/cert.pem"
  # ssl_key: "/etc/dwmon/key.pem"
  ## Use TLS but skip chain & host verification
  # insecure_skip_verify: false

  ## HTTP request & response header timeout
  timeout: "10s"
  ## Tighter bound on the wait for response headers only
  # response_header_timeout: "2s"

  ## Filtering is done by the agent, e.g. drop some built-in JVM metrics:
  # namedrop:
  #   - "jvm.classloader*"
  #   - "jvm.buffers*"
  #   - "jvm.gc*"
  #   - "jvm.memory.heap*"
  #   - "jvm.memory.non-heap*"
  #   - "jvm.memory.pools*"
  #   - "jvm.threads*"
  #   - "jvm.attribute.uptime"
  #   - "jvm.filedescriptor"
  #   - "io.dropwizard.jetty.MutableServletContextHandler*"
  #   - "org.eclipse.jetty.util*"

  ## ...or keep only some fields (applies to every metric kind):
  # fieldpass:
  #   - "count"
  #   - "max"
  #   - "p999"
  #   - "m5_rate"
  #   - "value"
"#;

/// Outcome of one endpoint's pipeline
#[derive(Debug, Clone)]
pub struct EndpointOutcome {
    pub url: String,
    pub result: std::result::Result<usize, CollectError>,
    pub elapsed: Duration,
}

impl EndpointOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-endpoint results of one pass
#[derive(Debug, Clone, Default)]
pub struct GatherReport {
    pub endpoints: Vec<EndpointOutcome>,
}

impl GatherReport {
    pub fn records(&self) -> usize {
        self.endpoints
            .iter()
            .filter_map(|e| e.result.as_ref().ok())
            .sum()
    }

    /// Failures, each tagged with its URL
    pub fn errors(&self) -> Vec<&CollectError> {
        self.endpoints
            .iter()
            .filter_map(|e| e.result.as_ref().err())
            .collect()
    }

    pub fn succeeded(&self) -> usize {
        self.endpoints.iter().filter(|e| e.is_ok()).count()
    }

    pub fn outcome(&self, url: &str) -> Option<&EndpointOutcome> {
        self.endpoints.iter().find(|e| e.url == url)
    }
}

/// Dropwizard input: polls every configured endpoint once per pass
pub struct DropwizardInput {
    config: DropwizardConfig,
    urls: Arc<[String]>,
    fetcher: OnceCell<Fetcher>,
}

impl DropwizardInput {
    pub fn new(config: DropwizardConfig) -> Self {
        let urls: Arc<[String]> = config.effective_urls().into();
        Self {
            config,
            urls,
            fetcher: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &DropwizardConfig {
        &self.config
    }

    /// URLs polled on every pass, default substituted
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Shared fetcher, built on first use
    async fn fetcher(&self) -> Result<&Fetcher> {
        self.fetcher
            .get_or_try_init(|| async {
                let client = build_client(&self.config.tls, self.config.timeout)?;
                Ok::<_, CollectError>(Fetcher::new(client, self.config.header_timeout()))
            })
            .await
    }

    /// Run one collection pass.
    ///
    /// Only fails when the HTTP client cannot be built; endpoint failures
    /// are sent to `acc.add_error` and listed in the report.
    pub async fn gather_pass(&self, acc: Arc<dyn Accumulator>) -> Result<GatherReport> {
        let fetcher = self.fetcher().await?;
        let started = Instant::now();

        let tasks: Vec<_> = self
            .urls
            .iter()
            .map(|url| {
                let url = url.clone();
                let fetcher = fetcher.clone();
                let acc = acc.clone();
                tokio::spawn(async move {
                    let begin = Instant::now();
                    let result = gather_url(&fetcher, acc.as_ref(), &url).await;
                    (result, begin.elapsed())
                })
            })
            .collect();

        let joined = join_all(tasks).await;

        let mut report = GatherReport::default();
        for (url, outcome) in self.urls.iter().zip(joined) {
            let (result, elapsed) = match outcome {
                Ok(done) => done,
                Err(e) => (Err(CollectError::Task(e.to_string())), started.elapsed()),
            };
            let result = result.map_err(|e| e.for_url(url));

            if let Err(err) = &result {
                warn!(url = %url, kind = err.kind(), error = %err.root(), "Dropwizard endpoint failed");
                acc.add_error(anyhow::Error::new(err.clone()));
            }

            report.endpoints.push(EndpointOutcome {
                url: url.clone(),
                result,
                elapsed,
            });
        }

        info!(
            endpoints = report.endpoints.len(),
            failed = report.endpoints.len() - report.succeeded(),
            records = report.records(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Dropwizard pass complete"
        );

        Ok(report)
    }
}

/// fetch → decode → normalize → emit for one endpoint
async fn gather_url(fetcher: &Fetcher, acc: &dyn Accumulator, url: &str) -> Result<usize> {
    let now = Utc::now();

    let body = fetcher.fetch(url).await?;
    let doc = decode_document(&body)?;
    drop(body);

    let records = normalize(&doc, now);
    let emitted = records.len();
    for record in records {
        acc.add_record(record);
    }

    debug!(url = %url, version = %doc.version, metrics = doc.len(), records = emitted, "Gathered endpoint");
    Ok(emitted)
}

#[async_trait]
impl Input for DropwizardInput {
    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn sample_config(&self) -> &'static str {
        SAMPLE_CONFIG
    }

    async fn gather(&self, acc: Arc<dyn Accumulator>) -> anyhow::Result<()> {
        self.gather_pass(acc).await?;
        Ok(())
    }
}
