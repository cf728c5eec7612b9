//! dwmon Agent
//!
//! Runs the configured inputs on a fixed interval and writes every record
//! to stdout as InfluxDB line protocol:
//! - Per-input namepass/namedrop/fieldpass/fielddrop filtering
//! - Global tags merged into every record
//! - `/health` and `/ready` endpoints with self-metrics

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use dwmon_core::{
    Accumulator, AgentService, HealthStatus, Input, InputRegistry, ReadinessStatus, Result, ServiceConfig,
    ServiceRuntime,
};
use dwmon_telemetry::{Counter, DurationHistogram};
use futures_util::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

mod config;
mod filter;
mod output;
mod sink;

use config::AgentConfig;
use filter::MetricFilter;
use output::LineOutput;
use sink::{AgentSink, SinkStats};

const SERVICE_ID: &str = "dwmon-agent";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let service = ServiceConfig::from_env()?;
    dwmon_telemetry::init(&service.service_name)?;

    let config = AgentConfig::load()?;
    let mut registry = InputRegistry::new();
    dwmon_dropwizard::register(&mut registry);

    let agent = Arc::new(Agent::new(service, config, &registry, Arc::new(LineOutput::stdout()))?);
    ServiceRuntime::run(agent).await?;
    Ok(())
}

/// Input instance with its own filtering sink
struct ConfiguredInput {
    kind: String,
    input: Box<dyn Input>,
    sink: Arc<AgentSink>,
}

/// State shared with the HTTP handlers
pub struct AgentState {
    start_time: Instant,
    passes: Counter,
    pass_duration: DurationHistogram,
    stats: SinkStats,
    first_pass_done: AtomicBool,
}

impl AgentState {
    fn new() -> Self {
        Self {
            start_time: Instant::now(),
            passes: Counter::new("passes_total"),
            pass_duration: DurationHistogram::new("pass_duration", 128),
            stats: SinkStats::default(),
            first_pass_done: AtomicBool::new(false),
        }
    }

    fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: SERVICE_ID.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            details: serde_json::json!({
                "passes_total": self.passes.get(),
                "records_written_total": self.stats.records.get(),
                "records_dropped_total": self.stats.dropped.get(),
                "gather_errors_total": self.stats.errors.get(),
                "pass_duration": self.pass_duration.snapshot(),
            }),
        }
    }

    fn readiness(&self) -> ReadinessStatus {
        if self.first_pass_done.load(Ordering::Acquire) {
            ReadinessStatus { ready: true, reason: None }
        } else {
            ReadinessStatus {
                ready: false,
                reason: Some("no collection pass completed yet".to_string()),
            }
        }
    }
}

pub struct Agent {
    service: ServiceConfig,
    config: AgentConfig,
    inputs: Vec<ConfiguredInput>,
    output: Arc<LineOutput>,
    state: Arc<AgentState>,
    stop: Notify,
}

impl Agent {
    pub fn new(
        service: ServiceConfig,
        config: AgentConfig,
        registry: &InputRegistry,
        output: Arc<LineOutput>,
    ) -> Result<Self> {
        let state = Arc::new(AgentState::new());
        let tags = Arc::new(config.tags.clone());

        let inputs = config
            .inputs
            .iter()
            .map(|section| {
                let input = registry.create(&section.kind, section.settings.clone())?;
                let filter = MetricFilter::new(&section.filter)?;
                info!(input = %section.kind, filtered = !filter.is_empty(), "Configured input");
                let sink = AgentSink::new(&section.kind, filter, tags.clone(), output.clone(), state.stats.clone());
                Ok(ConfiguredInput {
                    kind: section.kind.clone(),
                    input,
                    sink: Arc::new(sink),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            service,
            config,
            inputs,
            output,
            state,
            stop: Notify::new(),
        })
    }

    /// Gather every input once; inputs run concurrently
    async fn run_pass(&self) {
        let started = Instant::now();

        join_all(self.inputs.iter().map(|configured| async move {
            let acc: Arc<dyn Accumulator> = configured.sink.clone();
            if let Err(e) = configured.input.gather(acc).await {
                self.state.stats.errors.inc();
                error!(input = %configured.kind, "Input gather failed: {:#}", e);
            }
        }))
        .await;

        if let Err(e) = self.output.flush() {
            error!("Failed to flush output: {}", e);
        }

        let elapsed = started.elapsed();
        self.state.pass_duration.record(elapsed);
        self.state.passes.inc();
        self.state.first_pass_done.store(true, Ordering::Release);

        info!(
            pass = self.state.passes.get(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Collection pass complete"
        );
    }

    async fn collect_loop(&self) {
        let mut ticker = tokio::time::interval(self.config.interval);
        // a pass that overruns the interval delays the next one
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.run_pass().await,
                _ = self.stop.notified() => break,
            }
        }
    }
}

fn router(state: Arc<AgentState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<AgentState>>) -> Json<HealthStatus> {
    Json(state.health())
}

async fn ready_handler(State(state): State<Arc<AgentState>>) -> (StatusCode, Json<ReadinessStatus>) {
    let status = state.readiness();
    let code = if status.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

#[async_trait::async_trait]
impl AgentService for Agent {
    fn service_id(&self) -> &'static str {
        SERVICE_ID
    }

    async fn health(&self) -> HealthStatus {
        self.state.health()
    }

    async fn ready(&self) -> ReadinessStatus {
        self.state.readiness()
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down dwmon agent");
        self.stop.notify_one();
        self.output.flush()?;
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(
            http = %self.service.http_bind,
            interval = ?self.config.interval,
            inputs = self.inputs.len(),
            "Starting dwmon agent"
        );

        let listener = tokio::net::TcpListener::bind(&self.service.http_bind).await?;
        let app = router(self.state.clone());
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("HTTP server failed: {}", e);
            }
        });

        self.collect_loop().await;

        server.abort();
        Ok(())
    }
}
