//! dwmon Core - Pipeline contracts and service infrastructure
//!
//! This crate provides:
//! - The normalized metric record handed from inputs to the pipeline
//! - The `Accumulator` sink trait inputs emit records and errors into
//! - The `Input` plugin trait and the registry plugins add themselves to
//! - Standard service lifecycle for agent binaries
//! - Error handling and configuration utilities

pub mod accumulator;
pub mod config;
pub mod duration;
pub mod error;
pub mod input;
pub mod metric;
pub mod service;

pub use accumulator::{Accumulator, MemoryAccumulator};
pub use config::ServiceConfig;
pub use error::{CoreError, Result};
pub use input::{Input, InputFactory, InputRegistry};
pub use metric::{FieldValue, Fields, MetricKind, Record, Tags, ValueType};
pub use service::{AgentService, HealthStatus, ReadinessStatus, ServiceRuntime};
