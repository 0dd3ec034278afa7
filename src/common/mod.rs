//! Common utilities and types shared across tableside

pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod tracing_middleware;
pub mod utils;

pub use config::{AvailabilityConfig, Config, CoordinatorConfig};
pub use error::{Error, ErrorKind, Result};
pub use metrics::{MetricsRegistry, UpstreamOp, METRICS};
pub use model::{AvailabilityUpdate, Table};
pub use tracing_middleware::{request_tracing_middleware, REQUEST_ID_HEADER};
pub use utils::{encode_segment, parse_duration, validate_id};
