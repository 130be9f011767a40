//! Ambient observability: JSON-line logging and correlator counters.

pub mod logging;
pub mod telemetry;

pub use logging::{JsonLineLogger, LogFile, LogLevel, LogRotationPolicy, LoggingError};
pub use telemetry::CorrelatorTelemetry;
