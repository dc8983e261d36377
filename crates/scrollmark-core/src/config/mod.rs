//! Configuration loading for the reader engine.
//!
//! All deployment-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back to
//! sensible defaults so a reader view can still start tracking.

mod defaults;
mod io;
mod models;

pub use io::{load_config, parse_config, serialize_config};
pub use models::{BodyEncoding, EngineConfig, LogLevel, PositionMode};
