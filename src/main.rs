//! Replay host for the reader tracking engine.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load the engine configuration from `conf/config.toml`.
//! - Load a scripted reader session and replay it through the engine,
//!   delivering progress over HTTP (or only logging it in dry-run mode).

mod script;
mod sim;

use crate::script::load_script;
use crate::sim::replay;
use anyhow::{Context, Result, anyhow};
use scrollmark_core::config::load_config;
use scrollmark_core::{HttpTransport, LogTransport};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const DEFAULT_CONFIG_PATH: &str = "conf/config.toml";

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

struct Args {
    script: PathBuf,
    config: PathBuf,
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args()?;
    let config = load_config(&args.config);
    if env::var_os("RUST_LOG").is_none() {
        set_log_level(reload_handle, config.log_level.as_filter_str());
    }
    info!(
        script = %args.script.display(),
        mode = %config.position_mode,
        encoding = %config.body_encoding,
        dry_run = config.dry_run,
        "Starting session replay"
    );

    let script = load_script(&args.script)?;
    info!(
        content = %script.content_id,
        seed = script.seed,
        panels = script.panel_heights.len(),
        steps = script.steps.len(),
        "Loaded session script"
    );

    if config.dry_run {
        replay(&script, config, LogTransport);
        return Ok(());
    }

    let transport = HttpTransport::new(&config).context("Failed to set up progress delivery")?;
    info!(url = %transport.url(), "Delivering progress over HTTP");
    let grace = config.request_timeout() + Duration::from_secs(1);
    replay(&script, config, transport.clone());
    if !transport.wait_idle(grace) {
        warn!("Exiting with progress deliveries still in flight");
    }
    Ok(())
}

fn parse_args() -> Result<Args> {
    let mut script = None;
    let mut config = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow!("--config expects a path"))?;
                config = PathBuf::from(path);
            }
            _ if script.is_none() => script = Some(PathBuf::from(arg)),
            _ => return Err(anyhow!("Unexpected argument: {arg}")),
        }
    }

    let script = script
        .ok_or_else(|| anyhow!("Usage: scrollmark <session-script.json> [--config <path>]"))?;
    if !script.exists() {
        return Err(anyhow!("File not found: {}", script.display()));
    }
    Ok(Args { script, config })
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}
