//! Progress delivery transports.
//!
//! Delivery is dispatch-and-detach: the request is built on the caller's
//! turn and handed to a detached worker that owns everything it needs, so the
//! reader view can go away while the request is still on the wire. Outcomes
//! are logged and otherwise dropped.

use crate::config::{BodyEncoding, EngineConfig};
use crate::sync::ProgressRecord;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub trait ProgressTransport {
    /// Start delivering `record` without waiting for the outcome.
    fn dispatch(&self, record: ProgressRecord);
}

/// POSTs progress records to the configured endpoint from detached threads.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    url: String,
    encoding: BodyEncoding,
    in_flight: Arc<AtomicUsize>,
}

impl HttpTransport {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("building progress HTTP client")?;
        Ok(Self {
            client,
            url: config.progress_url(),
            encoding: config.body_encoding,
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Give detached deliveries up to `timeout` to finish. Only the host
    /// process calls this, right before it exits.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let started = Instant::now();
        while self.in_flight() > 0 {
            if started.elapsed() >= timeout {
                warn!(
                    in_flight = self.in_flight(),
                    "Progress deliveries still pending at exit"
                );
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
        true
    }

    fn build_request(&self, record: &ProgressRecord) -> reqwest::blocking::RequestBuilder {
        let request = self.client.post(&self.url);
        match self.encoding {
            BodyEncoding::Form => request.form(&record.form_fields()),
            BodyEncoding::Json => request.json(&record.to_json()),
        }
    }
}

impl ProgressTransport for HttpTransport {
    fn dispatch(&self, record: ProgressRecord) {
        let request = self.build_request(&record);
        let in_flight = Arc::clone(&self.in_flight);
        let url = self.url.clone();
        in_flight.fetch_add(1, Ordering::AcqRel);

        let spawned = thread::Builder::new()
            .name("progress-delivery".to_string())
            .spawn({
                let in_flight = Arc::clone(&in_flight);
                move || {
                    match request.send() {
                        Ok(response) if response.status().is_success() => {
                            debug!(
                                %url,
                                position = %record.position,
                                status = %response.status(),
                                "Progress delivered"
                            );
                        }
                        Ok(response) => {
                            warn!(
                                %url,
                                position = %record.position,
                                status = %response.status(),
                                "Progress endpoint rejected update"
                            );
                        }
                        Err(err) => {
                            warn!(%url, position = %record.position, "Progress delivery failed: {err}");
                        }
                    }
                    in_flight.fetch_sub(1, Ordering::AcqRel);
                }
            });

        if let Err(err) = spawned {
            in_flight.fetch_sub(1, Ordering::AcqRel);
            warn!("Could not start progress delivery: {err}");
        }
    }
}

/// Logs records instead of sending them (`dry_run = true`).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

impl ProgressTransport for LogTransport {
    fn dispatch(&self, record: ProgressRecord) {
        info!(
            content = %record.content_id,
            position = %record.position,
            completed = record.completed,
            "Dry run: progress update not sent"
        );
    }
}
