use serde::Deserialize;
use std::time::Duration;

/// Engine configuration for one deployment; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub position_mode: PositionMode,
    #[serde(default)]
    pub body_encoding: BodyEncoding,
    #[serde(default = "crate::config::defaults::default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub script_root: String,
    #[serde(default = "crate::config::defaults::default_endpoint")]
    pub endpoint: String,
    #[serde(default = "crate::config::defaults::default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "crate::config::defaults::default_resume_retry_delays_ms")]
    pub resume_retry_delays_ms: Vec<u64>,
    #[serde(default = "crate::config::defaults::default_selection_slack_px")]
    pub selection_slack_px: f32,
    #[serde(default = "crate::config::defaults::default_header_gap_px")]
    pub header_gap_px: f32,
    #[serde(default = "crate::config::defaults::default_completion_slack_px")]
    pub completion_slack_px: f32,
    #[serde(default = "crate::config::defaults::default_request_timeout_secs")]
    pub request_timeout_secs: f32,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            position_mode: PositionMode::default(),
            body_encoding: BodyEncoding::default(),
            base_url: crate::config::defaults::default_base_url(),
            script_root: String::new(),
            endpoint: crate::config::defaults::default_endpoint(),
            debounce_ms: crate::config::defaults::default_debounce_ms(),
            resume_retry_delays_ms: crate::config::defaults::default_resume_retry_delays_ms(),
            selection_slack_px: crate::config::defaults::default_selection_slack_px(),
            header_gap_px: crate::config::defaults::default_header_gap_px(),
            completion_slack_px: crate::config::defaults::default_completion_slack_px(),
            request_timeout_secs: crate::config::defaults::default_request_timeout_secs(),
            dry_run: false,
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Replace out-of-range pixel and timing values with their defaults.
    pub fn sanitized(mut self) -> Self {
        let px = |value: f32, fallback: fn() -> f32| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                fallback()
            }
        };
        self.selection_slack_px = px(
            self.selection_slack_px,
            crate::config::defaults::default_selection_slack_px,
        );
        self.header_gap_px = px(
            self.header_gap_px,
            crate::config::defaults::default_header_gap_px,
        );
        self.completion_slack_px = px(
            self.completion_slack_px,
            crate::config::defaults::default_completion_slack_px,
        );
        let timeout = self.request_timeout_secs;
        if !(timeout.is_finite()
            && timeout > 0.0
            && timeout <= crate::config::defaults::MAX_REQUEST_TIMEOUT_SECS)
        {
            self.request_timeout_secs = crate::config::defaults::default_request_timeout_secs();
        }
        self.resume_retry_delays_ms.sort_unstable();
        self.resume_retry_delays_ms.dedup();
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn resume_retry_delays(&self) -> Vec<Duration> {
        self.resume_retry_delays_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }

    /// Unsanitized values that do not fit a `Duration` use the default.
    pub fn request_timeout(&self) -> Duration {
        Duration::try_from_secs_f32(self.request_timeout_secs)
            .ok()
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or_else(|| {
                Duration::from_secs_f32(crate::config::defaults::default_request_timeout_secs())
            })
    }

    /// Absolute delivery URL, with the script root spliced in front of the
    /// endpoint path the way the reader pages prefix every absolute path.
    pub fn progress_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let root = self.script_root.trim_end_matches('/');
        let root = if root.is_empty() || root.starts_with('/') {
            root.to_string()
        } else {
            format!("/{root}")
        };
        let endpoint = if self.endpoint.starts_with('/') {
            self.endpoint.clone()
        } else {
            format!("/{}", self.endpoint)
        };
        format!("{base}{root}{endpoint}")
    }
}

/// Which representation of the reader position is authoritative.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PositionMode {
    /// Discrete images: track the topmost visible panel.
    #[default]
    PanelIndex,
    /// Continuous content: track the raw scroll offset in pixels.
    ScrollOffset,
}

impl std::fmt::Display for PositionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PositionMode::PanelIndex => "panel-index",
            PositionMode::ScrollOffset => "scroll-offset",
        };
        write!(f, "{}", label)
    }
}

/// Body encoding of progress requests.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    #[default]
    Form,
    Json,
}

impl std::fmt::Display for BodyEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BodyEncoding::Form => "form",
            BodyEncoding::Json => "json",
        };
        write!(f, "{}", label)
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
