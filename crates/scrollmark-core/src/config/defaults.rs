pub(crate) fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

pub(crate) fn default_endpoint() -> String {
    "/progress".to_string()
}

pub(crate) fn default_debounce_ms() -> u64 {
    300
}

pub(crate) fn default_resume_retry_delays_ms() -> Vec<u64> {
    vec![80, 180]
}

pub(crate) fn default_selection_slack_px() -> f32 {
    10.0
}

pub(crate) fn default_header_gap_px() -> f32 {
    6.0
}

pub(crate) fn default_completion_slack_px() -> f32 {
    5.0
}

pub(crate) fn default_request_timeout_secs() -> f32 {
    10.0
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}

pub(crate) const MAX_REQUEST_TIMEOUT_SECS: f32 = 600.0;
