use super::EngineConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> EngineConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded engine config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return EngineConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!(
                mode = %cfg.position_mode,
                encoding = %cfg.body_encoding,
                "Parsed configuration from disk"
            );
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err:#}");
            EngineConfig::default()
        }
    }
}

pub fn parse_config(contents: &str) -> Result<EngineConfig> {
    let cfg: EngineConfig = toml::from_str(contents).context("parsing engine config")?;
    Ok(cfg.sanitized())
}

pub fn serialize_config(config: &EngineConfig) -> Result<String> {
    toml::to_string(config).context("serializing engine config")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BodyEncoding, PositionMode};
    use std::time::Duration;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = parse_config("").expect("empty config parses");
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.debounce_ms, 300);
        assert_eq!(cfg.resume_retry_delays_ms, vec![80, 180]);
        assert_eq!(cfg.position_mode, PositionMode::PanelIndex);
    }

    #[test]
    fn kebab_case_modes_parse() {
        let cfg = parse_config(
            r#"
position_mode = "scroll-offset"
body_encoding = "json"
debounce_ms = 450
"#,
        )
        .expect("config parses");
        assert_eq!(cfg.position_mode, PositionMode::ScrollOffset);
        assert_eq!(cfg.body_encoding, BodyEncoding::Json);
        assert_eq!(cfg.debounce_ms, 450);
    }

    #[test]
    fn invalid_values_are_sanitized() {
        let cfg = parse_config(
            r#"
header_gap_px = -4.0
request_timeout_secs = 0.0
resume_retry_delays_ms = [250, 100, 250]
"#,
        )
        .expect("config parses");
        assert_eq!(cfg.header_gap_px, 6.0);
        assert_eq!(cfg.request_timeout_secs, 10.0);
        assert_eq!(cfg.resume_retry_delays_ms, vec![100, 250]);

        let cfg = parse_config("request_timeout_secs = 1e30").expect("config parses");
        assert_eq!(cfg.request_timeout_secs, 10.0);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn oversized_timeout_never_panics_unsanitized() {
        let cfg = EngineConfig {
            request_timeout_secs: 1e30,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
        assert!(crate::transport::HttpTransport::new(&cfg).is_ok());
    }

    #[test]
    fn unknown_mode_is_an_error() {
        assert!(parse_config(r#"position_mode = "page""#).is_err());
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut cfg = EngineConfig::default();
        cfg.script_root = "/manga".to_string();
        let text = serialize_config(&cfg).expect("serialize");
        assert_eq!(parse_config(&text).expect("parse"), cfg);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = load_config(Path::new("/nonexistent/scrollmark/config.toml"));
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn progress_url_prefixes_script_root() {
        let mut cfg = EngineConfig::default();
        cfg.base_url = "http://reader.local/".to_string();
        assert_eq!(cfg.progress_url(), "http://reader.local/progress");

        cfg.script_root = "manga/".to_string();
        assert_eq!(cfg.progress_url(), "http://reader.local/manga/progress");

        cfg.endpoint = "bookmark".to_string();
        assert_eq!(cfg.progress_url(), "http://reader.local/manga/bookmark");
    }
}
