//! Scripted reader sessions for the replay host.
//!
//! A script describes the page as first rendered (panel heights, header,
//! viewport), the resume seed handed over by the server, and a timeline of
//! host events including late layout changes from image decoding.

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionScript {
    pub content_id: String,
    #[serde(default)]
    pub seed: i64,
    #[serde(default)]
    pub header_height: Option<f32>,
    pub viewport_height: f32,
    pub panel_heights: Vec<f32>,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptStep {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptAction {
    Scroll { y: f32 },
    ResizePanel { panel: usize, height: f32 },
    Load,
    Click { client_y: f32 },
    Hidden,
    Teardown,
}

pub fn load_script(path: &Path) -> Result<SessionScript> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading session script {}", path.display()))?;
    parse_script(&data).with_context(|| format!("parsing session script {}", path.display()))
}

pub fn parse_script(data: &str) -> Result<SessionScript> {
    let mut script: SessionScript = serde_json::from_str(data)?;
    ensure!(
        script.viewport_height.is_finite() && script.viewport_height > 0.0,
        "viewport_height must be positive"
    );
    ensure!(
        script
            .panel_heights
            .iter()
            .all(|height| height.is_finite() && *height >= 0.0),
        "panel heights must be finite and non-negative"
    );
    script.steps.sort_by_key(|step| step.at_ms);
    Ok(script)
}
