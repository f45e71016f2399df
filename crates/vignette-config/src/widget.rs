use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use vignette_core::phase::Phase;

use crate::mode::Mode;

/// Typed widget configuration, loaded from `vignette.toml`.
///
/// Field names follow the host markup attributes, so `src-in` in markup is
/// `src-in` here too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WidgetConfig {
    #[serde(default = "default_mode")]
    pub mode: Mode,
    /// Phase started by an explicit `play()` request.
    #[serde(default = "default_animation", with = "phase_name")]
    pub animation: Phase,
    #[serde(rename = "src-in", default)]
    pub src_in: Option<String>,
    #[serde(rename = "src-loop", default)]
    pub src_loop: Option<String>,
    #[serde(rename = "src-action", default)]
    pub src_action: Option<String>,
    #[serde(default)]
    pub visibility: VisibilityOptions,
}

/// The three animation document URLs, in illustration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrls {
    pub entrance: String,
    pub idle: String,
    pub action: String,
}

/// Viewport intersection settings for the visibility monitor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct VisibilityOptions {
    /// Margin around the viewport, in pixels.
    pub root_margin: f64,
    /// Intersection ratio at which the element counts as visible.
    pub threshold: f64,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            root_margin: 0.0,
            threshold: 0.1,
        }
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            animation: default_animation(),
            src_in: None,
            src_loop: None,
            src_action: None,
            visibility: VisibilityOptions::default(),
        }
    }
}

fn default_mode() -> Mode {
    Mode::AUTO
}

fn default_animation() -> Phase {
    Phase::Entrance
}

impl WidgetConfig {
    /// Parse and validate config TOML.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input).context("failed to parse widget config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read widget config at {}", path.display()))?;

        Self::from_toml_str(&raw)
            .with_context(|| format!("invalid widget config at {}", path.display()))
    }

    /// Validate semantic constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.visibility.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            bail!("visibility.threshold must be within 0..=1, got {threshold}");
        }
        if !self.visibility.root_margin.is_finite() {
            bail!("visibility.root_margin must be a finite number");
        }

        let given = [
            ("src-in", &self.src_in),
            ("src-loop", &self.src_loop),
            ("src-action", &self.src_action),
        ];
        for (field, value) in given {
            if matches!(value, Some(url) if url.trim().is_empty()) {
                bail!("{field} must not be empty");
            }
        }
        let set = given.iter().filter(|(_, v)| v.is_some()).count();
        if set != 0 && set != given.len() {
            bail!("src-in, src-loop and src-action must be set together");
        }

        Ok(())
    }

    /// Source URLs, when all three are configured.
    pub fn sources(&self) -> Option<SourceUrls> {
        match (&self.src_in, &self.src_loop, &self.src_action) {
            (Some(entrance), Some(idle), Some(action)) => Some(SourceUrls {
                entrance: entrance.clone(),
                idle: idle.clone(),
                action: action.clone(),
            }),
            _ => None,
        }
    }
}

mod phase_name {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use vignette_core::phase::Phase;

    pub fn serialize<S: Serializer>(phase: &Phase, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(phase.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Phase, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
