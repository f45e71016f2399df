use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Behaviour flags parsed from the comma-separated `mode` attribute.
///
/// Unrecognized flags are ignored so host markup written for newer
/// versions keeps working.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Mode {
    /// Start the entrance animation as soon as the illustration is configured.
    pub auto: bool,
    /// Replay the entrance animation whenever the element re-enters the viewport.
    pub intersection: bool,
}

impl Mode {
    /// The flags a freshly created widget starts with.
    pub const AUTO: Mode = Mode {
        auto: true,
        intersection: false,
    };

    /// Parse a comma-separated flag list such as `"auto,intersection"`.
    pub fn parse(raw: &str) -> Self {
        let mut mode = Mode::default();
        for flag in raw.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            match flag {
                "auto" => mode.auto = true,
                "intersection" => mode.intersection = true,
                other => tracing::debug!(flag = other, "ignoring unknown mode flag"),
            }
        }
        mode
    }
}

impl FromStr for Mode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Mode::parse(s))
    }
}

impl From<String> for Mode {
    fn from(raw: String) -> Self {
        Mode::parse(&raw)
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags: Vec<&str> = [("auto", self.auto), ("intersection", self.intersection)]
            .into_iter()
            .filter_map(|(name, on)| on.then_some(name))
            .collect();
        f.write_str(&flags.join(","))
    }
}
