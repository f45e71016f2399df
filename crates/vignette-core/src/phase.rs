use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Error};

/// One of the three sequenced animation states of an illustration.
///
/// The wire names (`in`, `loop`, `action`) are what host code sees in
/// `state` events and writes into the `animation` configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Entrance animation, played once when the illustration appears.
    Entrance = 0,
    /// Idle animation, restarted at every pass boundary.
    Loop = 1,
    /// Interaction-triggered animation.
    Action = 2,
}

impl Phase {
    /// Total number of phases.
    pub const COUNT: usize = 3;

    /// All phases in illustration order (entrance, loop, action).
    pub const ALL: [Phase; Self::COUNT] = [Phase::Entrance, Phase::Loop, Phase::Action];

    /// Name used in `state` events and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Entrance => "in",
            Phase::Loop => "loop",
            Phase::Action => "action",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "in" => Ok(Phase::Entrance),
            "loop" => Ok(Phase::Loop),
            "action" => Ok(Phase::Action),
            other => bail!("unknown animation phase {other:?} (expected in, loop or action)"),
        }
    }
}
