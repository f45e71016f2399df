use std::fmt;

use vignette_core::phase::Phase;

/// Host wiring failures.
///
/// Data and network problems never show up here: those leave the widget in
/// its last good state and are only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// `configure()` or `play()` ran before a playback engine was registered.
    EngineMissing,
    /// A second playback engine was registered.
    EngineAlreadyRegistered,
    /// The playback engine refused to create a player.
    Engine { phase: Phase, message: String },
}

impl fmt::Display for CoordinatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EngineMissing => write!(f, "no playback engine registered"),
            Self::EngineAlreadyRegistered => {
                write!(f, "a playback engine is already registered")
            }
            Self::Engine { phase, message } => {
                write!(f, "playback engine failed to load the {phase} animation: {message}")
            }
        }
    }
}

impl std::error::Error for CoordinatorError {}
