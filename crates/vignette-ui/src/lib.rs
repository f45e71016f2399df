//! Terminal rendering for the Vignette viewer.
//!
//! Draws the phase status panel and the log tail with [`ratatui`]. The
//! coordinator owns the state; this crate only presents it.

pub mod layout;
pub mod log;
pub mod status;
