//! Core infrastructure shared by the Vignette crates.
//!
//! This crate provides the building blocks that sit underneath the
//! animation coordinator and the viewer: phase names, the outward event
//! type, a FIFO event bus, and the logging subsystem.

pub mod bus;
pub mod event;
pub mod logging;
pub mod phase;
