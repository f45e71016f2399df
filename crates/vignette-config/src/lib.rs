//! Configuration types and loaders for Vignette.
//!
//! Host markup attributes (`mode`, `animation`, `src-in`, ...) map onto the
//! typed [`WidgetConfig`] here, so the coordinator never deals with raw
//! strings beyond this crate.

pub mod mode;
pub mod widget;

pub use mode::Mode;
pub use widget::{SourceUrls, VisibilityOptions, WidgetConfig};
