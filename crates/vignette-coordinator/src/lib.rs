//! Phase sequencing for three-part animated illustrations.
//!
//! An illustration is an entrance animation, an idle loop and an
//! interaction-triggered action. The [`Coordinator`] owns one player per
//! phase (created through an injected [`PlaybackEngine`]), decides which
//! one is visible, queues transitions requested mid-pass, and reacts to
//! viewport visibility.
//!
//! # Quick start
//!
//! ```no_run
//! use vignette_config::WidgetConfig;
//! use vignette_coordinator::{Coordinator, Fetcher, PlaybackEngine};
//!
//! fn wire(
//!     engine: Box<dyn PlaybackEngine>,
//!     fetcher: &dyn Fetcher,
//!     data: Vec<serde_json::Value>,
//! ) -> anyhow::Result<()> {
//!     let mut coordinator = Coordinator::with_engine(WidgetConfig::default(), engine);
//!     coordinator.mount()?;
//!     coordinator.set_illustration(data)?;
//!     // The first visible report triggers the first render.
//!     if let Some(ticket) = coordinator.on_visibility_change(true)? {
//!         pollster::block_on(coordinator.resolve_ticket(ticket, fetcher))?;
//!     }
//!     for event in coordinator.drain_events() {
//!         println!("{event:?}");
//!     }
//!     Ok(())
//! }
//! ```

mod coordinator;
mod error;
mod illustration;
mod pending;
mod playable;
mod source;
mod visibility;

#[cfg(test)]
mod testing;

pub use coordinator::{ConfigureTicket, Coordinator, Interaction};
pub use error::CoordinatorError;
pub use illustration::{ContainerId, Illustration};
pub use pending::PendingTransition;
pub use playable::{Playable, PlayableHandle, PlaybackEngine, PlayerConfig};
pub use source::{FetchFuture, Fetcher, IllustrationSource};
pub use visibility::{IntersectionEntry, VisibilityMonitor, VisibilityObserver};
