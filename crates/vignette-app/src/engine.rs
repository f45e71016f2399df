//! A stand-in playback engine that keeps time instead of drawing frames.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde_json::Value;
use vignette_coordinator::{ContainerId, Playable, PlaybackEngine, PlayerConfig};

const FALLBACK_PASS: Duration = Duration::from_secs(1);
const FALLBACK_FRAME_RATE: f64 = 30.0;

/// Length of one pass of a Lottie document: `(op - ip) / fr` seconds.
///
/// Documents without usable timing fall back to one second.
pub fn pass_duration(document: &Value) -> Duration {
    let field = |name: &str| document.get(name).and_then(Value::as_f64);
    match (field("ip"), field("op"), field("fr")) {
        (Some(ip), Some(op), Some(fr)) if fr > 0.0 && op > ip => {
            Duration::from_secs_f64((op - ip) / fr)
        }
        _ => FALLBACK_PASS,
    }
}

struct Track {
    container: ContainerId,
    duration: Duration,
    frame_rate: f64,
    ends_at: Option<Instant>,
}

struct Stage {
    now: Instant,
    tracks: Vec<Track>,
}

impl Stage {
    fn track_mut(&mut self, container: ContainerId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| t.container == container)
    }
}

/// Simulated engine. Clones share one stage, so the app keeps a clone to
/// drive [`tick`](Self::tick) after handing the original to the coordinator.
#[derive(Clone)]
pub struct SimulatedEngine {
    stage: Rc<RefCell<Stage>>,
}

impl SimulatedEngine {
    pub fn new(now: Instant) -> Self {
        Self {
            stage: Rc::new(RefCell::new(Stage {
                now,
                tracks: Vec::new(),
            })),
        }
    }

    /// Advance the clock and collect every player that finished its pass.
    ///
    /// A finished player stays stopped on its last frame until restarted.
    pub fn tick(&self, now: Instant) -> Vec<ContainerId> {
        let mut stage = self.stage.borrow_mut();
        stage.now = now;
        let mut finished = Vec::new();
        for track in &mut stage.tracks {
            if matches!(track.ends_at, Some(end) if end <= now) {
                track.ends_at = None;
                finished.push(track.container);
            }
        }
        finished
    }

    /// Number of live players.
    pub fn players(&self) -> usize {
        self.stage.borrow().tracks.len()
    }

    /// Players currently running a pass.
    pub fn running(&self) -> Vec<ContainerId> {
        self.stage
            .borrow()
            .tracks
            .iter()
            .filter(|t| t.ends_at.is_some())
            .map(|t| t.container)
            .collect()
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn load(&mut self, config: PlayerConfig<'_>) -> Result<Box<dyn Playable>> {
        let duration = pass_duration(config.animation_data);
        let frame_rate = config
            .animation_data
            .get("fr")
            .and_then(Value::as_f64)
            .filter(|fr| *fr > 0.0)
            .unwrap_or(FALLBACK_FRAME_RATE);
        tracing::debug!(
            container = %config.container,
            duration_ms = duration.as_millis() as u64,
            "player loaded"
        );
        self.stage.borrow_mut().tracks.push(Track {
            container: config.container,
            duration,
            frame_rate,
            ends_at: None,
        });
        Ok(Box::new(SimulatedPlayer {
            container: config.container,
            stage: Rc::clone(&self.stage),
        }))
    }
}

struct SimulatedPlayer {
    container: ContainerId,
    stage: Rc<RefCell<Stage>>,
}

impl Playable for SimulatedPlayer {
    fn play(&mut self) {
        let mut stage = self.stage.borrow_mut();
        let now = stage.now;
        if let Some(track) = stage.track_mut(self.container) {
            if track.ends_at.is_none() {
                track.ends_at = Some(now + track.duration);
            }
        }
    }

    fn go_to_and_play(&mut self, frame: u32) {
        let mut stage = self.stage.borrow_mut();
        let now = stage.now;
        if let Some(track) = stage.track_mut(self.container) {
            let skipped = Duration::from_secs_f64(f64::from(frame) / track.frame_rate);
            track.ends_at = Some(now + track.duration.saturating_sub(skipped));
        }
    }

    fn destroy(&mut self) {
        let mut stage = self.stage.borrow_mut();
        stage.tracks.retain(|t| t.container != self.container);
        tracing::trace!(container = %self.container, "player destroyed");
    }
}
