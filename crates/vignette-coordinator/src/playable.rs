use anyhow::Result;
use serde_json::Value;

use crate::illustration::ContainerId;

/// One player created by the external playback engine.
///
/// The engine reports "completed one pass" for a player by routing its
/// [`ContainerId`] to [`Coordinator::on_complete`](crate::Coordinator::on_complete).
pub trait Playable {
    /// Start or resume playback from the current frame.
    fn play(&mut self);

    /// Seek to `frame` and start playback.
    fn go_to_and_play(&mut self, frame: u32);

    /// Release everything the player holds. Called exactly once.
    fn destroy(&mut self);
}

/// Parameters for creating a player.
#[derive(Debug, Clone, Copy)]
pub struct PlayerConfig<'a> {
    pub container: ContainerId,
    pub animation_data: &'a Value,
    /// Always `false`: every repeat is an explicit restart by the coordinator.
    pub looping: bool,
    /// Always `false`: playback starts only on request.
    pub autoplay: bool,
}

/// The external playback engine, injected into the coordinator.
pub trait PlaybackEngine {
    /// Create a player for one animation document.
    fn load(&mut self, config: PlayerConfig<'_>) -> Result<Box<dyn Playable>>;
}

/// Owns one player together with the visibility of its container.
///
/// Handles are created hidden. Dropping a handle disposes its player, so a
/// handle can never outlive the configuration generation that built it.
pub struct PlayableHandle {
    container: ContainerId,
    player: Option<Box<dyn Playable>>,
    visible: bool,
}

impl PlayableHandle {
    /// Ask `engine` for a player rendering `data` into `container`.
    pub fn create(
        engine: &mut dyn PlaybackEngine,
        container: ContainerId,
        data: &Value,
    ) -> Result<Self> {
        let player = engine.load(PlayerConfig {
            container,
            animation_data: data,
            looping: false,
            autoplay: false,
        })?;
        tracing::trace!(container = %container, "player created");
        Ok(Self {
            container,
            player: Some(player),
            visible: false,
        })
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_disposed(&self) -> bool {
        self.player.is_none()
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Start playback from the current frame.
    pub fn play(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.play();
        }
    }

    /// Seek to the first frame and play.
    pub fn restart(&mut self) {
        if let Some(player) = self.player.as_mut() {
            player.go_to_and_play(0);
        }
    }

    /// Destroy the player and hide the container. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.visible = false;
        if let Some(mut player) = self.player.take() {
            player.destroy();
            tracing::trace!(container = %self.container, "player disposed");
        }
    }
}

impl Drop for PlayableHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for PlayableHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayableHandle")
            .field("container", &self.container)
            .field("visible", &self.visible)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
