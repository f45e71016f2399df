use vignette_core::phase::Phase;

/// Transition requested while another animation is still playing, honored
/// at the next loop boundary.
///
/// Action outranks entrance. An entrance request that was already waiting
/// when an action arrives is kept behind it rather than dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PendingTransition {
    #[default]
    None,
    Entrance,
    Action,
    ActionThenEntrance,
}

impl PendingTransition {
    /// Record a request for `phase`. Loop requests are meaningless and ignored.
    pub fn request(&mut self, phase: Phase) {
        *self = match (*self, phase) {
            (Self::None, Phase::Entrance) => Self::Entrance,
            (Self::None, Phase::Action) => Self::Action,
            (Self::Entrance, Phase::Action) | (Self::Action, Phase::Entrance) => {
                Self::ActionThenEntrance
            }
            (current, _) => current,
        };
    }

    /// Take the highest-priority request, leaving any deferred one behind.
    pub fn take(&mut self) -> Option<Phase> {
        let (next, rest) = match *self {
            Self::None => (None, Self::None),
            Self::Entrance => (Some(Phase::Entrance), Self::None),
            Self::Action => (Some(Phase::Action), Self::None),
            Self::ActionThenEntrance => (Some(Phase::Action), Self::Entrance),
        };
        *self = rest;
        next
    }

    pub fn contains(self, phase: Phase) -> bool {
        matches!(
            (self, phase),
            (Self::Entrance | Self::ActionThenEntrance, Phase::Entrance)
                | (Self::Action | Self::ActionThenEntrance, Phase::Action)
        )
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }

    pub fn clear(&mut self) {
        *self = Self::None;
    }
}
