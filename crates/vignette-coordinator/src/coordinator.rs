use std::rc::{Rc, Weak};

use serde_json::Value;
use vignette_config::{Mode, SourceUrls, VisibilityOptions, WidgetConfig};
use vignette_core::bus::EventBus;
use vignette_core::event::Event;
use vignette_core::phase::Phase;

use crate::error::CoordinatorError;
use crate::illustration::{ContainerId, Illustration};
use crate::pending::PendingTransition;
use crate::playable::{PlayableHandle, PlaybackEngine};
use crate::source::{Fetcher, IllustrationSource};
use crate::visibility::{IntersectionEntry, VisibilityMonitor, VisibilityObserver};

/// User interactions that request the action animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    Click,
    PointerEnter,
}

/// The pending half of a configuration cycle.
///
/// Returned by [`Coordinator::configure`] after the previous generation has
/// been torn down. The host resolves it (the only suspension point) and
/// hands the result back through [`Coordinator::finish_configure`].
///
/// Dropping every copy of a ticket without finishing it abandons the cycle:
/// the next visibility report starts a fresh one.
#[derive(Debug, Clone)]
#[must_use = "a configuration cycle does nothing until its ticket is resolved"]
pub struct ConfigureTicket {
    generation: u64,
    source: IllustrationSource,
    alive: Rc<()>,
}

impl ConfigureTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> &IllustrationSource {
        &self.source
    }

    /// Resolve the illustration data for this cycle.
    pub async fn resolve(&self, fetcher: &dyn Fetcher) -> anyhow::Result<Illustration> {
        self.source.resolve(fetcher).await
    }
}

/// A configuration cycle awaiting its data.
struct InFlight {
    generation: u64,
    ticket: Weak<()>,
}

impl InFlight {
    fn is_abandoned(&self) -> bool {
        self.ticket.strong_count() == 0
    }
}

/// One handle per phase, indexed by `Phase as usize`.
struct PhaseHandles([PlayableHandle; Phase::COUNT]);

impl PhaseHandles {
    fn build(
        engine: &mut dyn PlaybackEngine,
        generation: u64,
        illustration: &Illustration,
    ) -> Result<Self, CoordinatorError> {
        Ok(Self([
            create_handle(engine, generation, illustration, Phase::Entrance)?,
            create_handle(engine, generation, illustration, Phase::Loop)?,
            create_handle(engine, generation, illustration, Phase::Action)?,
        ]))
    }

    fn get_mut(&mut self, phase: Phase) -> &mut PlayableHandle {
        &mut self.0[phase as usize]
    }

    /// Show `phase` and hide every other container in the same step.
    fn show_only(&mut self, phase: Phase) {
        for handle in &mut self.0 {
            if handle.container().phase == phase {
                handle.show();
            } else {
                handle.hide();
            }
        }
    }

    fn visible_phase(&self) -> Option<Phase> {
        self.0
            .iter()
            .find(|handle| handle.is_visible())
            .map(|handle| handle.container().phase)
    }

    fn dispose(&mut self) {
        for handle in &mut self.0 {
            handle.dispose();
        }
    }
}

fn create_handle(
    engine: &mut dyn PlaybackEngine,
    generation: u64,
    illustration: &Illustration,
    phase: Phase,
) -> Result<PlayableHandle, CoordinatorError> {
    let container = ContainerId { generation, phase };
    PlayableHandle::create(engine, container, illustration.document(phase)).map_err(|err| {
        CoordinatorError::Engine {
            phase,
            message: format!("{err:#}"),
        }
    })
}

/// Sequences the entrance, loop and action players of one illustration.
///
/// Every input is a host trigger: mount and unmount, new illustration data,
/// visibility reports, user interactions, and per-pass completions. Each
/// phase entry publishes [`Event::State`] on the internal bus; the host
/// collects them with [`drain_events`](Self::drain_events).
pub struct Coordinator {
    engine: Option<Box<dyn PlaybackEngine>>,
    monitor: VisibilityMonitor,
    mode: Mode,
    animation: Phase,
    illustration: Option<Vec<Value>>,
    sources: Option<SourceUrls>,
    handles: Option<PhaseHandles>,
    current: Option<Phase>,
    pending: PendingTransition,
    listening: bool,
    is_ready: bool,
    is_rendered: bool,
    is_visible: bool,
    resume_loop_on_visible: bool,
    generation: u64,
    in_flight: Option<InFlight>,
    bus: EventBus,
}

impl Coordinator {
    /// Create a coordinator without a playback engine; register one with
    /// [`register_engine`](Self::register_engine) before configuring.
    pub fn new(config: WidgetConfig) -> Self {
        Self {
            engine: None,
            monitor: VisibilityMonitor::new(config.visibility),
            mode: config.mode,
            animation: config.animation,
            illustration: None,
            sources: config.sources(),
            handles: None,
            current: None,
            pending: PendingTransition::None,
            listening: false,
            is_ready: false,
            is_rendered: false,
            is_visible: false,
            resume_loop_on_visible: false,
            generation: 0,
            in_flight: None,
            bus: EventBus::new(),
        }
    }

    pub fn with_engine(config: WidgetConfig, engine: Box<dyn PlaybackEngine>) -> Self {
        let mut coordinator = Self::new(config);
        coordinator.engine = Some(engine);
        coordinator
    }

    /// Register the playback engine. Allowed once per coordinator.
    pub fn register_engine(
        &mut self,
        engine: Box<dyn PlaybackEngine>,
    ) -> Result<(), CoordinatorError> {
        if self.engine.is_some() {
            return Err(CoordinatorError::EngineAlreadyRegistered);
        }
        self.engine = Some(engine);
        Ok(())
    }

    /// Install the host's intersection watcher.
    pub fn set_observer(&mut self, observer: Box<dyn VisibilityObserver>) {
        let was_observing = self.monitor.is_observing();
        self.monitor.set_observer(observer);
        if was_observing {
            self.monitor.start();
        }
    }

    // ── host triggers ──

    /// The widget was attached to the host document.
    ///
    /// The first attach only starts visibility monitoring: the first render
    /// waits until the element is actually on screen. Later attaches
    /// reconfigure straight away.
    pub fn mount(&mut self) -> Result<Option<ConfigureTicket>, CoordinatorError> {
        self.monitor.start();
        if !self.is_ready {
            self.is_ready = true;
            tracing::debug!("widget mounted; waiting for first visibility");
            return Ok(None);
        }
        self.configure()
    }

    /// The widget was detached. Tears down the current generation and
    /// discards any configuration still in flight.
    pub fn unmount(&mut self) {
        self.destroy();
        self.monitor.stop();
        if self.in_flight.take().is_some() {
            self.generation += 1;
        }
    }

    /// Supply the three animation documents directly.
    pub fn set_illustration(
        &mut self,
        documents: Vec<Value>,
    ) -> Result<Option<ConfigureTicket>, CoordinatorError> {
        self.illustration = Some(documents);
        self.reconfigure_if_ready()
    }

    /// Supply the three animation document URLs.
    pub fn set_sources(
        &mut self,
        sources: SourceUrls,
    ) -> Result<Option<ConfigureTicket>, CoordinatorError> {
        self.sources = Some(sources);
        self.reconfigure_if_ready()
    }

    /// Mirror the host's `mode` attribute, e.g. `"auto,intersection"`.
    pub fn set_mode(&mut self, raw: &str) {
        self.set_mode_flags(Mode::parse(raw));
    }

    pub fn set_mode_flags(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Change the intersection settings; a running watch picks them up at once.
    pub fn set_visibility_options(&mut self, options: VisibilityOptions) {
        self.monitor.set_options(options);
    }

    /// Select the phase [`play`](Self::play) starts.
    pub fn set_animation(&mut self, phase: Phase) {
        self.animation = phase;
    }

    fn reconfigure_if_ready(&mut self) -> Result<Option<ConfigureTicket>, CoordinatorError> {
        if !self.is_ready {
            return Ok(None);
        }
        self.configure()
    }

    /// Where the next configuration gets its documents. Inline data must be
    /// a complete triple; otherwise the source URLs are used, if any.
    fn source(&self) -> Option<IllustrationSource> {
        if let Some(documents) = &self.illustration {
            match Illustration::from_values(documents.clone()) {
                Ok(illustration) => return Some(IllustrationSource::Inline(illustration)),
                Err(err) if self.sources.is_none() => {
                    tracing::warn!(error = %err, "illustration incomplete; nothing to configure");
                    return None;
                }
                Err(err) => {
                    tracing::debug!(error = %err, "inline illustration incomplete; using source urls");
                }
            }
        }
        self.sources.clone().map(IllustrationSource::Urls)
    }

    // ── configuration cycle ──

    /// Start a configuration cycle.
    ///
    /// Returns `Ok(None)` when there is nothing complete to configure from:
    /// no source URLs and no inline triple of three non-empty documents. The
    /// running players are left untouched in that case. Otherwise the
    /// previous generation is disposed before this returns, so nothing from
    /// it can act once the ticket exists.
    pub fn configure(&mut self) -> Result<Option<ConfigureTicket>, CoordinatorError> {
        let Some(source) = self.source() else {
            tracing::debug!("configure skipped: no complete illustration or sources");
            return Ok(None);
        };
        if self.engine.is_none() {
            return Err(CoordinatorError::EngineMissing);
        }

        self.destroy();
        self.generation += 1;
        let alive = Rc::new(());
        self.in_flight = Some(InFlight {
            generation: self.generation,
            ticket: Rc::downgrade(&alive),
        });
        tracing::debug!(generation = self.generation, "configuration started");

        Ok(Some(ConfigureTicket {
            generation: self.generation,
            source,
            alive,
        }))
    }

    /// Complete a configuration cycle with its resolved data.
    ///
    /// Returns `Ok(true)` when players were built. Stale generations and
    /// data failures return `Ok(false)` and leave the widget as it is.
    pub fn finish_configure(
        &mut self,
        generation: u64,
        resolved: anyhow::Result<Illustration>,
    ) -> Result<bool, CoordinatorError> {
        let awaited = self.in_flight.as_ref().map(|flight| flight.generation);
        if generation != self.generation || awaited != Some(generation) {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding stale illustration data"
            );
            return Ok(false);
        }
        self.in_flight = None;

        let illustration = match resolved {
            Ok(illustration) => illustration,
            Err(err) => {
                tracing::warn!(generation, error = %format!("{err:#}"), "illustration unavailable");
                return Ok(false);
            }
        };

        let engine = self
            .engine
            .as_deref_mut()
            .ok_or(CoordinatorError::EngineMissing)?;
        self.handles = Some(PhaseHandles::build(engine, generation, &illustration)?);
        self.listening = true;
        self.is_rendered = true;
        tracing::info!(generation, mode = %self.mode, "illustration configured");

        if self.mode.auto {
            self.play()?;
        }
        Ok(true)
    }

    /// Resolve `ticket` with `fetcher` and complete the cycle.
    pub async fn resolve_ticket(
        &mut self,
        ticket: ConfigureTicket,
        fetcher: &dyn Fetcher,
    ) -> Result<bool, CoordinatorError> {
        let resolved = ticket.resolve(fetcher).await;
        self.finish_configure(ticket.generation(), resolved)
    }

    /// Run a whole configuration cycle in one call.
    pub async fn configure_with(&mut self, fetcher: &dyn Fetcher) -> Result<bool, CoordinatorError> {
        match self.configure()? {
            Some(ticket) => self.resolve_ticket(ticket, fetcher).await,
            None => Ok(false),
        }
    }

    // ── playback ──

    /// Show and start the phase selected with [`set_animation`](Self::set_animation).
    ///
    /// Does nothing before the widget is mounted or before players exist.
    pub fn play(&mut self) -> Result<(), CoordinatorError> {
        if !self.is_ready {
            return Ok(());
        }
        if self.engine.is_none() {
            return Err(CoordinatorError::EngineMissing);
        }
        let Some(handles) = self.handles.as_mut() else {
            tracing::debug!(animation = %self.animation, "play ignored: no players yet");
            return Ok(());
        };

        let phase = self.animation;
        handles.show_only(phase);
        handles.get_mut(phase).play();
        self.current = Some(phase);
        self.emit(phase);
        Ok(())
    }

    /// Request the entrance animation at the next loop boundary.
    pub fn queue_entrance(&mut self) {
        self.queue(Phase::Entrance);
    }

    /// Request the action animation at the next loop boundary.
    pub fn queue_action(&mut self) {
        self.queue(Phase::Action);
    }

    fn queue(&mut self, phase: Phase) {
        if self.current == Some(phase) {
            tracing::trace!(phase = %phase, "already playing; request ignored");
            return;
        }
        self.pending.request(phase);
        tracing::debug!(phase = %phase, pending = ?self.pending, "transition queued");
    }

    pub fn on_interaction(&mut self, interaction: Interaction) {
        if self.listening {
            tracing::trace!(?interaction, "interaction");
            self.queue_action();
        }
    }

    /// Dispose every player and forget queued transitions. Idempotent.
    pub fn destroy(&mut self) {
        if let Some(mut handles) = self.handles.take() {
            handles.dispose();
            tracing::debug!(generation = self.generation, "players disposed");
        }
        self.pending.clear();
        self.listening = false;
        self.current = None;
        self.resume_loop_on_visible = false;
    }

    // ── notifications ──

    /// The watched element crossed the visibility threshold.
    ///
    /// The first time it becomes visible a configuration cycle starts and
    /// its ticket is returned.
    pub fn on_visibility_change(
        &mut self,
        visible: bool,
    ) -> Result<Option<ConfigureTicket>, CoordinatorError> {
        self.is_visible = visible;
        tracing::debug!(visible, "visibility changed");
        if !visible || !self.is_ready {
            return Ok(None);
        }

        if !self.is_rendered {
            match &self.in_flight {
                Some(flight) if !flight.is_abandoned() => return Ok(None),
                Some(flight) => tracing::debug!(
                    generation = flight.generation,
                    "configuration abandoned without a result; restarting"
                ),
                None => {}
            }
            return self.configure();
        }

        if self.resume_loop_on_visible {
            self.resume_loop_on_visible = false;
            if let Some(handles) = self.handles.as_mut() {
                handles.get_mut(Phase::Loop).restart();
            }
        } else if self.mode.intersection {
            self.queue_entrance();
        }
        Ok(None)
    }

    /// Feed a raw intersection report through the visibility monitor.
    pub fn on_intersection(
        &mut self,
        entry: IntersectionEntry,
    ) -> Result<Option<ConfigureTicket>, CoordinatorError> {
        match self.monitor.report(entry) {
            Some(visible) => self.on_visibility_change(visible),
            None => Ok(None),
        }
    }

    /// A player finished one pass.
    pub fn on_complete(&mut self, container: ContainerId) {
        if container.generation != self.generation || self.handles.is_none() {
            tracing::trace!(container = %container, "ignoring completion from stale player");
            return;
        }

        match container.phase {
            Phase::Entrance | Phase::Action => self.enter(Phase::Loop),
            Phase::Loop => match self.pending.take() {
                Some(next) => self.enter(next),
                None => {
                    if self.is_visible {
                        if let Some(handles) = self.handles.as_mut() {
                            handles.get_mut(Phase::Loop).restart();
                        }
                    } else {
                        self.resume_loop_on_visible = true;
                    }
                    self.emit(Phase::Loop);
                }
            },
        }
    }

    /// Make `phase` the only visible phase and play it from the first frame.
    fn enter(&mut self, phase: Phase) {
        let Some(handles) = self.handles.as_mut() else {
            return;
        };
        handles.show_only(phase);
        handles.get_mut(phase).restart();
        self.current = Some(phase);
        self.emit(phase);
    }

    fn emit(&mut self, phase: Phase) {
        tracing::debug!(phase = %phase, "state");
        self.bus.publish(Event::State { phase });
    }

    // ── inspection ──

    /// Take every event published since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    pub fn current_phase(&self) -> Option<Phase> {
        self.current
    }

    /// Phase whose container is currently shown.
    pub fn visible_phase(&self) -> Option<Phase> {
        self.handles.as_ref().and_then(PhaseHandles::visible_phase)
    }

    pub fn pending(&self) -> PendingTransition {
        self.pending
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn animation(&self) -> Phase {
        self.animation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    pub fn is_rendered(&self) -> bool {
        self.is_rendered
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    /// A configuration cycle is waiting on a live ticket.
    pub fn is_configuring(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|flight| !flight.is_abandoned())
    }

    pub fn resumes_loop_on_visible(&self) -> bool {
        self.resume_loop_on_visible
    }
}
