mod engine;
mod fetch;
mod viewport;

use std::collections::VecDeque;
use std::env;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Terminal,
};

use vignette_config::WidgetConfig;
use vignette_coordinator::{
    ConfigureTicket, Coordinator, IntersectionEntry, Interaction, PendingTransition,
};
use vignette_core::{
    event::Event,
    logging::{self, LogBuffer},
    phase::Phase,
};
use vignette_ui::{
    layout::viewer_layout,
    log::render_log_tail,
    status::{render_stage, render_status, StatusView},
};

use crate::engine::SimulatedEngine;
use crate::fetch::FileFetcher;
use crate::viewport::Viewport;

const DEFAULT_CONFIG: &str = "vignette.toml";
const HISTORY_LEN: usize = 12;
const LOG_HEIGHT: u16 = 10;
const KEY_HELP: &str =
    " c click  h hover  v scroll in/out  p play  r reload  q quit";

struct App {
    coordinator: Coordinator,
    engine: SimulatedEngine,
    fetcher: FileFetcher,
    viewport: Viewport,
    config_path: PathBuf,
    history: VecDeque<Phase>,
    log_buffer: LogBuffer,
}

impl App {
    fn new(config_path: PathBuf, log_buffer: LogBuffer, now: Instant) -> Result<Self> {
        let config = WidgetConfig::from_path(&config_path)?;
        let base = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let engine = SimulatedEngine::new(now);
        let viewport = Viewport::new(true);
        let mut coordinator = Coordinator::new(config);
        coordinator.register_engine(Box::new(engine.clone()))?;
        coordinator.set_observer(Box::new(viewport.observer()));

        let mut app = Self {
            coordinator,
            engine,
            fetcher: FileFetcher::new(base),
            viewport,
            config_path,
            history: VecDeque::with_capacity(HISTORY_LEN),
            log_buffer,
        };
        let ticket = app.coordinator.mount()?;
        app.resolve(ticket)?;
        tracing::info!(
            config = %app.config_path.display(),
            mode = %app.coordinator.mode(),
            "viewer ready"
        );
        Ok(app)
    }

    /// Load the illustration for `ticket`, if a configuration cycle started.
    fn resolve(&mut self, ticket: Option<ConfigureTicket>) -> Result<()> {
        if let Some(ticket) = ticket {
            pollster::block_on(self.coordinator.resolve_ticket(ticket, &self.fetcher))?;
        }
        Ok(())
    }

    fn deliver(&mut self, entry: IntersectionEntry) -> Result<()> {
        let ticket = self.coordinator.on_intersection(entry)?;
        self.resolve(ticket)
    }

    /// Re-read the config file and start a fresh configuration cycle.
    fn reload(&mut self) -> Result<()> {
        let config = match WidgetConfig::from_path(&self.config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "reload failed; keeping current config");
                return Ok(());
            }
        };
        self.coordinator.set_mode_flags(config.mode);
        self.coordinator.set_animation(config.animation);
        self.coordinator.set_visibility_options(config.visibility);
        let ticket = match config.sources() {
            Some(sources) => self.coordinator.set_sources(sources)?,
            None => self.coordinator.configure()?,
        };
        tracing::info!(config = %self.config_path.display(), "config reloaded");
        self.resolve(ticket)
    }

    /// Returns `true` when the viewer should quit.
    fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Char('c') => self.coordinator.on_interaction(Interaction::Click),
            KeyCode::Char('h') => self.coordinator.on_interaction(Interaction::PointerEnter),
            KeyCode::Char('v') => {
                if let Some(entry) = self.viewport.toggle() {
                    self.deliver(entry)?;
                }
                tracing::info!(in_view = self.viewport.in_view(), "viewport toggled");
            }
            KeyCode::Char('p') => self.coordinator.play()?,
            KeyCode::Char('r') => self.reload()?,
            _ => {}
        }
        Ok(false)
    }

    /// Advance the simulated engine to `now` and route everything it and
    /// the viewport produced.
    fn pump(&mut self, now: Instant) -> Result<()> {
        if let Some(entry) = self.viewport.take_initial_report() {
            self.deliver(entry)?;
        }
        for container in self.engine.tick(now) {
            self.coordinator.on_complete(container);
        }
        for event in self.coordinator.drain_events() {
            let Event::State { phase } = event;
            if self.history.len() == HISTORY_LEN {
                self.history.pop_front();
            }
            self.history.push_back(phase);
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        self.coordinator.unmount();
        tracing::info!("viewer stopped");
    }
}

fn pending_label(pending: PendingTransition) -> &'static str {
    match pending {
        PendingTransition::None => "-",
        PendingTransition::Entrance => "in",
        PendingTransition::Action => "action",
        PendingTransition::ActionThenEntrance => "action, then in",
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn main() -> Result<()> {
    let log_buffer = logging::init();
    let config_path = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    tracing::info!(config = %config_path.display(), "vignette starting up");

    // Config errors surface before the terminal switches screens.
    let app = App::new(config_path, log_buffer, Instant::now())?;

    let mut terminal = setup_terminal()?;
    let res = run(&mut terminal, app);
    restore_terminal(terminal)?;
    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, mut app: App) -> Result<()> {
    let poll_timeout = Duration::from_millis(16);

    loop {
        app.pump(Instant::now())?;

        // ── Render ──
        terminal.draw(|f| {
            let rects = viewer_layout(f.area(), LOG_HEIGHT);
            let mode = app.coordinator.mode().to_string();
            let history: Vec<Phase> = app.history.iter().copied().collect();
            let view = StatusView {
                visible_phase: app.coordinator.visible_phase(),
                pending: pending_label(app.coordinator.pending()),
                mode: &mode,
                animation: app.coordinator.animation(),
                generation: app.coordinator.generation(),
                on_screen: app.viewport.in_view(),
                rendered: app.coordinator.is_rendered(),
                configuring: app.coordinator.is_configuring(),
                history: &history,
            };

            let title = Line::from(vec![
                Span::styled(
                    " VIGNETTE ",
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" {}", app.config_path.display())),
            ]);
            f.render_widget(Paragraph::new(title), rects.top);

            render_stage(f, rects.stage, &view);
            render_status(f, rects.status, &view);

            let entries = logging::tail(&app.log_buffer, rects.log.height as usize);
            render_log_tail(f, rects.log, &entries);

            f.render_widget(
                Paragraph::new(KEY_HELP).style(Style::default().fg(Color::DarkGray)),
                rects.help,
            );
        })?;

        // ── Poll → Dispatch ──
        if event::poll(poll_timeout)? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key.code)? {
                    app.shutdown();
                    return Ok(());
                }
            }
        }
    }
}
