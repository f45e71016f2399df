//! Fakes for the external collaborators, shared by the unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{anyhow, bail, Result};
use futures::channel::oneshot;
use futures::FutureExt;
use serde_json::{json, Value};
use vignette_core::phase::Phase;

use crate::illustration::ContainerId;
use crate::playable::{Playable, PlaybackEngine, PlayerConfig};
use crate::source::{FetchFuture, Fetcher};
use crate::visibility::VisibilityObserver;
use vignette_config::VisibilityOptions;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(ContainerId),
    Play(ContainerId),
    GoToAndPlay(ContainerId, u32),
    Destroy(ContainerId),
}

#[derive(Default)]
struct EngineLog {
    calls: Vec<Call>,
    data: HashMap<ContainerId, Value>,
    load_error: Option<String>,
}

/// Records every player call. Clones share the same log, so a test can keep
/// one copy while the coordinator owns another.
#[derive(Clone, Default)]
pub struct FakeEngine {
    log: Rc<RefCell<EngineLog>>,
}

impl FakeEngine {
    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.log.borrow_mut().calls.clear();
    }

    pub fn loaded_data(&self, container: ContainerId) -> Option<Value> {
        self.log.borrow().data.get(&container).cloned()
    }

    pub fn loads(&self) -> Vec<ContainerId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Load(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn destroyed(&self) -> Vec<ContainerId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Destroy(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn fail_loads(&mut self, message: &str) {
        self.log.borrow_mut().load_error = Some(message.to_string());
    }
}

impl PlaybackEngine for FakeEngine {
    fn load(&mut self, config: PlayerConfig<'_>) -> Result<Box<dyn Playable>> {
        assert!(!config.looping, "players must never loop on their own");
        assert!(!config.autoplay, "players must never autoplay");
        let mut log = self.log.borrow_mut();
        if let Some(message) = &log.load_error {
            bail!("{message}");
        }
        log.calls.push(Call::Load(config.container));
        log.data
            .insert(config.container, config.animation_data.clone());
        Ok(Box::new(FakePlayer {
            container: config.container,
            log: self.log.clone(),
        }))
    }
}

struct FakePlayer {
    container: ContainerId,
    log: Rc<RefCell<EngineLog>>,
}

impl Playable for FakePlayer {
    fn play(&mut self) {
        self.log.borrow_mut().calls.push(Call::Play(self.container));
    }

    fn go_to_and_play(&mut self, frame: u32) {
        self.log
            .borrow_mut()
            .calls
            .push(Call::GoToAndPlay(self.container, frame));
    }

    fn destroy(&mut self) {
        self.log.borrow_mut().calls.push(Call::Destroy(self.container));
    }
}

/// Minimal animation document tagged with its phase name.
pub fn document(phase: Phase) -> Value {
    json!({ "nm": phase.as_str(), "ip": 0, "op": 60, "fr": 30 })
}

pub fn documents() -> Vec<Value> {
    Phase::ALL.into_iter().map(document).collect()
}

/// Serves fixed documents by URL; unknown URLs fail.
#[derive(Default)]
pub struct MapFetcher {
    documents: HashMap<String, Value>,
}

impl MapFetcher {
    pub fn with(mut self, url: &str, document: Value) -> Self {
        self.documents.insert(url.to_string(), document);
        self
    }
}

impl Fetcher for MapFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        let result = self
            .documents
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("404 for {url}"));
        futures::future::ready(result).boxed_local()
    }
}

/// Fetches that stay pending until the test releases them.
#[derive(Default)]
pub struct GatedFetcher {
    gates: RefCell<HashMap<String, oneshot::Receiver<Value>>>,
}

impl GatedFetcher {
    /// Register `url`; returns the sender that completes its fetch.
    pub fn gate(&self, url: &str) -> oneshot::Sender<Value> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(url.to_string(), rx);
        tx
    }
}

impl Fetcher for GatedFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        let gate = self.gates.borrow_mut().remove(url);
        async move {
            let rx = gate.ok_or_else(|| anyhow!("no gate for {url}"))?;
            rx.await.map_err(|_| anyhow!("fetch of {url} was dropped"))
        }
        .boxed_local()
    }
}

/// Records observe/unobserve calls.
#[derive(Clone, Default)]
pub struct FakeObserver {
    log: Rc<RefCell<Vec<String>>>,
}

impl FakeObserver {
    pub fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl VisibilityObserver for FakeObserver {
    fn observe(&mut self, options: VisibilityOptions) {
        self.log
            .borrow_mut()
            .push(format!("observe threshold={}", options.threshold));
    }

    fn unobserve(&mut self) {
        self.log.borrow_mut().push("unobserve".to_string());
    }
}
