use std::fmt;

use anyhow::{bail, Result};
use serde_json::Value;
use vignette_core::phase::Phase;

/// The three animation documents of an illustration, in phase order.
///
/// Documents are opaque to the coordinator; they are handed to the playback
/// engine untouched. Construction guarantees all three are present and
/// non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Illustration {
    documents: [Value; Phase::COUNT],
}

impl Illustration {
    /// Build an illustration from its entrance, loop and action documents.
    pub fn new(entrance: Value, idle: Value, action: Value) -> Result<Self> {
        let documents = [entrance, idle, action];
        for phase in Phase::ALL {
            if is_empty_document(&documents[phase as usize]) {
                bail!("the {phase} animation document is empty");
            }
        }
        Ok(Self { documents })
    }

    /// Build an illustration from a host-supplied list, which must hold
    /// exactly three documents.
    pub fn from_values(values: Vec<Value>) -> Result<Self> {
        let count = values.len();
        let Ok([entrance, idle, action]) = <[Value; 3]>::try_from(values) else {
            bail!("an illustration needs exactly 3 animation documents, got {count}");
        };
        Self::new(entrance, idle, action)
    }

    /// The animation document for `phase`.
    pub fn document(&self, phase: Phase) -> &Value {
        &self.documents[phase as usize]
    }
}

fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Identifies the container a player renders into.
///
/// Handed to the playback engine on creation; completion notifications
/// come back tagged with it, which lets the coordinator drop completions
/// from players of an older configuration generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId {
    pub generation: u64,
    pub phase: Phase,
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}/{}", self.generation, self.phase)
    }
}
