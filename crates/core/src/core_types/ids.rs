//! Identifier newtypes shared across the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a fire within a save.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FireId(String);

impl FireId {
    pub fn new(id: impl Into<String>) -> Self {
        FireId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FireId {
    fn from(value: &str) -> Self {
        FireId(value.to_string())
    }
}

/// Player or NPC that owns an inventory and issues commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{}", self.0)
    }
}
