//! Queued fire commands.
//!
//! Commands from any actor are collected between ticks and applied in
//! submission order at the start of the next tick, so every tick sees a
//! consistent world and replays produce the same result.

use crate::core_types::{ActorId, FireId};
use crate::fire::ExtinguishReason;
use std::collections::VecDeque;

/// Kind of a fire command, for FFI and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireCommandType {
    Ignite,
    AddFuel,
    Extinguish,
}

impl FireCommandType {
    /// Convert from u8 for FFI compatibility
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(FireCommandType::Ignite),
            1 => Some(FireCommandType::AddFuel),
            2 => Some(FireCommandType::Extinguish),
            _ => None,
        }
    }

    /// Convert to u8 for FFI compatibility
    pub fn as_u8(self) -> u8 {
        match self {
            FireCommandType::Ignite => 0,
            FireCommandType::AddFuel => 1,
            FireCommandType::Extinguish => 2,
        }
    }
}

/// A request to change a fire
#[derive(Debug, Clone, PartialEq)]
pub enum FireCommand {
    /// Light a fire; with an actor, one of their ignition sources is needed
    Ignite {
        fire: FireId,
        actor: Option<ActorId>,
    },
    /// Move fuel from the actor's inventory into the fire
    AddFuel {
        fire: FireId,
        actor: ActorId,
        item_id: String,
        quantity: u32,
    },
    Extinguish {
        fire: FireId,
        reason: ExtinguishReason,
    },
}

impl FireCommand {
    pub fn ignite(fire: FireId, actor: ActorId) -> Self {
        FireCommand::Ignite {
            fire,
            actor: Some(actor),
        }
    }

    pub fn add_fuel(fire: FireId, actor: ActorId, item_id: impl Into<String>, quantity: u32) -> Self {
        FireCommand::AddFuel {
            fire,
            actor,
            item_id: item_id.into(),
            quantity,
        }
    }

    pub fn put_out(fire: FireId) -> Self {
        FireCommand::Extinguish {
            fire,
            reason: ExtinguishReason::PutOut,
        }
    }

    pub fn command_type(&self) -> FireCommandType {
        match self {
            FireCommand::Ignite { .. } => FireCommandType::Ignite,
            FireCommand::AddFuel { .. } => FireCommandType::AddFuel,
            FireCommand::Extinguish { .. } => FireCommandType::Extinguish,
        }
    }

    pub fn fire(&self) -> &FireId {
        match self {
            FireCommand::Ignite { fire, .. }
            | FireCommand::AddFuel { fire, .. }
            | FireCommand::Extinguish { fire, .. } => fire,
        }
    }
}

/// Pending commands plus a bounded history of applied ones
#[derive(Debug)]
pub struct CommandQueue {
    pending: Vec<FireCommand>,
    /// Applied during the current tick
    applied_this_tick: Vec<FireCommand>,
    history: VecDeque<FireCommand>,
    max_history: usize,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl CommandQueue {
    pub fn new(max_history: usize) -> Self {
        Self {
            pending: Vec::with_capacity(16),
            applied_this_tick: Vec::with_capacity(16),
            history: VecDeque::with_capacity(max_history.min(1024)),
            max_history,
        }
    }

    /// Queue a command for the next tick
    pub fn submit(&mut self, command: FireCommand) {
        self.pending.push(command);
    }

    pub fn pending(&self) -> &[FireCommand] {
        &self.pending
    }

    pub fn applied_this_tick(&self) -> &[FireCommand] {
        &self.applied_this_tick
    }

    pub fn history(&self) -> impl Iterator<Item = &FireCommand> {
        self.history.iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn begin_tick(&mut self) {
        self.applied_this_tick.clear();
    }

    /// Take all pending commands in submission order
    pub fn take_pending(&mut self) -> Vec<FireCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn mark_applied(&mut self, command: FireCommand) {
        self.applied_this_tick.push(command.clone());
        self.history.push_back(command);
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.applied_this_tick.clear();
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_type_conversion() {
        for ty in [
            FireCommandType::Ignite,
            FireCommandType::AddFuel,
            FireCommandType::Extinguish,
        ] {
            assert_eq!(FireCommandType::from_u8(ty.as_u8()), Some(ty));
        }
        assert_eq!(FireCommandType::from_u8(3), None);
    }

    #[test]
    fn test_pending_keeps_submission_order() {
        let mut queue = CommandQueue::new(100);
        let fire = FireId::new("fire-0001");
        queue.submit(FireCommand::add_fuel(fire.clone(), ActorId(1), "wood_log", 1));
        queue.submit(FireCommand::ignite(fire.clone(), ActorId(1)));

        let pending = queue.take_pending();
        assert_eq!(pending[0].command_type(), FireCommandType::AddFuel);
        assert_eq!(pending[1].command_type(), FireCommandType::Ignite);
        assert!(queue.pending().is_empty());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut queue = CommandQueue::new(3);
        for i in 0..5 {
            queue.mark_applied(FireCommand::put_out(FireId::new(format!("fire-{i:04}"))));
        }
        assert_eq!(queue.history_len(), 3);
        assert_eq!(queue.history().next().unwrap().fire().as_str(), "fire-0002");
    }

    #[test]
    fn test_tick_lifecycle() {
        let mut queue = CommandQueue::new(10);
        queue.mark_applied(FireCommand::put_out(FireId::new("fire-0001")));
        assert_eq!(queue.applied_this_tick().len(), 1);
        queue.begin_tick();
        assert!(queue.applied_this_tick().is_empty());
        assert_eq!(queue.history_len(), 1);
    }
}
