//! Survival Fire Core Library
//!
//! Engine-independent simulation of player-built fires for a survival game:
//! fuel burning, the fire lifecycle state machine, temperature and warmth,
//! weather effects, cooking over a fire, and saving fires between sessions.
//!
//! ## Overview
//!
//! - [`FireSimulation`] owns the fires of one session and advances them with
//!   [`FireSimulation::tick`]
//! - [`FireInstance`] is a single fire; its state is recomputed every tick from
//!   temperature and remaining fuel
//! - [`CookingTracker`] ages raw items into cooked ones on a burning fire
//! - [`SaveStore`] reads and writes save slots of [`FireRecord`]s
//!
//! Inventories and player notifications stay with the host, behind the
//! [`Inventory`] and [`NotificationSink`] traits.

// Core types and utilities
pub mod core_types;
pub mod error;

// Content tables and configuration
pub mod config;
pub mod fuel;

// Fire lifecycle
pub mod environment;
pub mod fire;
pub mod thermal;

// Collaborators
pub mod cooking;
pub mod events;
pub mod inventory;
pub mod notifications;

// Session driver and persistence
pub mod simulation;

// Re-export core types
pub use core_types::{ActorId, FireId, Rotation, Vec3};
pub use error::{FireError, InvalidOperation, MissingConfiguration};

pub use config::{IgnitionSource, SimulationConfig};
pub use fuel::{FuelItem, FuelStock, FuelTable, FuelType, FuelTypeProperties};

pub use environment::{apply_environment, EffectOutcome, Weather};
pub use fire::{
    ExtinguishReason, FireInstance, FireState, FireThresholds, FireType, FireTypeProperties,
    FireTypeTable, FuelAdded,
};
pub use thermal::{FalloffCurve, Keyframe, ThermalConfig};

pub use cooking::{
    CookingConfig, CookingOutcome, CookingProcess, CookingRecipe, CookingTracker, FireLookup,
    ProcessId, RecipeBook,
};
pub use events::{EventBus, FireEvent, SubscriptionId};
pub use inventory::{Inventories, Inventory, InventoryProvider, ItemDef, NoInventories, SimpleInventory};
pub use notifications::{Notification, NotificationLog, NotificationSink, NullNotifier, Severity, TracingNotifier};

pub use simulation::{
    BackgroundSaver, FireCommand, FireCommandType, FireRecord, FireSimulation, PersistenceError,
    SaveStore, TickReport,
};
