//! Fire lifecycle: types, the state machine and the fire aggregate.

pub mod fire_type;
pub mod instance;
pub mod state;

pub use fire_type::{FireType, FireTypeProperties, FireTypeTable};
pub use instance::{ExtinguishReason, FireInstance, FireUpdate, FuelAdded, TickContext};
pub use state::{next_state, FireState, FireThresholds};
