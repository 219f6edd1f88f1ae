//! C ABI for the survival fire simulation.
//!
//! Every call takes the opaque `SurvivalFireInstance` pointer returned by
//! `survival_fire_new`, returns a `SurvivalFireErrorCode`, and leaves a
//! message for `survival_fire_get_last_error` when it fails. Fire ids cross
//! the boundary as null-terminated strings. Inventories stay with the host
//! and are reached through `InventoryCallbacks`.

mod cooking;
mod error;
mod helpers;
mod instance;
mod inventory;
mod persistence;
mod queries;
mod simulation;

pub use cooking::{survival_fire_start_cooking, survival_fire_update_cooking, CookingSummary};
pub use error::{survival_fire_get_last_error, survival_fire_get_last_error_code, SurvivalFireErrorCode};
pub use instance::{
    survival_fire_destroy, survival_fire_new, survival_fire_new_seeded, SurvivalFireInstance,
};
pub use inventory::InventoryCallbacks;
pub use persistence::{survival_fire_load_slot, survival_fire_save_slot};
pub use queries::{
    survival_fire_fire_count, survival_fire_get_fire_id, survival_fire_get_fire_state,
    survival_fire_poll_notification, survival_fire_warmth_at, FireStatus, SURVIVAL_FIRE_NO_REASON,
};
pub use simulation::{
    survival_fire_add_fuel, survival_fire_extinguish, survival_fire_ignite, survival_fire_set_weather,
    survival_fire_spawn, survival_fire_update, SURVIVAL_FIRE_NO_ACTOR,
};
