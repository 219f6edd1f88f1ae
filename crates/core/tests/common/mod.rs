//! Shared setup for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use survival_fire_core::{
    ActorId, FireId, FireSimulation, FireState, FireType, FireTypeProperties, FuelType,
    FuelTypeProperties, Inventories, ItemDef, NotificationLog, Rotation, SimpleInventory,
    SimulationConfig, Vec3,
};

pub const PLAYER: ActorId = ActorId(1);

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Config with short-burning logs so lifecycles fit in a few seconds.
///
/// Campfires hold 100 burn-seconds here, so one short log stays well above
/// the dying threshold until it has mostly burned.
pub fn quick_logs_config(burn_duration: f32, burn_temperature: f32) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.fuel_types.insert(
        FuelType::Logs,
        FuelTypeProperties::new("Logs", burn_duration, burn_temperature, 1.0),
    );
    config.fire_types.insert(
        FireType::Campfire,
        FireTypeProperties::new("Campfire", 100.0, 10.0, 900.0, 1.0),
    );
    config
}

pub fn simulation(config: SimulationConfig, seed: u64) -> (FireSimulation, Arc<NotificationLog>) {
    let log = Arc::new(NotificationLog::new());
    let sim = FireSimulation::with_seed(config, log.clone(), seed);
    (sim, log)
}

pub fn player_inventory(items: &[(&str, u32)]) -> Inventories {
    let mut inventory = SimpleInventory::new();
    for (item_id, quantity) in items {
        inventory = inventory.with_item(*item_id, *quantity);
    }
    let mut inventories = Inventories::new();
    inventories.insert(PLAYER, inventory);
    inventories
}

pub fn spawn_at(sim: &mut FireSimulation, fire_type: FireType, x: f32) -> FireId {
    sim.spawn_fire(fire_type, Vec3::new(x, 0.0, 0.0), Rotation::identity(), true)
        .expect("fire type configured")
}

/// Tick until `fire` reaches `state`, returning the ticks taken
pub fn tick_until(
    sim: &mut FireSimulation,
    inventories: &mut Inventories,
    fire: &FireId,
    state: FireState,
    max_ticks: usize,
) -> Option<usize> {
    for tick in 1..=max_ticks {
        sim.tick(0.1, inventories);
        if sim.fire(fire).map(|f| f.state()) == Some(state) {
            return Some(tick);
        }
    }
    None
}

pub fn item(id: &str, name: &str) -> ItemDef {
    ItemDef::new(id, name)
}
