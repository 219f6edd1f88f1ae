//! Fire simulation driver
//!
//! `FireSimulation` owns every fire in a session and advances them together:
//!
//! 1. queued commands, in submission order
//! 2. fuel burn, temperature and state per fire (parallel for large worlds)
//! 3. weather effects, sequential so the RNG sequence is reproducible
//! 4. notifications and events
//! 5. removal of extinguished fires
//! 6. auto-save

pub mod command_queue;
pub mod persistence;

pub use command_queue::{CommandQueue, FireCommand, FireCommandType};
pub use persistence::{
    AutoSaveTimer, BackgroundSaver, FireRecord, PersistenceError, SaveJob, SaveStore,
};

use crate::config::SimulationConfig;
use crate::cooking::{CookingTracker, FireLookup, RecipeBook};
use crate::core_types::{ActorId, FireId, Rotation, Vec3};
use crate::environment::{apply_environment, Weather};
use crate::error::{FireError, InvalidOperation};
use crate::events::{EventBus, FireEvent};
use crate::fire::{
    ExtinguishReason, FireInstance, FireState, FireType, FireUpdate, FuelAdded, TickContext,
};
use crate::inventory::{Inventory, InventoryProvider};
use crate::notifications::{NotificationSink, Severity};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

/// Summary of one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub commands_applied: usize,
    /// Commands that were refused, with the reason
    pub command_failures: Vec<(FireCommand, FireError)>,
    pub state_changes: Vec<(FireId, FireState, FireState)>,
    pub extinguished: Vec<(FireId, ExtinguishReason)>,
    /// Extinguished fires taken out of the world this tick
    pub removed: Vec<FireId>,
    /// An auto-save job was handed to the background saver
    pub autosave_queued: bool,
}

struct AutoSaveTarget {
    saver: BackgroundSaver,
    path: PathBuf,
    slot: String,
}

/// All fires of one game session
pub struct FireSimulation {
    config: SimulationConfig,
    recipes: Arc<RecipeBook>,
    notifier: Arc<dyn NotificationSink>,

    fires: Vec<FireInstance>,
    next_fire_number: u64,

    weather: Weather,
    rng: StdRng,
    commands: CommandQueue,
    events: EventBus<FireEvent>,

    autosave_timer: AutoSaveTimer,
    autosave: Option<AutoSaveTarget>,

    simulation_time: f32,
    frame_number: u32,
}

impl FireSimulation {
    /// Create an empty simulation seeded from the OS
    #[must_use]
    pub fn new(config: SimulationConfig, notifier: Arc<dyn NotificationSink>) -> Self {
        Self::with_rng(config, notifier, StdRng::from_os_rng())
    }

    /// Create an empty simulation with a deterministic random sequence
    #[must_use]
    pub fn with_seed(config: SimulationConfig, notifier: Arc<dyn NotificationSink>, seed: u64) -> Self {
        Self::with_rng(config, notifier, StdRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn with_rng(
        config: SimulationConfig,
        notifier: Arc<dyn NotificationSink>,
        rng: StdRng,
    ) -> Self {
        let recipes = Arc::new(config.recipes.clone());
        let autosave_timer = AutoSaveTimer::new(config.autosave_interval);
        Self {
            config,
            recipes,
            notifier,
            fires: Vec::new(),
            next_fire_number: 1,
            weather: Weather::default(),
            rng,
            commands: CommandQueue::default(),
            events: EventBus::new(),
            autosave_timer,
            autosave: None,
            simulation_time: 0.0,
            frame_number: 0,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn weather(&self) -> &Weather {
        &self.weather
    }

    pub fn set_weather(&mut self, weather: Weather) {
        self.weather = weather;
    }

    pub fn fires(&self) -> &[FireInstance] {
        &self.fires
    }

    pub fn fire(&self, id: &FireId) -> Option<&FireInstance> {
        self.fires.iter().find(|fire| fire.id() == id)
    }

    pub fn fire_count(&self) -> usize {
        self.fires.len()
    }

    pub fn simulation_time(&self) -> f32 {
        self.simulation_time
    }

    pub fn frame_number(&self) -> u32 {
        self.frame_number
    }

    pub fn events(&self) -> &EventBus<FireEvent> {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus<FireEvent> {
        &mut self.events
    }

    pub fn commands(&self) -> &CommandQueue {
        &self.commands
    }

    /// A cooking tracker sharing this session's recipes and notifier
    pub fn cooking_tracker(&self) -> CookingTracker {
        CookingTracker::new(
            self.recipes.clone(),
            self.config.cooking.clone(),
            self.notifier.clone(),
        )
    }

    /// Hand auto-saves to `saver`, writing `slot` of the save file at `path`
    pub fn enable_autosave(&mut self, saver: BackgroundSaver, path: impl Into<PathBuf>, slot: impl Into<String>) {
        self.autosave = Some(AutoSaveTarget {
            saver,
            path: path.into(),
            slot: slot.into(),
        });
        self.autosave_timer.reset();
    }

    /// Stop auto-saving and hand the saver back
    pub fn disable_autosave(&mut self) -> Option<BackgroundSaver> {
        self.autosave.take().map(|target| target.saver)
    }

    fn index_of(&self, id: &FireId) -> Result<usize, FireError> {
        self.fires
            .iter()
            .position(|fire| fire.id() == id)
            .ok_or_else(|| FireError::UnknownFire(id.clone()))
    }

    fn allocate_id(&mut self) -> FireId {
        loop {
            let id = FireId::new(format!("fire-{:04}", self.next_fire_number));
            self.next_fire_number += 1;
            if self.fire(&id).is_none() {
                return id;
            }
        }
    }

    /// Place a new unlit fire in the world
    ///
    /// # Errors
    /// `MissingConfiguration` if `fire_type` has no table entry
    pub fn spawn_fire(
        &mut self,
        fire_type: FireType,
        position: Vec3,
        rotation: Rotation,
        is_player_made: bool,
    ) -> Result<FireId, FireError> {
        let properties = self.config.fire_types.get(fire_type)?.clone();
        let id = self.allocate_id();
        let fire = FireInstance::new(
            id.clone(),
            fire_type,
            &properties,
            position,
            rotation,
            is_player_made,
            self.weather.ambient_temperature,
        );
        tracing::info!(
            "Spawned {} {} at ({:.1}, {:.1}, {:.1})",
            fire_type,
            id,
            position.x,
            position.y,
            position.z
        );
        self.fires.push(fire);
        self.events.publish(FireEvent::Spawned {
            fire: id.clone(),
            fire_type,
        });
        Ok(id)
    }

    /// Queue a command for the start of the next tick
    pub fn submit(&mut self, command: FireCommand) {
        self.commands.submit(command);
    }

    pub fn pending_command_count(&self) -> usize {
        self.commands.pending().len()
    }

    /// Light a fire now.
    ///
    /// With an actor, one of the configured ignition sources must be in their
    /// inventory; consumable sources are used up only if the fire lights.
    ///
    /// # Errors
    /// `UnknownFire`, `NoInventory`, `NoIgnitionSource`, or any error of
    /// `FireInstance::ignite`.
    pub fn ignite_fire(
        &mut self,
        id: &FireId,
        actor: Option<ActorId>,
        inventories: &mut dyn InventoryProvider,
    ) -> Result<(), FireError> {
        let index = self.index_of(id)?;

        let mut inventory: Option<&mut dyn Inventory> = None;
        let mut source = None;
        if let Some(actor) = actor {
            let inv = inventories
                .inventory_mut(actor)
                .ok_or(FireError::InvalidOperation(InvalidOperation::NoInventory))?;
            let found = self
                .config
                .ignition_sources
                .iter()
                .find(|candidate| inv.has_item(&candidate.item_id, 1))
                .cloned();
            let Some(found) = found else {
                self.notifier
                    .notify("You need something to light the fire with.", Severity::Warning);
                return Err(InvalidOperation::NoIgnitionSource.into());
            };
            source = Some(found);
            inventory = Some(inv);
        }

        let fire = &mut self.fires[index];
        if let Err(err) = fire.ignite(&self.config.thresholds) {
            notify_failure(self.notifier.as_ref(), &err);
            return Err(err);
        }

        if let (Some(source), Some(inv)) = (source, inventory) {
            if source.consumed && !inv.remove_item(&source.item_id, 1) {
                tracing::warn!("Ignition source {} vanished while lighting {id}", source.item_id);
            }
        }

        let label = fire_label(&self.config, fire.fire_type());
        self.notifier
            .notify(&format!("The {label} is lit."), Severity::Success);
        self.events.publish(FireEvent::Ignited { fire: id.clone() });
        Ok(())
    }

    /// Move `quantity` of a fuel item from the actor's inventory into a fire now.
    ///
    /// # Errors
    /// `UnknownFire`, `MissingConfiguration` if the item is not fuel,
    /// `NoInventory`, `MissingItem`, or any error of `FireInstance::add_fuel`.
    /// Nothing is removed from the inventory on error.
    pub fn add_fuel(
        &mut self,
        id: &FireId,
        actor: ActorId,
        item_id: &str,
        quantity: u32,
        inventories: &mut dyn InventoryProvider,
    ) -> Result<FuelAdded, FireError> {
        let index = self.index_of(id)?;
        let fuel_type = match self.config.fuel_type_of(item_id) {
            Ok(fuel_type) => fuel_type,
            Err(missing) => {
                tracing::warn!("Refusing to add {item_id} to {id}: {missing}");
                return Err(missing.into());
            }
        };

        let inventory = inventories
            .inventory_mut(actor)
            .ok_or(FireError::InvalidOperation(InvalidOperation::NoInventory))?;
        if !inventory.has_item(item_id, quantity) {
            let err = FireError::from(InvalidOperation::MissingItem {
                item_id: item_id.to_string(),
                quantity,
            });
            notify_failure(self.notifier.as_ref(), &err);
            return Err(err);
        }

        let fire = &mut self.fires[index];
        let added = match fire.add_fuel(item_id, fuel_type, quantity, &self.config.fuel_types) {
            Ok(added) => added,
            Err(err) => {
                if err.is_user_facing() {
                    notify_failure(self.notifier.as_ref(), &err);
                } else {
                    tracing::warn!("Refusing to add {item_id} to {id}: {err}");
                }
                return Err(err);
            }
        };

        if !inventory.remove_item(item_id, added.consumed_quantity) {
            tracing::warn!("{actor} lost {item_id} while fueling {id}");
        }

        self.events.publish(FireEvent::FuelAdded {
            fire: id.clone(),
            item_id: item_id.to_string(),
            accepted: added.accepted,
            fuel_amount: added.fuel_amount,
        });
        Ok(added)
    }

    /// Put a fire out now. Returns `false` if it was not burning.
    ///
    /// # Errors
    /// `UnknownFire` if no fire has this id
    pub fn extinguish_fire(&mut self, id: &FireId, reason: ExtinguishReason) -> Result<bool, FireError> {
        let index = self.index_of(id)?;
        let fire = &mut self.fires[index];
        if !fire.extinguish(reason) {
            return Ok(false);
        }
        let label = fire_label(&self.config, fire.fire_type());
        announce_extinguish(self.notifier.as_ref(), &label, reason);
        self.events.publish(FireEvent::Extinguished {
            fire: id.clone(),
            reason,
        });
        Ok(true)
    }

    fn apply_command(
        &mut self,
        command: &FireCommand,
        inventories: &mut dyn InventoryProvider,
    ) -> Result<(), FireError> {
        match command {
            FireCommand::Ignite { fire, actor } => self.ignite_fire(fire, *actor, inventories),
            FireCommand::AddFuel {
                fire,
                actor,
                item_id,
                quantity,
            } => self
                .add_fuel(fire, *actor, item_id, *quantity, inventories)
                .map(|_| ()),
            FireCommand::Extinguish { fire, reason } => {
                self.extinguish_fire(fire, *reason).map(|_| ())
            }
        }
    }

    /// Advance the whole session by `dt` seconds
    pub fn tick(&mut self, dt: f32, inventories: &mut dyn InventoryProvider) -> TickReport {
        let mut report = TickReport::default();
        self.frame_number = self.frame_number.wrapping_add(1);

        // 1. Commands
        self.commands.begin_tick();
        for command in self.commands.take_pending() {
            match self.apply_command(&command, inventories) {
                Ok(()) => report.commands_applied += 1,
                Err(err) => {
                    tracing::debug!("Command on {} refused: {err}", command.fire());
                    report.command_failures.push((command.clone(), err));
                }
            }
            self.commands.mark_applied(command);
        }

        if dt > 0.0 {
            self.simulation_time += dt;

            // 2. Fuel, temperature and state
            let updates = self.advance_fires(dt);

            // 3. Weather, in fire order for a reproducible RNG sequence
            let mut weather_outs = Vec::new();
            for fire in &mut self.fires {
                if let Some(reason) = apply_environment(fire, &self.weather, dt, &mut self.rng) {
                    weather_outs.push((fire.id().clone(), reason));
                }
            }

            // 4. Notifications and events
            self.publish_updates(&updates, &mut report);
            for (id, reason) in weather_outs {
                let label = self
                    .fire(&id)
                    .map(|fire| fire_label(&self.config, fire.fire_type()))
                    .unwrap_or_else(|| "fire".to_string());
                announce_extinguish(self.notifier.as_ref(), &label, reason);
                self.events.publish(FireEvent::Extinguished {
                    fire: id.clone(),
                    reason,
                });
                report.extinguished.push((id, reason));
            }
        }

        // 5. Extinguished fires leave the world
        self.remove_extinguished(&mut report);

        // 6. Auto-save
        if self.autosave_timer.advance(dt) {
            report.autosave_queued = self.queue_autosave();
        }

        report
    }

    fn advance_fires(&mut self, dt: f32) -> Vec<FireUpdate> {
        let ctx = TickContext {
            fuel_table: &self.config.fuel_types,
            thresholds: &self.config.thresholds,
            thermal: &self.config.thermal,
            ambient_temperature: self.weather.ambient_temperature,
        };

        if self.fires.len() >= self.config.parallel_threshold.max(1) {
            self.fires
                .par_iter_mut()
                .map(|fire| fire.advance(dt, &ctx))
                .collect()
        } else {
            self.fires
                .iter_mut()
                .map(|fire| fire.advance(dt, &ctx))
                .collect()
        }
    }

    fn publish_updates(&mut self, updates: &[FireUpdate], report: &mut TickReport) {
        for (fire, update) in self.fires.iter().zip(updates) {
            let id = fire.id();
            let label = fire_label(&self.config, fire.fire_type());

            if update.changed_state() {
                report
                    .state_changes
                    .push((id.clone(), update.previous_state, update.state));
                self.events.publish(FireEvent::StateChanged {
                    fire: id.clone(),
                    from: update.previous_state,
                    to: update.state,
                });
            }

            if update.started_needing_fuel {
                self.notifier.notify(
                    &format!("The {label} is running low on fuel."),
                    Severity::Warning,
                );
                self.events.publish(FireEvent::NeedsFuel { fire: id.clone() });
            }

            if update.state == FireState::Extinguished
                && update.previous_state != FireState::Extinguished
            {
                let reason = fire
                    .extinguish_reason()
                    .unwrap_or(ExtinguishReason::FuelExhausted);
                announce_extinguish(self.notifier.as_ref(), &label, reason);
                self.events.publish(FireEvent::Extinguished {
                    fire: id.clone(),
                    reason,
                });
                report.extinguished.push((id.clone(), reason));
            }
        }
    }

    fn remove_extinguished(&mut self, report: &mut TickReport) {
        let mut removed = Vec::new();
        self.fires.retain(|fire| {
            if fire.is_extinguished() {
                removed.push(fire.id().clone());
                false
            } else {
                true
            }
        });
        for id in removed {
            tracing::debug!("Removing extinguished fire {id}");
            self.events.publish(FireEvent::Removed { fire: id.clone() });
            report.removed.push(id);
        }
    }

    fn queue_autosave(&mut self) -> bool {
        let Some(target) = &self.autosave else {
            return false;
        };
        let job = SaveJob {
            path: target.path.clone(),
            slot: target.slot.clone(),
            records: self.snapshot(),
        };
        match target.saver.submit(job) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!("Auto-save could not be queued: {err}");
                false
            }
        }
    }

    /// Total warmth felt at `position` from every fire
    pub fn warmth_at(&self, position: &Vec3) -> f32 {
        self.fires
            .iter()
            .map(|fire| fire.warmth_at(position, &self.config.thermal))
            .sum()
    }

    /// Closest lit fire within `max_distance` of `position`
    pub fn nearest_lit_fire(&self, position: &Vec3, max_distance: f32) -> Option<&FireInstance> {
        self.fires
            .iter()
            .filter(|fire| fire.is_lit())
            .map(|fire| ((fire.position() - position).magnitude(), fire))
            .filter(|(distance, _)| *distance <= max_distance)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, fire)| fire)
    }
}

impl FireLookup for FireSimulation {
    fn fire(&self, id: &FireId) -> Option<&FireInstance> {
        FireSimulation::fire(self, id)
    }
}

fn fire_label(config: &SimulationConfig, fire_type: FireType) -> String {
    config
        .fire_types
        .get(fire_type)
        .map(|props| props.display_name.to_lowercase())
        .unwrap_or_else(|_| fire_type.to_string())
}

fn announce_extinguish(notifier: &dyn NotificationSink, label: &str, reason: ExtinguishReason) {
    let severity = match reason {
        ExtinguishReason::PutOut => Severity::Info,
        _ => Severity::Warning,
    };
    notifier.notify(&format!("The {label} {reason}."), severity);
}

fn notify_failure(notifier: &dyn NotificationSink, err: &FireError) {
    let message = match err {
        FireError::InvalidOperation(InvalidOperation::AlreadyLit) => "The fire is already lit.",
        FireError::InvalidOperation(InvalidOperation::AlreadyExtinguished) => {
            "The fire has gone out for good."
        }
        FireError::InvalidOperation(InvalidOperation::InsufficientFuel { .. }) => {
            "Add some fuel before lighting the fire."
        }
        FireError::InvalidOperation(InvalidOperation::FireFull { .. }) => {
            "The fire can't hold any more fuel."
        }
        FireError::InvalidOperation(InvalidOperation::MissingItem { .. }) => {
            "You don't have enough of that item."
        }
        _ => return,
    };
    notifier.notify(message, Severity::Warning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{Inventories, NoInventories, SimpleInventory};
    use crate::notifications::NotificationLog;
    use approx::assert_relative_eq;

    const PLAYER: ActorId = ActorId(1);

    fn setup() -> (FireSimulation, Arc<NotificationLog>, Inventories) {
        let log = Arc::new(NotificationLog::new());
        let sim = FireSimulation::with_seed(SimulationConfig::default(), log.clone(), 7);
        let mut inventories = Inventories::new();
        inventories.insert(
            PLAYER,
            SimpleInventory::new()
                .with_item("wood_log", 4)
                .with_item("matches", 2),
        );
        (sim, log, inventories)
    }

    fn spawn(sim: &mut FireSimulation) -> FireId {
        sim.spawn_fire(FireType::Campfire, Vec3::zeros(), Rotation::identity(), true)
            .unwrap()
    }

    #[test]
    fn test_spawn_assigns_unique_ids() {
        let (mut sim, _, _) = setup();
        let a = spawn(&mut sim);
        let b = spawn(&mut sim);
        assert_ne!(a, b);
        assert_eq!(sim.fire_count(), 2);
        assert_eq!(sim.fire(&a).unwrap().state(), FireState::Unlit);
    }

    #[test]
    fn test_add_fuel_moves_items_from_inventory() {
        let (mut sim, _, mut inventories) = setup();
        let id = spawn(&mut sim);
        let added = sim
            .add_fuel(&id, PLAYER, "wood_log", 1, &mut inventories)
            .unwrap();
        assert_eq!(added.consumed_quantity, 1);
        assert_relative_eq!(added.accepted, 120.0);
        assert_relative_eq!(sim.fire(&id).unwrap().fuel_amount(), 120.0);
        assert_eq!(inventories.get(PLAYER).unwrap().item_count("wood_log"), 3);
    }

    #[test]
    fn test_default_campfire_holds_three_logs() {
        let (mut sim, _, mut inventories) = setup();
        let id = spawn(&mut sim);
        for _ in 0..3 {
            let added = sim
                .add_fuel(&id, PLAYER, "wood_log", 1, &mut inventories)
                .unwrap();
            assert_relative_eq!(added.accepted, 120.0);
        }
        let fire = sim.fire(&id).unwrap();
        assert_relative_eq!(fire.fuel_amount(), fire.max_fuel_capacity());
    }

    #[test]
    fn test_full_fire_keeps_inventory() {
        let (mut sim, log, mut inventories) = setup();
        let id = spawn(&mut sim);
        sim.add_fuel(&id, PLAYER, "wood_log", 3, &mut inventories)
            .unwrap();
        log.drain();

        let err = sim
            .add_fuel(&id, PLAYER, "wood_log", 1, &mut inventories)
            .unwrap_err();
        assert!(matches!(
            err,
            FireError::InvalidOperation(InvalidOperation::FireFull { .. })
        ));
        assert_eq!(inventories.get(PLAYER).unwrap().item_count("wood_log"), 1);
        assert!(log.contains("can't hold any more fuel"));
    }

    #[test]
    fn test_ignite_consumes_matches() {
        let (mut sim, _, mut inventories) = setup();
        let id = spawn(&mut sim);
        sim.add_fuel(&id, PLAYER, "wood_log", 1, &mut inventories)
            .unwrap();
        sim.ignite_fire(&id, Some(PLAYER), &mut inventories).unwrap();
        assert_eq!(sim.fire(&id).unwrap().state(), FireState::Igniting);
        assert_eq!(inventories.get(PLAYER).unwrap().item_count("matches"), 1);
    }

    #[test]
    fn test_ignite_without_source_fails() {
        let (mut sim, log, _) = setup();
        let mut inventories = Inventories::new();
        inventories.insert(PLAYER, SimpleInventory::new().with_item("wood_log", 1));
        let id = spawn(&mut sim);
        sim.add_fuel(&id, PLAYER, "wood_log", 1, &mut inventories)
            .unwrap();

        let err = sim
            .ignite_fire(&id, Some(PLAYER), &mut inventories)
            .unwrap_err();
        assert_eq!(
            err,
            FireError::InvalidOperation(InvalidOperation::NoIgnitionSource)
        );
        assert!(log.contains("light the fire"));
        assert_eq!(sim.fire(&id).unwrap().state(), FireState::Unlit);
    }

    #[test]
    fn test_failed_ignite_keeps_matches() {
        let (mut sim, _, mut inventories) = setup();
        let id = spawn(&mut sim);
        assert!(sim.ignite_fire(&id, Some(PLAYER), &mut inventories).is_err());
        assert_eq!(inventories.get(PLAYER).unwrap().item_count("matches"), 2);
    }

    #[test]
    fn test_commands_apply_in_submission_order() {
        let (mut sim, _, mut inventories) = setup();
        let id = spawn(&mut sim);
        sim.submit(FireCommand::add_fuel(id.clone(), PLAYER, "wood_log", 1));
        sim.submit(FireCommand::ignite(id.clone(), PLAYER));
        assert_eq!(sim.pending_command_count(), 2);

        let report = sim.tick(0.1, &mut inventories);
        assert_eq!(report.commands_applied, 2);
        assert!(report.command_failures.is_empty());
        assert!(sim.fire(&id).unwrap().is_lit());
    }

    #[test]
    fn test_unknown_fire_command_is_reported() {
        let (mut sim, _, mut inventories) = setup();
        sim.submit(FireCommand::put_out(FireId::new("fire-9999")));
        let report = sim.tick(0.1, &mut inventories);
        assert_eq!(report.command_failures.len(), 1);
        assert!(matches!(
            report.command_failures[0].1,
            FireError::UnknownFire(_)
        ));
    }

    #[test]
    fn test_extinguish_notifies_once() {
        let (mut sim, log, mut inventories) = setup();
        let id = spawn(&mut sim);
        sim.add_fuel(&id, PLAYER, "wood_log", 1, &mut inventories)
            .unwrap();
        sim.ignite_fire(&id, None, &mut NoInventories).unwrap();
        log.drain();

        assert!(sim.extinguish_fire(&id, ExtinguishReason::PutOut).unwrap());
        assert!(!sim.extinguish_fire(&id, ExtinguishReason::PutOut).unwrap());
        assert_eq!(log.len(), 1);

        let report = sim.tick(0.1, &mut NoInventories);
        assert_eq!(report.removed, vec![id.clone()]);
        assert!(sim.fire(&id).is_none());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_warmth_sums_over_fires() {
        let (mut sim, _, mut inventories) = setup();
        let a = spawn(&mut sim);
        let b = sim
            .spawn_fire(
                FireType::Campfire,
                Vec3::new(1.0, 0.0, 0.0),
                Rotation::identity(),
                true,
            )
            .unwrap();
        for id in [&a, &b] {
            sim.add_fuel(id, PLAYER, "wood_log", 1, &mut inventories)
                .unwrap();
            sim.ignite_fire(id, None, &mut NoInventories).unwrap();
        }
        // Igniting fires use the smoldering radius of 2
        let warmth = sim.warmth_at(&Vec3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(warmth, 15.0, epsilon = 1e-4);
        assert!(sim.nearest_lit_fire(&Vec3::new(0.9, 0.0, 0.0), 5.0).is_some());
        assert_eq!(sim.warmth_at(&Vec3::new(50.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_parallel_and_sequential_updates_agree() {
        let build = |threshold: usize| {
            let config = SimulationConfig {
                parallel_threshold: threshold,
                ..SimulationConfig::default()
            };
            let mut sim = FireSimulation::with_seed(config, Arc::new(NotificationLog::new()), 3);
            let mut inventories = Inventories::new();
            inventories.insert(PLAYER, SimpleInventory::new().with_item("stick", 100));
            for i in 0..8 {
                let id = sim
                    .spawn_fire(
                        FireType::Campfire,
                        Vec3::new(i as f32 * 10.0, 0.0, 0.0),
                        Rotation::identity(),
                        false,
                    )
                    .unwrap();
                sim.add_fuel(&id, PLAYER, "stick", 1 + i % 3, &mut inventories)
                    .unwrap();
                sim.ignite_fire(&id, None, &mut NoInventories).unwrap();
            }
            for _ in 0..50 {
                sim.tick(0.1, &mut NoInventories);
            }
            sim.fires()
                .iter()
                .map(|fire| (fire.state(), fire.temperature()))
                .collect::<Vec<_>>()
        };

        let sequential = build(1000);
        let parallel = build(1);
        assert_eq!(sequential.len(), parallel.len());
        for (s, p) in sequential.iter().zip(&parallel) {
            assert_eq!(s.0, p.0);
            assert_relative_eq!(s.1, p.1);
        }
    }
}
