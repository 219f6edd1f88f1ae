use crate::core_types::{FireId, Rotation, Vec3};
use crate::error::{FireError, InvalidOperation};
use crate::fire::fire_type::{FireType, FireTypeProperties};
use crate::fire::state::{next_state, FireState, FireThresholds};
use crate::fuel::{FuelItem, FuelStock, FuelTable, FuelType};
use crate::thermal::{smooth_toward, target_temperature, ThermalConfig};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a fire went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtinguishReason {
    /// The last fuel burned away
    FuelExhausted,
    /// An actor put it out
    PutOut,
    /// Heavy rain drowned it
    Rain,
    /// A gale blew it out
    Wind,
}

impl ExtinguishReason {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ExtinguishReason::FuelExhausted),
            1 => Some(ExtinguishReason::PutOut),
            2 => Some(ExtinguishReason::Rain),
            3 => Some(ExtinguishReason::Wind),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            ExtinguishReason::FuelExhausted => 0,
            ExtinguishReason::PutOut => 1,
            ExtinguishReason::Rain => 2,
            ExtinguishReason::Wind => 3,
        }
    }
}

impl fmt::Display for ExtinguishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExtinguishReason::FuelExhausted => "ran out of fuel",
            ExtinguishReason::PutOut => "was put out",
            ExtinguishReason::Rain => "was drowned by the rain",
            ExtinguishReason::Wind => "was blown out by the wind",
        };
        f.write_str(text)
    }
}

/// Everything a fire needs from the world to advance one tick
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub fuel_table: &'a FuelTable,
    pub thresholds: &'a FireThresholds,
    pub thermal: &'a ThermalConfig,
    /// Ambient air temperature (°C)
    pub ambient_temperature: f32,
}

/// Result of advancing one fire by one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireUpdate {
    pub previous_state: FireState,
    pub state: FireState,
    /// Burn-seconds consumed this tick
    pub fuel_consumed: f32,
    /// The fire crossed below the needs-fuel percentage this tick
    pub started_needing_fuel: bool,
}

impl FireUpdate {
    pub fn changed_state(&self) -> bool {
        self.previous_state != self.state
    }
}

/// Outcome of a successful fuel addition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelAdded {
    /// Burn-seconds the fire accepted
    pub accepted: f32,
    /// Inventory units used up by the addition
    pub consumed_quantity: u32,
    /// Fuel amount after the addition
    pub fuel_amount: f32,
}

/// A single fire in the world
#[derive(Debug, Clone)]
pub struct FireInstance {
    pub(crate) id: FireId,
    pub(crate) fire_type: FireType,
    pub(crate) state: FireState,
    pub(crate) temperature: f32, // °C
    pub(crate) fuel_amount: f32, // burn-seconds
    pub(crate) max_fuel_capacity: f32,
    pub(crate) burn_time_elapsed: f32, // seconds lit
    pub(crate) fuel: FuelStock,
    pub(crate) is_lit: bool,
    pub(crate) is_player_made: bool,
    pub(crate) position: Vec3,
    pub(crate) rotation: Rotation,
    pub(crate) extinguish_reason: Option<ExtinguishReason>,

    // Copied from the fire type table at creation
    pub(crate) base_warmth: f32,
    pub(crate) max_temperature: f32,
    pub(crate) burn_rate: f32,
}

impl FireInstance {
    /// Create an unlit, empty fire
    pub fn new(
        id: FireId,
        fire_type: FireType,
        properties: &FireTypeProperties,
        position: Vec3,
        rotation: Rotation,
        is_player_made: bool,
        ambient_temperature: f32,
    ) -> Self {
        Self {
            id,
            fire_type,
            state: FireState::Unlit,
            temperature: ambient_temperature.max(0.0),
            fuel_amount: 0.0,
            max_fuel_capacity: properties.max_fuel_capacity.max(0.0),
            burn_time_elapsed: 0.0,
            fuel: FuelStock::new(),
            is_lit: false,
            is_player_made,
            position,
            rotation,
            extinguish_reason: None,
            base_warmth: properties.base_warmth,
            max_temperature: properties.max_temperature,
            burn_rate: properties.burn_rate,
        }
    }

    pub fn id(&self) -> &FireId {
        &self.id
    }

    pub fn fire_type(&self) -> FireType {
        self.fire_type
    }

    pub fn state(&self) -> FireState {
        self.state
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Temperature food on this fire is exposed to
    pub fn cooking_temperature(&self) -> f32 {
        self.temperature
    }

    pub fn fuel_amount(&self) -> f32 {
        self.fuel_amount
    }

    pub fn max_fuel_capacity(&self) -> f32 {
        self.max_fuel_capacity
    }

    /// Fuel as a percentage (0-100) of capacity
    pub fn fuel_percentage(&self) -> f32 {
        if self.max_fuel_capacity <= 0.0 {
            return 0.0;
        }
        self.fuel_amount / self.max_fuel_capacity * 100.0
    }

    /// Whether a "needs fuel" indicator should show
    pub fn needs_fuel(&self, thresholds: &FireThresholds) -> bool {
        self.fuel_percentage() < thresholds.needs_fuel_percentage
    }

    pub fn burn_time_elapsed(&self) -> f32 {
        self.burn_time_elapsed
    }

    pub fn fuel(&self) -> &FuelStock {
        &self.fuel
    }

    pub fn is_lit(&self) -> bool {
        self.is_lit
    }

    pub fn is_player_made(&self) -> bool {
        self.is_player_made
    }

    pub fn is_extinguished(&self) -> bool {
        self.state == FireState::Extinguished
    }

    pub fn position(&self) -> &Vec3 {
        &self.position
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    pub fn extinguish_reason(&self) -> Option<ExtinguishReason> {
        self.extinguish_reason
    }

    pub fn base_warmth(&self) -> f32 {
        self.base_warmth
    }

    /// Warmth an actor feels `distance` units from the fire
    pub fn warmth_at_distance(&self, distance: f32, thermal: &ThermalConfig) -> f32 {
        thermal.warmth_at_distance(self.state, self.base_warmth, distance)
    }

    /// Warmth at a world position
    pub fn warmth_at(&self, point: &Vec3, thermal: &ThermalConfig) -> f32 {
        self.warmth_at_distance((point - self.position).magnitude(), thermal)
    }

    /// Light the fire.
    ///
    /// # Errors
    /// `AlreadyExtinguished`, `AlreadyLit`, or `InsufficientFuel`; the fire is
    /// not modified on error.
    pub fn ignite(&mut self, thresholds: &FireThresholds) -> Result<(), FireError> {
        if self.state == FireState::Extinguished {
            return Err(InvalidOperation::AlreadyExtinguished.into());
        }
        if self.is_lit {
            return Err(InvalidOperation::AlreadyLit.into());
        }
        if self.fuel_amount < thresholds.min_ignition_fuel {
            return Err(InvalidOperation::InsufficientFuel {
                available: self.fuel_amount,
                required: thresholds.min_ignition_fuel,
            }
            .into());
        }

        self.state = FireState::Igniting;
        self.is_lit = true;
        self.temperature = self.temperature.max(thresholds.ignition_temperature);
        self.extinguish_reason = None;
        tracing::info!("Fire {} ignited ({:.1} fuel)", self.id, self.fuel_amount);
        Ok(())
    }

    /// Put `quantity` units of an inventory item on the fire.
    ///
    /// Fuel beyond capacity is lost: the fuel amount becomes
    /// `min(capacity, before + added)` and the whole quantity is consumed.
    ///
    /// # Errors
    /// `AlreadyExtinguished`, `FireFull`, `MissingItem` for a zero quantity, or
    /// `MissingConfiguration` when the fuel type has no table entry. The fire
    /// is not modified on error.
    pub fn add_fuel(
        &mut self,
        item_id: &str,
        fuel_type: FuelType,
        quantity: u32,
        table: &FuelTable,
    ) -> Result<FuelAdded, FireError> {
        if self.state == FireState::Extinguished {
            return Err(InvalidOperation::AlreadyExtinguished.into());
        }
        if quantity == 0 {
            return Err(InvalidOperation::MissingItem {
                item_id: item_id.to_string(),
                quantity,
            }
            .into());
        }
        let properties = table.get(fuel_type)?;
        if self.fuel_amount >= self.max_fuel_capacity {
            return Err(InvalidOperation::FireFull {
                capacity: self.max_fuel_capacity,
            }
            .into());
        }

        let mut item = FuelItem::new(item_id, fuel_type, quantity, properties);
        let room = self.max_fuel_capacity - self.fuel_amount;
        let accepted = item.burn_time.min(room);
        item.truncate(accepted);
        if accepted > 0.0 {
            self.fuel.push(item);
        }
        self.fuel_amount = (self.fuel_amount + accepted).min(self.max_fuel_capacity);

        tracing::debug!(
            "Fire {}: added {} x {} ({:.1} burn-seconds, now {:.1}/{:.1})",
            self.id,
            quantity,
            item_id,
            accepted,
            self.fuel_amount,
            self.max_fuel_capacity
        );

        Ok(FuelAdded {
            accepted,
            consumed_quantity: quantity,
            fuel_amount: self.fuel_amount,
        })
    }

    /// Put the fire out.
    ///
    /// Returns `false` without changing anything if the fire is not lit, so
    /// repeated calls produce a single transition.
    pub fn extinguish(&mut self, reason: ExtinguishReason) -> bool {
        if self.state == FireState::Extinguished || !self.is_lit {
            return false;
        }
        self.state = FireState::Extinguished;
        self.is_lit = false;
        self.extinguish_reason = Some(reason);
        tracing::info!("Fire {} {reason}", self.id);
        true
    }

    /// Apply an external temperature change, keeping temperature non-negative
    pub fn adjust_temperature(&mut self, delta: f32) {
        self.temperature = (self.temperature + delta).max(0.0);
    }

    /// Advance fuel, temperature and state by `dt` seconds, in that order.
    pub fn advance(&mut self, dt: f32, ctx: &TickContext<'_>) -> FireUpdate {
        let previous_state = self.state;
        if dt <= 0.0 {
            return FireUpdate {
                previous_state,
                state: previous_state,
                fuel_consumed: 0.0,
                started_needing_fuel: false,
            };
        }

        let needed_fuel_before = self.needs_fuel(ctx.thresholds);

        let mut fuel_consumed = 0.0;
        if self.is_lit {
            fuel_consumed = self.fuel.burn(dt * self.burn_rate);
            self.fuel_amount = self.fuel.total_burn_time().min(self.max_fuel_capacity);
            self.burn_time_elapsed += dt;
        }

        let target = target_temperature(
            self.is_lit,
            &self.fuel,
            ctx.fuel_table,
            ctx.ambient_temperature,
            self.max_temperature,
        );
        self.temperature =
            smooth_toward(self.temperature, target, ctx.thermal.smoothing_rate, dt);

        let next = next_state(
            self.state,
            self.temperature,
            self.fuel_amount,
            self.fuel_percentage(),
            ctx.thresholds,
        );
        if next == FireState::Extinguished {
            self.extinguish(ExtinguishReason::FuelExhausted);
        } else {
            if next != self.state {
                tracing::debug!("Fire {}: {} -> {}", self.id, self.state, next);
            }
            self.state = next;
        }

        FireUpdate {
            previous_state,
            state: self.state,
            fuel_consumed,
            started_needing_fuel: self.is_lit
                && !needed_fuel_before
                && self.needs_fuel(ctx.thresholds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuel::FuelTypeProperties;
    use approx::assert_relative_eq;

    fn campfire() -> FireInstance {
        let props = FireTypeProperties::new("Campfire", 100.0, 10.0, 900.0, 1.0);
        FireInstance::new(
            FireId::new("fire-0001"),
            FireType::Campfire,
            &props,
            Vec3::zeros(),
            Rotation::identity(),
            true,
            20.0,
        )
    }

    fn table() -> FuelTable {
        let mut table = FuelTable::empty();
        table.insert(
            FuelType::Logs,
            FuelTypeProperties::new("Logs", 20.0, 600.0, 1.0),
        );
        table
    }

    #[test]
    fn test_new_fire_is_unlit() {
        let fire = campfire();
        assert_eq!(fire.state(), FireState::Unlit);
        assert!(!fire.is_lit());
        assert_eq!(fire.fuel_amount(), 0.0);
        assert_eq!(fire.temperature(), 20.0);
    }

    #[test]
    fn test_ignite_requires_fuel() {
        let mut fire = campfire();
        let err = fire.ignite(&FireThresholds::default()).unwrap_err();
        assert!(matches!(
            err,
            FireError::InvalidOperation(InvalidOperation::InsufficientFuel { .. })
        ));
        assert_eq!(fire.state(), FireState::Unlit);
    }

    #[test]
    fn test_ignite_twice_fails() {
        let mut fire = campfire();
        fire.add_fuel("wood_log", FuelType::Logs, 1, &table()).unwrap();
        fire.ignite(&FireThresholds::default()).unwrap();
        assert_eq!(fire.state(), FireState::Igniting);
        assert_eq!(fire.temperature(), 150.0);

        let err = fire.ignite(&FireThresholds::default()).unwrap_err();
        assert_eq!(err, FireError::InvalidOperation(InvalidOperation::AlreadyLit));
    }

    #[test]
    fn test_add_fuel_clamps_to_capacity() {
        let mut fire = campfire();
        let table = table();
        for _ in 0..4 {
            fire.add_fuel("wood_log", FuelType::Logs, 1, &table).unwrap();
        }
        assert_relative_eq!(fire.fuel_amount(), 80.0);

        let added = fire.add_fuel("wood_log", FuelType::Logs, 2, &table).unwrap();
        assert_relative_eq!(added.accepted, 20.0);
        assert_eq!(added.consumed_quantity, 2);
        assert_relative_eq!(fire.fuel_amount(), 100.0);
        assert_relative_eq!(fire.fuel().total_burn_time(), 100.0);
    }

    #[test]
    fn test_add_fuel_to_full_fire_fails_without_mutation() {
        let mut fire = campfire();
        let table = table();
        fire.add_fuel("wood_log", FuelType::Logs, 5, &table).unwrap();
        let items_before = fire.fuel().items().len();

        let err = fire.add_fuel("wood_log", FuelType::Logs, 1, &table).unwrap_err();
        assert_eq!(
            err,
            FireError::InvalidOperation(InvalidOperation::FireFull { capacity: 100.0 })
        );
        assert_eq!(fire.fuel().items().len(), items_before);
        assert_relative_eq!(fire.fuel_amount(), 100.0);
    }

    #[test]
    fn test_add_unconfigured_fuel_is_refused() {
        let mut fire = campfire();
        let err = fire.add_fuel("charcoal", FuelType::Coal, 1, &table()).unwrap_err();
        assert!(matches!(err, FireError::MissingConfiguration(_)));
        assert_eq!(fire.fuel_amount(), 0.0);
    }

    #[test]
    fn test_extinguish_is_idempotent() {
        let mut fire = campfire();
        fire.add_fuel("wood_log", FuelType::Logs, 1, &table()).unwrap();
        fire.ignite(&FireThresholds::default()).unwrap();

        assert!(fire.extinguish(ExtinguishReason::PutOut));
        assert!(!fire.extinguish(ExtinguishReason::Rain));
        assert_eq!(fire.state(), FireState::Extinguished);
        assert!(!fire.is_lit());
        assert_eq!(fire.extinguish_reason(), Some(ExtinguishReason::PutOut));
    }

    #[test]
    fn test_extinguished_fire_cannot_be_relit() {
        let mut fire = campfire();
        let table = table();
        fire.add_fuel("wood_log", FuelType::Logs, 1, &table).unwrap();
        fire.ignite(&FireThresholds::default()).unwrap();
        fire.extinguish(ExtinguishReason::PutOut);

        assert_eq!(
            fire.ignite(&FireThresholds::default()).unwrap_err(),
            FireError::InvalidOperation(InvalidOperation::AlreadyExtinguished)
        );
        assert!(fire.add_fuel("wood_log", FuelType::Logs, 1, &table).is_err());
    }

    #[test]
    fn test_unlit_fire_does_not_burn_fuel() {
        let mut fire = campfire();
        let table = table();
        fire.add_fuel("wood_log", FuelType::Logs, 1, &table).unwrap();
        let thresholds = FireThresholds::default();
        let thermal = ThermalConfig::default();
        let ctx = TickContext {
            fuel_table: &table,
            thresholds: &thresholds,
            thermal: &thermal,
            ambient_temperature: 20.0,
        };
        let update = fire.advance(1.0, &ctx);
        assert_eq!(update.fuel_consumed, 0.0);
        assert_eq!(fire.state(), FireState::Unlit);
        assert_relative_eq!(fire.fuel_amount(), 20.0);
    }

    #[test]
    fn test_adjust_temperature_never_negative() {
        let mut fire = campfire();
        fire.adjust_temperature(-500.0);
        assert_eq!(fire.temperature(), 0.0);
        fire.adjust_temperature(42.0);
        assert_eq!(fire.temperature(), 42.0);
    }

    #[test]
    fn test_warmth_uses_state_radius() {
        let mut fire = campfire();
        let thermal = ThermalConfig::default();
        assert_eq!(fire.warmth_at_distance(1.0, &thermal), 0.0);

        fire.add_fuel("wood_log", FuelType::Logs, 1, &table()).unwrap();
        fire.ignite(&FireThresholds::default()).unwrap();
        fire.state = FireState::Burning;
        assert_relative_eq!(fire.warmth_at(&Vec3::new(3.0, 4.0, 0.0), &thermal), 0.0);
        assert_relative_eq!(fire.warmth_at(&Vec3::new(0.0, 2.5, 0.0), &thermal), 5.0);
    }
}
