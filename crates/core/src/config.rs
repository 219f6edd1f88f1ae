//! Simulation tunables and the read-only content tables.
//!
//! Every section is optional in JSON and falls back to its default, so a
//! config file only needs to list what it overrides.

use crate::cooking::{CookingConfig, RecipeBook};
use crate::error::MissingConfiguration;
use crate::fire::{FireThresholds, FireTypeTable};
use crate::fuel::{FuelTable, FuelType};
use crate::simulation::persistence::PersistenceError;
use crate::thermal::ThermalConfig;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// An item that can light a fire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnitionSource {
    pub item_id: String,
    /// Whether one unit is used up per ignition (matches) or kept (flint)
    #[serde(default)]
    pub consumed: bool,
}

impl IgnitionSource {
    pub fn new(item_id: impl Into<String>, consumed: bool) -> Self {
        Self {
            item_id: item_id.into(),
            consumed,
        }
    }
}

/// All configuration of a fire simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub thresholds: FireThresholds,
    pub thermal: ThermalConfig,
    pub cooking: CookingConfig,
    pub fuel_types: FuelTable,
    pub fire_types: FireTypeTable,
    pub recipes: RecipeBook,
    /// Inventory item id to the fuel type it burns as
    pub fuel_items: FxHashMap<String, FuelType>,
    /// Checked in order; the first one the actor holds is used
    pub ignition_sources: Vec<IgnitionSource>,
    /// Fire count at which per-fire updates run in parallel
    pub parallel_threshold: usize,
    /// Seconds between auto-saves; 0 disables auto-save
    pub autosave_interval: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let fuel_items = [
            ("dry_grass", FuelType::Tinder),
            ("tinder", FuelType::Tinder),
            ("stick", FuelType::Kindling),
            ("kindling", FuelType::Kindling),
            ("wood_log", FuelType::Logs),
            ("charcoal", FuelType::Coal),
        ]
        .into_iter()
        .map(|(id, fuel_type)| (id.to_string(), fuel_type))
        .collect();

        Self {
            thresholds: FireThresholds::default(),
            thermal: ThermalConfig::default(),
            cooking: CookingConfig::default(),
            fuel_types: FuelTable::default(),
            fire_types: FireTypeTable::default(),
            recipes: RecipeBook::default(),
            fuel_items,
            ignition_sources: vec![
                IgnitionSource::new("lighter", false),
                IgnitionSource::new("flint", false),
                IgnitionSource::new("matches", true),
            ],
            parallel_threshold: 64,
            autosave_interval: 300.0,
        }
    }
}

impl SimulationConfig {
    /// Parse a JSON config
    ///
    /// # Errors
    /// Returns `ParseFailed` if the text is not a valid config
    pub fn from_json_str(json: &str) -> Result<Self, PersistenceError> {
        serde_json::from_str(json).map_err(|e| PersistenceError::ParseFailed(e.to_string()))
    }

    /// Load a JSON config file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let contents =
            fs::read_to_string(path).map_err(|e| PersistenceError::LoadFailed(e.to_string()))?;
        Self::from_json_str(&contents)
    }

    /// Fuel type an inventory item burns as
    pub fn fuel_type_of(&self, item_id: &str) -> Result<FuelType, MissingConfiguration> {
        self.fuel_items
            .get(item_id)
            .copied()
            .ok_or_else(|| MissingConfiguration::FuelItem(item_id.to_string()))
    }
}
