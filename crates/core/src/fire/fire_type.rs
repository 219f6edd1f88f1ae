use crate::error::MissingConfiguration;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of fire an actor or the world can place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FireType {
    Campfire,
    Torch,
    Forge,
    SignalFire,
    CookingFire,
}

impl FireType {
    pub const ALL: [FireType; 5] = [
        FireType::Campfire,
        FireType::Torch,
        FireType::Forge,
        FireType::SignalFire,
        FireType::CookingFire,
    ];

    /// Convert from u8 for FFI compatibility
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(FireType::Campfire),
            1 => Some(FireType::Torch),
            2 => Some(FireType::Forge),
            3 => Some(FireType::SignalFire),
            4 => Some(FireType::CookingFire),
            _ => None,
        }
    }

    /// Convert to u8 for FFI compatibility
    pub fn as_u8(self) -> u8 {
        match self {
            FireType::Campfire => 0,
            FireType::Torch => 1,
            FireType::Forge => 2,
            FireType::SignalFire => 3,
            FireType::CookingFire => 4,
        }
    }
}

impl fmt::Display for FireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FireType::Campfire => "campfire",
            FireType::Torch => "torch",
            FireType::Forge => "forge",
            FireType::SignalFire => "signal fire",
            FireType::CookingFire => "cooking fire",
        };
        f.write_str(name)
    }
}

/// Per-type tuning of a fire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireTypeProperties {
    pub display_name: String,
    /// Burn-seconds of fuel the fire can hold
    pub max_fuel_capacity: f32,
    /// Warmth delivered at the centre of the warmth radius
    pub base_warmth: f32,
    /// Hard cap on fire temperature (°C)
    pub max_temperature: f32,
    /// Multiplier on fuel consumption (forges draw harder than torches)
    pub burn_rate: f32,
}

impl FireTypeProperties {
    pub fn new(
        display_name: impl Into<String>,
        max_fuel_capacity: f32,
        base_warmth: f32,
        max_temperature: f32,
        burn_rate: f32,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            max_fuel_capacity,
            base_warmth,
            max_temperature,
            burn_rate,
        }
    }
}

/// Read-only mapping from fire type to its tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FireTypeTable {
    entries: FxHashMap<FireType, FireTypeProperties>,
}

impl Default for FireTypeTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert(
            FireType::Campfire,
            FireTypeProperties::new("Campfire", 360.0, 10.0, 900.0, 1.0),
        );
        table.insert(
            FireType::Torch,
            FireTypeProperties::new("Torch", 30.0, 3.0, 700.0, 0.5),
        );
        table.insert(
            FireType::Forge,
            FireTypeProperties::new("Forge", 400.0, 20.0, 1400.0, 1.5),
        );
        table.insert(
            FireType::SignalFire,
            FireTypeProperties::new("Signal Fire", 600.0, 15.0, 1000.0, 2.0),
        );
        table.insert(
            FireType::CookingFire,
            FireTypeProperties::new("Cooking Fire", 150.0, 8.0, 800.0, 0.8),
        );
        table
    }
}

impl FireTypeTable {
    pub fn empty() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, fire_type: FireType, properties: FireTypeProperties) {
        self.entries.insert(fire_type, properties);
    }

    pub fn get(&self, fire_type: FireType) -> Result<&FireTypeProperties, MissingConfiguration> {
        self.entries
            .get(&fire_type)
            .ok_or(MissingConfiguration::FireType(fire_type))
    }
}
