//! Fuel types, their configured burn properties, and the fuel held by a fire.
//!
//! Fuel is measured in burn-seconds: an item stack of quantity `q` carries
//! `q × burn_duration` seconds of burning. Items in a fire burn concurrently,
//! so a fire holding three logs is hotter and drains three times as fast as a
//! fire holding one.

use crate::error::MissingConfiguration;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Remaining burn time below which an item counts as spent.
const SPENT_EPSILON: f32 = 1e-4;

/// Category of burnable item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FuelType {
    /// Dry grass, bark shavings - lights easily, burns fast and cool
    Tinder,
    /// Sticks and twigs
    Kindling,
    /// Split wood
    Logs,
    /// Charcoal - long, hot burn
    Coal,
}

impl FuelType {
    pub const ALL: [FuelType; 4] = [
        FuelType::Tinder,
        FuelType::Kindling,
        FuelType::Logs,
        FuelType::Coal,
    ];

    /// Convert from u8 for FFI compatibility
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(FuelType::Tinder),
            1 => Some(FuelType::Kindling),
            2 => Some(FuelType::Logs),
            3 => Some(FuelType::Coal),
            _ => None,
        }
    }
}

/// Configured burn behaviour of one fuel type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelTypeProperties {
    pub display_name: String,
    /// Seconds one unit burns for
    pub burn_duration: f32,
    /// Temperature (°C) a full unit contributes at heat output 1.0
    pub burn_temperature: f32,
    /// Relative heat output multiplier
    pub heat_output: f32,
}

impl FuelTypeProperties {
    pub fn new(
        display_name: impl Into<String>,
        burn_duration: f32,
        burn_temperature: f32,
        heat_output: f32,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            burn_duration,
            burn_temperature,
            heat_output,
        }
    }
}

/// Read-only mapping from fuel type to its burn properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuelTable {
    entries: FxHashMap<FuelType, FuelTypeProperties>,
}

impl Default for FuelTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert(
            FuelType::Tinder,
            FuelTypeProperties::new("Tinder", 10.0, 300.0, 0.5),
        );
        table.insert(
            FuelType::Kindling,
            FuelTypeProperties::new("Kindling", 30.0, 450.0, 0.8),
        );
        table.insert(
            FuelType::Logs,
            FuelTypeProperties::new("Logs", 120.0, 600.0, 1.0),
        );
        table.insert(
            FuelType::Coal,
            FuelTypeProperties::new("Coal", 300.0, 800.0, 1.5),
        );
        table
    }
}

impl FuelTable {
    /// Table with no entries; every lookup fails until entries are inserted.
    pub fn empty() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, fuel_type: FuelType, properties: FuelTypeProperties) {
        self.entries.insert(fuel_type, properties);
    }

    pub fn get(&self, fuel_type: FuelType) -> Result<&FuelTypeProperties, MissingConfiguration> {
        self.entries
            .get(&fuel_type)
            .ok_or(MissingConfiguration::FuelType(fuel_type))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A stack of fuel placed in a fire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelItem {
    /// Inventory item this fuel came from
    pub item_id: String,
    pub quantity: u32,
    /// Remaining burn-seconds for the whole stack
    pub burn_time: f32,
    pub fuel_type: FuelType,
    /// Burn-seconds the stack held when it was added
    #[serde(default)]
    pub initial_burn_time: f32,
}

impl FuelItem {
    /// Create a fresh stack with its full configured burn time.
    pub fn new(
        item_id: impl Into<String>,
        fuel_type: FuelType,
        quantity: u32,
        properties: &FuelTypeProperties,
    ) -> Self {
        let burn_time = quantity as f32 * properties.burn_duration;
        Self {
            item_id: item_id.into(),
            quantity,
            burn_time,
            fuel_type,
            initial_burn_time: burn_time,
        }
    }

    /// Fraction (0-1) of this stack still left to burn
    pub fn remaining_fraction(&self) -> f32 {
        if self.initial_burn_time <= 0.0 {
            // Records written without the initial value count as fresh
            return if self.burn_time > 0.0 { 1.0 } else { 0.0 };
        }
        (self.burn_time / self.initial_burn_time).clamp(0.0, 1.0)
    }

    /// Reduce this stack so it holds at most `burn_time` burn-seconds.
    pub(crate) fn truncate(&mut self, burn_time: f32) {
        if burn_time < self.burn_time {
            self.burn_time = burn_time.max(0.0);
            self.initial_burn_time = self.initial_burn_time.min(self.burn_time.max(SPENT_EPSILON));
        }
    }

    fn is_spent(&self) -> bool {
        self.burn_time <= SPENT_EPSILON
    }
}

/// Ordered fuel contents of a fire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuelStock {
    items: Vec<FuelItem>,
}

impl FuelStock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<FuelItem>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, item: FuelItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[FuelItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of remaining burn-seconds over all stacks
    pub fn total_burn_time(&self) -> f32 {
        self.items.iter().map(|item| item.burn_time).sum()
    }

    /// Trim stacks from the back until at most `max_total` burn-seconds remain.
    pub(crate) fn limit_to(&mut self, max_total: f32) {
        let mut room = max_total.max(0.0);
        for item in &mut self.items {
            item.truncate(room);
            room -= item.burn_time;
        }
        self.items.retain(|item| !item.is_spent());
    }

    /// Burn every stack down by `seconds` and drop the spent ones.
    ///
    /// Returns the burn-seconds actually consumed.
    pub fn burn(&mut self, seconds: f32) -> f32 {
        if seconds <= 0.0 {
            return 0.0;
        }

        let mut consumed = 0.0;
        for item in &mut self.items {
            let burned = item.burn_time.min(seconds);
            item.burn_time -= burned;
            consumed += burned;
        }
        self.items.retain(|item| !item.is_spent());
        consumed
    }

    /// Sum of each stack's heat output weighted by its remaining fraction.
    ///
    /// Stacks whose fuel type has no table entry contribute nothing.
    pub fn heat_output(&self, table: &FuelTable) -> f32 {
        self.items
            .iter()
            .filter_map(|item| {
                let props = table.get(item.fuel_type).ok()?;
                Some(props.heat_output * item.remaining_fraction())
            })
            .sum()
    }

    /// Temperature contribution (°C above ambient) of the burning stacks.
    pub fn weighted_temperature(&self, table: &FuelTable) -> f32 {
        self.items
            .iter()
            .filter_map(|item| match table.get(item.fuel_type) {
                Ok(props) => {
                    Some(props.burn_temperature * props.heat_output * item.remaining_fraction())
                }
                Err(missing) => {
                    tracing::warn!("Fuel stack '{}' ignored: {missing}", item.item_id);
                    None
                }
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn logs() -> FuelTypeProperties {
        FuelTypeProperties::new("Logs", 20.0, 600.0, 1.0)
    }

    #[test]
    fn test_default_table_covers_all_types() {
        let table = FuelTable::default();
        for fuel_type in FuelType::ALL {
            assert!(table.get(fuel_type).is_ok(), "{fuel_type:?} missing");
        }
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_empty_table_reports_missing_entry() {
        let table = FuelTable::empty();
        assert_eq!(
            table.get(FuelType::Coal),
            Err(MissingConfiguration::FuelType(FuelType::Coal))
        );
    }

    #[test]
    fn test_item_burn_time_scales_with_quantity() {
        let item = FuelItem::new("wood_log", FuelType::Logs, 3, &logs());
        assert_relative_eq!(item.burn_time, 60.0);
        assert_relative_eq!(item.remaining_fraction(), 1.0);
    }

    #[test]
    fn test_stacks_burn_concurrently() {
        let mut stock = FuelStock::new();
        stock.push(FuelItem::new("wood_log", FuelType::Logs, 1, &logs()));
        stock.push(FuelItem::new("wood_log", FuelType::Logs, 1, &logs()));

        let consumed = stock.burn(5.0);
        assert_relative_eq!(consumed, 10.0);
        assert_relative_eq!(stock.total_burn_time(), 30.0);
        assert_relative_eq!(stock.items()[0].remaining_fraction(), 0.75);
    }

    #[test]
    fn test_spent_stacks_are_dropped() {
        let mut stock = FuelStock::new();
        stock.push(FuelItem::new(
            "grass",
            FuelType::Tinder,
            1,
            &FuelTypeProperties::new("Tinder", 2.0, 300.0, 0.5),
        ));
        stock.push(FuelItem::new("wood_log", FuelType::Logs, 1, &logs()));

        let consumed = stock.burn(3.0);
        assert_relative_eq!(consumed, 5.0);
        assert_eq!(stock.items().len(), 1);
        assert_eq!(stock.items()[0].fuel_type, FuelType::Logs);
    }

    #[test]
    fn test_limit_trims_later_stacks_first() {
        let mut stock = FuelStock::new();
        stock.push(FuelItem::new("wood_log", FuelType::Logs, 1, &logs()));
        stock.push(FuelItem::new("wood_log", FuelType::Logs, 1, &logs()));
        stock.push(FuelItem::new("wood_log", FuelType::Logs, 1, &logs()));

        stock.limit_to(30.0);
        assert_relative_eq!(stock.total_burn_time(), 30.0);
        assert_eq!(stock.items().len(), 2);
        assert_relative_eq!(stock.items()[0].burn_time, 20.0);
        assert_relative_eq!(stock.items()[1].burn_time, 10.0);
    }

    #[test]
    fn test_heat_weighted_by_remaining_fraction() {
        let mut table = FuelTable::empty();
        table.insert(FuelType::Logs, logs());

        let mut stock = FuelStock::new();
        stock.push(FuelItem::new("wood_log", FuelType::Logs, 1, &logs()));
        assert_relative_eq!(stock.heat_output(&table), 1.0);
        assert_relative_eq!(stock.weighted_temperature(&table), 600.0);

        stock.burn(10.0);
        assert_relative_eq!(stock.heat_output(&table), 0.5);
        assert_relative_eq!(stock.weighted_temperature(&table), 300.0);
    }

    #[test]
    fn test_truncate_keeps_fraction_meaningful() {
        let mut item = FuelItem::new("wood_log", FuelType::Logs, 2, &logs());
        item.truncate(15.0);
        assert_relative_eq!(item.burn_time, 15.0);
        assert_relative_eq!(item.remaining_fraction(), 1.0);
    }
}
