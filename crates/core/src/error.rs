//! Error taxonomy for fire and cooking operations.
//!
//! Nothing here is fatal: every failure is reported to the caller as an
//! `Err` and the fire or cooking state is left exactly as it was.

use crate::core_types::FireId;
use crate::fire::{FireState, FireType};
use crate::fuel::FuelType;
use std::fmt;

/// An operation that is not valid for the current state of a fire or inventory.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidOperation {
    /// Ignite called on a fire that is already burning
    AlreadyLit,
    /// Ignite or add fuel called on a fire that has gone out for good
    AlreadyExtinguished,
    /// Not enough fuel to light the fire
    InsufficientFuel { available: f32, required: f32 },
    /// Fuel added to a fire already at capacity
    FireFull { capacity: f32 },
    /// The actor carries none of the configured ignition sources
    NoIgnitionSource,
    /// The actor does not hold the item the command refers to
    MissingItem { item_id: String, quantity: u32 },
    /// Cooking was requested without a fire
    NoFire,
    /// The fire is not in a state that allows cooking
    CannotCook { state: FireState, temperature: f32 },
    /// Command issued for an actor with no registered inventory
    NoInventory,
}

impl fmt::Display for InvalidOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidOperation::AlreadyLit => write!(f, "fire is already lit"),
            InvalidOperation::AlreadyExtinguished => write!(f, "fire has been extinguished"),
            InvalidOperation::InsufficientFuel {
                available,
                required,
            } => write!(
                f,
                "not enough fuel to ignite ({available:.1} of {required:.1} required)"
            ),
            InvalidOperation::FireFull { capacity } => {
                write!(f, "fire is already at its fuel capacity of {capacity:.0}")
            }
            InvalidOperation::NoIgnitionSource => write!(f, "no ignition source available"),
            InvalidOperation::MissingItem { item_id, quantity } => {
                write!(f, "inventory does not hold {quantity} x {item_id}")
            }
            InvalidOperation::NoFire => write!(f, "there is no fire to cook on"),
            InvalidOperation::CannotCook { state, temperature } => write!(
                f,
                "fire is not ready for cooking ({state}, {temperature:.0}°C)"
            ),
            InvalidOperation::NoInventory => write!(f, "actor has no inventory"),
        }
    }
}

/// A lookup into one of the externally supplied tables found nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum MissingConfiguration {
    FuelType(FuelType),
    FireType(FireType),
    Recipe(String),
    FuelItem(String),
}

impl fmt::Display for MissingConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingConfiguration::FuelType(fuel_type) => {
                write!(f, "no properties configured for fuel type {fuel_type:?}")
            }
            MissingConfiguration::FireType(fire_type) => {
                write!(f, "no properties configured for fire type {fire_type:?}")
            }
            MissingConfiguration::Recipe(item_id) => {
                write!(f, "no cooked item mapping for '{item_id}'")
            }
            MissingConfiguration::FuelItem(item_id) => {
                write!(f, "item '{item_id}' is not configured as fuel")
            }
        }
    }
}

/// Errors returned by fire, cooking and simulation operations
#[derive(Debug, Clone, PartialEq)]
pub enum FireError {
    /// The request is not valid right now; state is unchanged
    InvalidOperation(InvalidOperation),
    /// A configuration table has no entry for the request; state is unchanged
    MissingConfiguration(MissingConfiguration),
    /// No fire with this id exists (never spawned or already removed)
    UnknownFire(FireId),
}

impl FireError {
    /// Whether this failure should be surfaced to the player.
    ///
    /// Missing configuration is a content bug and only gets logged.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, FireError::InvalidOperation(_))
    }
}

impl fmt::Display for FireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FireError::InvalidOperation(op) => write!(f, "Invalid operation: {op}"),
            FireError::MissingConfiguration(missing) => {
                write!(f, "Missing configuration: {missing}")
            }
            FireError::UnknownFire(id) => write!(f, "Unknown fire: {id}"),
        }
    }
}

impl std::error::Error for FireError {}

impl From<InvalidOperation> for FireError {
    fn from(op: InvalidOperation) -> Self {
        FireError::InvalidOperation(op)
    }
}

impl From<MissingConfiguration> for FireError {
    fn from(missing: MissingConfiguration) -> Self {
        FireError::MissingConfiguration(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_classification() {
        assert!(FireError::from(InvalidOperation::AlreadyLit).is_user_facing());
        assert!(
            !FireError::from(MissingConfiguration::Recipe("raw_fish".into())).is_user_facing()
        );
        assert!(!FireError::UnknownFire(FireId::new("fire-0001")).is_user_facing());
    }

    #[test]
    fn test_display_messages() {
        let err = FireError::from(InvalidOperation::FireFull { capacity: 100.0 });
        assert_eq!(
            err.to_string(),
            "Invalid operation: fire is already at its fuel capacity of 100"
        );

        let err = FireError::from(MissingConfiguration::Recipe("raw_fish".into()));
        assert_eq!(
            err.to_string(),
            "Missing configuration: no cooked item mapping for 'raw_fish'"
        );
    }
}
