//! Fire lifecycle states and the per-tick transition rule.
//!
//! Smoldering, Burning and Blazing are temperature bands rather than
//! independent states: once a fire has left `Igniting` its label is derived
//! from the current temperature on every evaluation. `Dying` overrides the band
//! while fuel is low, and `Extinguished` is terminal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireState {
    /// Built but never lit
    Unlit,
    /// Lit, still warming up to the smolder threshold
    Igniting,
    /// Below the burning band
    Smoldering,
    /// Burning band - the only state that allows cooking
    Burning,
    /// Above the burning band
    Blazing,
    /// Running out of fuel
    Dying,
    /// Gone out for good
    Extinguished,
}

impl FireState {
    /// Whether the fire is alight in this state
    pub fn is_lit(self) -> bool {
        !matches!(self, FireState::Unlit | FireState::Extinguished)
    }

    /// Convert to u8 for FFI compatibility
    pub fn as_u8(self) -> u8 {
        match self {
            FireState::Unlit => 0,
            FireState::Igniting => 1,
            FireState::Smoldering => 2,
            FireState::Burning => 3,
            FireState::Blazing => 4,
            FireState::Dying => 5,
            FireState::Extinguished => 6,
        }
    }

    /// Temperature band label for a fire that has finished igniting
    pub fn from_temperature(temperature: f32, thresholds: &FireThresholds) -> Self {
        if temperature > thresholds.blazing {
            FireState::Blazing
        } else if temperature >= thresholds.burning {
            FireState::Burning
        } else {
            FireState::Smoldering
        }
    }
}

impl fmt::Display for FireState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FireState::Unlit => "unlit",
            FireState::Igniting => "igniting",
            FireState::Smoldering => "smoldering",
            FireState::Burning => "burning",
            FireState::Blazing => "blazing",
            FireState::Dying => "dying",
            FireState::Extinguished => "extinguished",
        };
        f.write_str(name)
    }
}

/// Temperature and fuel thresholds driving state transitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireThresholds {
    /// °C an igniting fire must reach to start burning on its own
    pub smolder: f32,
    /// °C at which the burning band starts
    pub burning: f32,
    /// °C above which the fire is blazing
    pub blazing: f32,
    /// Fuel percentage below which a lit fire is dying
    pub dying_fuel_percentage: f32,
    /// Fuel percentage below which the fire asks for more fuel
    pub needs_fuel_percentage: f32,
    /// °C a fire jumps to when lit
    pub ignition_temperature: f32,
    /// Burn-seconds required before a fire can be lit
    pub min_ignition_fuel: f32,
}

impl Default for FireThresholds {
    fn default() -> Self {
        Self {
            smolder: 200.0,
            burning: 400.0,
            blazing: 600.0,
            dying_fuel_percentage: 10.0,
            needs_fuel_percentage: 30.0,
            ignition_temperature: 150.0,
            min_ignition_fuel: 1.0,
        }
    }
}

/// Decide the state for this tick.
///
/// Must run after fuel consumption and the temperature update so the decision
/// sees this tick's values.
pub fn next_state(
    current: FireState,
    temperature: f32,
    fuel_amount: f32,
    fuel_percentage: f32,
    thresholds: &FireThresholds,
) -> FireState {
    match current {
        FireState::Unlit | FireState::Extinguished => current,
        _ if fuel_amount <= 0.0 => FireState::Extinguished,
        _ if fuel_percentage < thresholds.dying_fuel_percentage => FireState::Dying,
        FireState::Igniting if temperature < thresholds.smolder => FireState::Igniting,
        _ => FireState::from_temperature(temperature, thresholds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> FireThresholds {
        FireThresholds::default()
    }

    #[test]
    fn test_bands() {
        let t = thresholds();
        assert_eq!(FireState::from_temperature(250.0, &t), FireState::Smoldering);
        assert_eq!(FireState::from_temperature(400.0, &t), FireState::Burning);
        assert_eq!(FireState::from_temperature(600.0, &t), FireState::Burning);
        assert_eq!(FireState::from_temperature(601.0, &t), FireState::Blazing);
    }

    #[test]
    fn test_unlit_and_extinguished_are_sticky() {
        let t = thresholds();
        assert_eq!(
            next_state(FireState::Unlit, 900.0, 50.0, 50.0, &t),
            FireState::Unlit
        );
        assert_eq!(
            next_state(FireState::Extinguished, 900.0, 50.0, 50.0, &t),
            FireState::Extinguished
        );
    }

    #[test]
    fn test_igniting_waits_for_smolder_threshold() {
        let t = thresholds();
        assert_eq!(
            next_state(FireState::Igniting, 150.0, 50.0, 50.0, &t),
            FireState::Igniting
        );
        assert_eq!(
            next_state(FireState::Igniting, 210.0, 50.0, 50.0, &t),
            FireState::Smoldering
        );
        // A fast ignition lands straight in its band
        assert_eq!(
            next_state(FireState::Igniting, 450.0, 50.0, 50.0, &t),
            FireState::Burning
        );
    }

    #[test]
    fn test_bands_recomputed_every_evaluation() {
        let t = thresholds();
        assert_eq!(
            next_state(FireState::Blazing, 300.0, 50.0, 50.0, &t),
            FireState::Smoldering
        );
        assert_eq!(
            next_state(FireState::Smoldering, 700.0, 50.0, 50.0, &t),
            FireState::Blazing
        );
    }

    #[test]
    fn test_low_fuel_means_dying() {
        let t = thresholds();
        assert_eq!(
            next_state(FireState::Blazing, 700.0, 5.0, 5.0, &t),
            FireState::Dying
        );
        // Fresh fuel brings a dying fire back to its band
        assert_eq!(
            next_state(FireState::Dying, 450.0, 40.0, 40.0, &t),
            FireState::Burning
        );
    }

    #[test]
    fn test_no_fuel_extinguishes() {
        let t = thresholds();
        assert_eq!(
            next_state(FireState::Dying, 300.0, 0.0, 0.0, &t),
            FireState::Extinguished
        );
    }

    #[test]
    fn test_is_lit() {
        assert!(!FireState::Unlit.is_lit());
        assert!(FireState::Dying.is_lit());
        assert!(!FireState::Extinguished.is_lit());
    }
}
