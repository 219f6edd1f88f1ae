//! Weather effects on lit fires.
//!
//! Each effect is a pure function of the fire temperature, the weather signal
//! and the timestep. `apply_environment` applies them in a fixed order (rain,
//! wind, snow) and makes one uniform draw per effect that can extinguish.

use crate::core_types::Vec3;
use crate::fire::{ExtinguishReason, FireInstance};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rain heavier than this can drown a fire
pub const HEAVY_RAIN: f32 = 0.7;
/// Rain only drowns fires cooler than this (°C)
pub const RAIN_EXTINGUISH_MAX_TEMPERATURE: f32 = 300.0;
/// Wind below this strength fans the flames
pub const FANNING_WIND: f32 = 10.0;
/// Wind above this strength can blow a fire out
pub const GALE_WIND: f32 = 20.0;

/// Current weather as seen by the fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weather {
    /// 0-1
    pub rain_intensity: f32,
    /// Wind velocity; strength is its magnitude
    pub wind: Vec3,
    /// 0-1
    pub snow_intensity: f32,
    /// Air temperature (°C)
    pub ambient_temperature: f32,
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            rain_intensity: 0.0,
            wind: Vec3::zeros(),
            snow_intensity: 0.0,
            ambient_temperature: 20.0,
        }
    }
}

impl Weather {
    pub fn calm(ambient_temperature: f32) -> Self {
        Self {
            ambient_temperature,
            ..Self::default()
        }
    }

    pub fn wind_strength(&self) -> f32 {
        self.wind.magnitude()
    }
}

/// What one weather effect does to a fire over one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectOutcome {
    /// Change in fire temperature (°C)
    pub temperature_delta: f32,
    /// Chance (0-1) the fire goes out this tick
    pub extinguish_probability: f32,
}

/// Rain cools the fire; heavy rain can drown a cool one.
pub fn rain_effect(temperature: f32, rain_intensity: f32, dt: f32) -> EffectOutcome {
    let rain = rain_intensity.max(0.0);
    let extinguish_probability =
        if rain > HEAVY_RAIN && temperature < RAIN_EXTINGUISH_MAX_TEMPERATURE {
            (rain * dt * 0.1).clamp(0.0, 1.0)
        } else {
            0.0
        };
    EffectOutcome {
        temperature_delta: -rain * 100.0 * dt,
        extinguish_probability,
    }
}

/// Light wind feeds the fire, gales can blow it out.
pub fn wind_effect(_temperature: f32, wind_strength: f32, dt: f32) -> EffectOutcome {
    let strength = wind_strength.max(0.0);
    if strength < FANNING_WIND {
        EffectOutcome {
            temperature_delta: strength * 2.0 * dt,
            extinguish_probability: 0.0,
        }
    } else if strength > GALE_WIND {
        EffectOutcome {
            temperature_delta: 0.0,
            extinguish_probability: ((strength - GALE_WIND) * dt * 0.01).clamp(0.0, 1.0),
        }
    } else {
        EffectOutcome::default()
    }
}

/// Snow cools the fire and never puts it out.
pub fn snow_effect(_temperature: f32, snow_intensity: f32, dt: f32) -> EffectOutcome {
    EffectOutcome {
        temperature_delta: -snow_intensity.max(0.0) * 50.0 * dt,
        extinguish_probability: 0.0,
    }
}

/// Apply the weather to one fire for `dt` seconds.
///
/// Unlit fires are untouched. Returns the reason if the fire went out; no
/// further effects are processed after an extinguish.
pub fn apply_environment<R: Rng + ?Sized>(
    fire: &mut FireInstance,
    weather: &Weather,
    dt: f32,
    rng: &mut R,
) -> Option<ExtinguishReason> {
    if !fire.is_lit() || dt <= 0.0 {
        return None;
    }

    let rain = rain_effect(fire.temperature(), weather.rain_intensity, dt);
    if let Some(reason) = apply_outcome(fire, rain, ExtinguishReason::Rain, rng) {
        return Some(reason);
    }

    let wind = wind_effect(fire.temperature(), weather.wind_strength(), dt);
    if let Some(reason) = apply_outcome(fire, wind, ExtinguishReason::Wind, rng) {
        return Some(reason);
    }

    let snow = snow_effect(fire.temperature(), weather.snow_intensity, dt);
    fire.adjust_temperature(snow.temperature_delta);
    None
}

fn apply_outcome<R: Rng + ?Sized>(
    fire: &mut FireInstance,
    outcome: EffectOutcome,
    reason: ExtinguishReason,
    rng: &mut R,
) -> Option<ExtinguishReason> {
    fire.adjust_temperature(outcome.temperature_delta);
    if outcome.extinguish_probability <= 0.0 {
        return None;
    }
    let roll: f32 = rng.random();
    if roll < outcome.extinguish_probability && fire.extinguish(reason) {
        Some(reason)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{FireId, Rotation};
    use crate::fire::{FireState, FireThresholds, FireType, FireTypeProperties};
    use crate::fuel::{FuelTable, FuelType};
    use approx::assert_relative_eq;
    use rand::RngCore;

    /// Rng that always yields the same word
    struct ConstantRng(u32);

    impl RngCore for ConstantRng {
        fn next_u32(&mut self) -> u32 {
            self.0
        }

        fn next_u64(&mut self) -> u64 {
            (u64::from(self.0) << 32) | u64::from(self.0)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for byte in dest {
                *byte = self.0 as u8;
            }
        }
    }

    fn lit_fire(temperature: f32) -> FireInstance {
        let props = FireTypeProperties::new("Campfire", 100.0, 10.0, 900.0, 1.0);
        let mut fire = FireInstance::new(
            FireId::new("fire-0001"),
            FireType::Campfire,
            &props,
            Vec3::zeros(),
            Rotation::identity(),
            true,
            20.0,
        );
        fire.add_fuel("wood_log", FuelType::Logs, 1, &FuelTable::default())
            .unwrap();
        fire.ignite(&FireThresholds::default()).unwrap();
        fire.temperature = temperature;
        fire
    }

    #[test]
    fn test_rain_only_drowns_cool_fires_in_heavy_rain() {
        let outcome = rain_effect(250.0, 0.9, 0.1);
        assert_relative_eq!(outcome.temperature_delta, -9.0);
        assert_relative_eq!(outcome.extinguish_probability, 0.009);

        assert_eq!(rain_effect(350.0, 0.9, 0.1).extinguish_probability, 0.0);
        assert_eq!(rain_effect(250.0, 0.7, 0.1).extinguish_probability, 0.0);
    }

    #[test]
    fn test_wind_bands() {
        let light = wind_effect(400.0, 5.0, 0.5);
        assert_relative_eq!(light.temperature_delta, 5.0);
        assert_eq!(light.extinguish_probability, 0.0);

        assert_eq!(wind_effect(400.0, 15.0, 0.5), EffectOutcome::default());

        let gale = wind_effect(400.0, 30.0, 1.0);
        assert_eq!(gale.temperature_delta, 0.0);
        assert_relative_eq!(gale.extinguish_probability, 0.1);
    }

    #[test]
    fn test_snow_never_extinguishes() {
        let outcome = snow_effect(150.0, 1.0, 2.0);
        assert_relative_eq!(outcome.temperature_delta, -100.0);
        assert_eq!(outcome.extinguish_probability, 0.0);
    }

    #[test]
    fn test_low_roll_extinguishes_in_rain() {
        let mut fire = lit_fire(250.0);
        let weather = Weather {
            rain_intensity: 0.9,
            ..Weather::default()
        };
        let reason = apply_environment(&mut fire, &weather, 0.1, &mut ConstantRng(0));
        assert_eq!(reason, Some(ExtinguishReason::Rain));
        assert_eq!(fire.state(), FireState::Extinguished);
    }

    #[test]
    fn test_high_roll_only_cools() {
        let mut fire = lit_fire(250.0);
        let weather = Weather {
            rain_intensity: 0.9,
            snow_intensity: 0.2,
            ..Weather::default()
        };
        let reason = apply_environment(&mut fire, &weather, 0.1, &mut ConstantRng(u32::MAX));
        assert_eq!(reason, None);
        assert!(fire.is_lit());
        // -9 from rain, -1 from snow
        assert_relative_eq!(fire.temperature(), 240.0, epsilon = 1e-3);
    }

    #[test]
    fn test_gale_blows_fire_out() {
        let mut fire = lit_fire(500.0);
        let weather = Weather {
            wind: Vec3::new(30.0, 0.0, 40.0),
            ..Weather::default()
        };
        assert_relative_eq!(weather.wind_strength(), 50.0);
        let reason = apply_environment(&mut fire, &weather, 1.0, &mut ConstantRng(0));
        assert_eq!(reason, Some(ExtinguishReason::Wind));
    }

    #[test]
    fn test_unlit_fire_ignores_weather() {
        let props = FireTypeProperties::new("Campfire", 100.0, 10.0, 900.0, 1.0);
        let mut fire = FireInstance::new(
            FireId::new("fire-0002"),
            FireType::Campfire,
            &props,
            Vec3::zeros(),
            Rotation::identity(),
            false,
            20.0,
        );
        let weather = Weather {
            rain_intensity: 1.0,
            snow_intensity: 1.0,
            ..Weather::default()
        };
        assert_eq!(apply_environment(&mut fire, &weather, 1.0, &mut ConstantRng(0)), None);
        assert_eq!(fire.temperature(), 20.0);
    }
}
