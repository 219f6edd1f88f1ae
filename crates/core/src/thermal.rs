//! Thermal model: fire temperature and the warmth it gives off.
//!
//! Temperature never jumps between states. Each tick it relaxes toward a
//! target set by the burning fuel:
//!
//! ```text
//! target = ambient + Σ burn_temperature × heat_output × remaining_fraction
//! T     += (target − T) × (1 − e^(−rate·dt))
//! ```
//!
//! Environmental effects perturb `T` directly; the smoothing term pulls it
//! back toward the fuel-driven target on later ticks.

use crate::fire::FireState;
use crate::fuel::{FuelStock, FuelTable};
use serde::{Deserialize, Serialize};

/// Shape of warmth falloff over normalized distance (0 = centre, 1 = edge)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "keys")]
pub enum FalloffCurve {
    /// `1 − x`
    #[default]
    Linear,
    /// `(1 − x)²` - warmth concentrated near the fire
    Quadratic,
    /// Hermite smoothstep from 1 at the centre to 0 at the edge
    SmoothStep,
    /// Piecewise-linear keyframes, sorted by `time`
    Keyed(Vec<Keyframe>),
}

/// One point of a keyed falloff curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl FalloffCurve {
    /// Evaluate at normalized distance `x`, clamped to 0..=1
    pub fn evaluate(&self, x: f32) -> f32 {
        let x = x.clamp(0.0, 1.0);
        match self {
            FalloffCurve::Linear => 1.0 - x,
            FalloffCurve::Quadratic => (1.0 - x) * (1.0 - x),
            FalloffCurve::SmoothStep => {
                let s = x * x * (3.0 - 2.0 * x);
                1.0 - s
            }
            FalloffCurve::Keyed(keys) => evaluate_keys(keys, x),
        }
    }
}

fn evaluate_keys(keys: &[Keyframe], x: f32) -> f32 {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return 1.0 - x;
    };
    if x <= first.time {
        return first.value;
    }
    if x >= last.time {
        return last.value;
    }

    for pair in keys.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if x <= b.time {
            let span = b.time - a.time;
            if span <= f32::EPSILON {
                return b.value;
            }
            let t = (x - a.time) / span;
            return a.value + (b.value - a.value) * t;
        }
    }
    last.value
}

/// Thermal tuning shared by all fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalConfig {
    /// Relaxation rate toward the target temperature (1/s)
    pub smoothing_rate: f32,
    /// Warmth radius while smoldering, igniting or dying
    pub smoldering_radius: f32,
    pub burning_radius: f32,
    pub blazing_radius: f32,
    pub falloff: FalloffCurve,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            smoothing_rate: 1.0,
            smoldering_radius: 2.0,
            burning_radius: 5.0,
            blazing_radius: 8.0,
            falloff: FalloffCurve::Linear,
        }
    }
}

impl ThermalConfig {
    /// Distance within which a fire in `state` gives off warmth
    pub fn effective_radius(&self, state: FireState) -> f32 {
        match state {
            FireState::Unlit | FireState::Extinguished => 0.0,
            FireState::Igniting | FireState::Smoldering | FireState::Dying => {
                self.smoldering_radius
            }
            FireState::Burning => self.burning_radius,
            FireState::Blazing => self.blazing_radius,
        }
    }

    /// Warmth felt at `distance` from a fire in `state`
    pub fn warmth_at_distance(&self, state: FireState, base_warmth: f32, distance: f32) -> f32 {
        let radius = self.effective_radius(state);
        let distance = distance.max(0.0);
        if radius <= 0.0 || distance > radius {
            return 0.0;
        }
        base_warmth * self.falloff.evaluate(distance / radius)
    }
}

/// Temperature the fire is heading toward this tick
pub fn target_temperature(
    lit: bool,
    stock: &FuelStock,
    table: &FuelTable,
    ambient: f32,
    max_temperature: f32,
) -> f32 {
    let ambient = ambient.max(0.0);
    if !lit {
        return ambient;
    }
    (ambient + stock.weighted_temperature(table)).min(max_temperature.max(ambient))
}

/// Relax `current` toward `target` over `dt` seconds
pub fn smooth_toward(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    if dt <= 0.0 || rate <= 0.0 {
        return current.max(0.0);
    }
    let blend = 1.0 - (-rate * dt).exp();
    (current + (target - current) * blend).max(0.0)
}
