//! Statistical checks of weather extinguish rates

mod common;

use rand::rngs::StdRng;
use rand::SeedableRng;
use survival_fire_core::{
    apply_environment, ExtinguishReason, FireId, FireInstance, FireThresholds, FireTypeTable, FireType,
    FuelTable, FuelType, Rotation, Vec3, Weather,
};

/// A lit campfire at 250 °C
fn warm_fire() -> FireInstance {
    let types = FireTypeTable::default();
    let mut fire = FireInstance::new(
        FireId::new("fire-0001"),
        FireType::Campfire,
        types.get(FireType::Campfire).unwrap(),
        Vec3::zeros(),
        Rotation::identity(),
        false,
        20.0,
    );
    fire.add_fuel("wood_log", FuelType::Logs, 1, &FuelTable::default())
        .unwrap();
    fire.ignite(&FireThresholds::default()).unwrap();
    fire.adjust_temperature(250.0 - fire.temperature());
    fire
}

fn count_rain_extinguishes(trials: usize, seed: u64) -> usize {
    let weather = Weather {
        rain_intensity: 0.9,
        ..Weather::default()
    };
    let mut rng = StdRng::seed_from_u64(seed);
    (0..trials)
        .filter(|_| {
            let mut fire = warm_fire();
            apply_environment(&mut fire, &weather, 0.1, &mut rng) == Some(ExtinguishReason::Rain)
        })
        .count()
}

#[test]
fn test_heavy_rain_extinguish_rate_over_thousand_trials() {
    // p = 0.9 × 0.1 × 0.1 = 0.009, so about 9 of 1000
    let count = count_rain_extinguishes(1000, 2024);
    assert!((1..=25).contains(&count), "{count} extinguishes");
}

#[test]
fn test_heavy_rain_extinguish_rate_converges() {
    let trials = 100_000;
    let count = count_rain_extinguishes(trials, 99);
    let rate = count as f64 / trials as f64;
    assert!((0.0078..=0.0102).contains(&rate), "rate {rate}");
}

#[test]
fn test_hot_fire_survives_heavy_rain() {
    let weather = Weather {
        rain_intensity: 1.0,
        ..Weather::default()
    };
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..1000 {
        let mut fire = warm_fire();
        fire.adjust_temperature(200.0);
        assert_eq!(apply_environment(&mut fire, &weather, 0.1, &mut rng), None);
        assert!(fire.is_lit());
    }
}

#[test]
fn test_gale_extinguish_rate() {
    // Strength 40: p = 20 × 1.0 × 0.01 = 0.2
    let weather = Weather {
        wind: Vec3::new(0.0, 40.0, 0.0),
        ..Weather::default()
    };
    let mut rng = StdRng::seed_from_u64(11);
    let trials = 10_000;
    let count = (0..trials)
        .filter(|_| {
            let mut fire = warm_fire();
            apply_environment(&mut fire, &weather, 1.0, &mut rng) == Some(ExtinguishReason::Wind)
        })
        .count();
    let rate = count as f64 / trials as f64;
    assert!((0.17..=0.23).contains(&rate), "rate {rate}");
}
