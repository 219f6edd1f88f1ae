use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use survival_fire_core::{
    apply_environment, ActorId, ExtinguishReason, FireId, FireInstance, FireSimulation, FireState,
    FireThresholds, FireType, FireTypeTable, FuelTable, FuelType, Inventories, Inventory,
    NotificationLog, Rotation, SimpleInventory, SimulationConfig, Vec3, Weather,
};
use tracing_subscriber::EnvFilter;

const PLAYER: ActorId = ActorId(1);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FireKind {
    Campfire,
    Torch,
    Forge,
    SignalFire,
    CookingFire,
}

impl From<FireKind> for FireType {
    fn from(kind: FireKind) -> Self {
        match kind {
            FireKind::Campfire => FireType::Campfire,
            FireKind::Torch => FireType::Torch,
            FireKind::Forge => FireType::Forge,
            FireKind::SignalFire => FireType::SignalFire,
            FireKind::CookingFire => FireType::CookingFire,
        }
    }
}

/// Survival fire demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "survival-fire-demo")]
#[command(about = "Build, light and cook on a survival fire", long_about = None)]
struct Args {
    /// Simulation duration in seconds
    #[arg(short, long, default_value_t = 180.0)]
    duration: f32,

    /// Timestep in seconds
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Seed for weather rolls (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Kind of fire to build
    #[arg(short, long, value_enum, default_value_t = FireKind::Campfire)]
    fire: FireKind,

    /// Sticks placed before lighting
    #[arg(long, default_value_t = 2)]
    sticks: u32,

    /// Logs placed before lighting
    #[arg(short, long, default_value_t = 1)]
    logs: u32,

    /// Raw item to cook once the fire burns steadily (e.g. raw_meat)
    #[arg(short, long)]
    cook: Option<String>,

    /// Rain intensity (0-1)
    #[arg(long, default_value_t = 0.0)]
    rain: f32,

    /// Wind strength
    #[arg(short, long, default_value_t = 0.0)]
    wind: f32,

    /// Snow intensity (0-1)
    #[arg(long, default_value_t = 0.0)]
    snow: f32,

    /// Air temperature in °C
    #[arg(short, long, default_value_t = 15.0)]
    temperature: f32,

    /// JSON config overriding the built-in tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save the surviving fires to this file at the end
    #[arg(long)]
    save: Option<PathBuf>,

    /// Report interval in seconds
    #[arg(short, long, default_value_t = 10.0)]
    report_interval: f32,

    /// Run validation tests
    #[arg(short, long)]
    validate: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    tracing::debug!("Demo arguments: {args:?}");

    println!("=== Survival Fire Demo ===\n");

    let config = match &args.config {
        Some(path) => match SimulationConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Could not load config {}: {err}", path.display());
                std::process::exit(1);
            }
        },
        None => SimulationConfig::default(),
    };

    let log = Arc::new(NotificationLog::new());
    let mut sim = match args.seed {
        Some(seed) => FireSimulation::with_seed(config, log.clone(), seed),
        None => FireSimulation::new(config, log.clone()),
    };

    let weather = Weather {
        rain_intensity: args.rain.clamp(0.0, 1.0),
        wind: Vec3::new(args.wind.max(0.0), 0.0, 0.0),
        snow_intensity: args.snow.clamp(0.0, 1.0),
        ambient_temperature: args.temperature,
    };
    println!(
        "Weather: rain {:.2}, wind {:.1}, snow {:.2}, air {:.1}°C",
        weather.rain_intensity,
        weather.wind_strength(),
        weather.snow_intensity,
        weather.ambient_temperature
    );
    sim.set_weather(weather);

    let mut backpack = SimpleInventory::new()
        .with_item("flint", 1)
        .with_item("stick", args.sticks)
        .with_item("wood_log", args.logs);
    if let Some(raw) = &args.cook {
        backpack = backpack.with_item(raw.clone(), 1);
    }
    let mut inventories = Inventories::new();
    inventories.insert(PLAYER, backpack);

    let fire = match sim.spawn_fire(args.fire.into(), Vec3::zeros(), Rotation::identity(), true) {
        Ok(id) => id,
        Err(err) => {
            eprintln!("Could not build the fire: {err}");
            std::process::exit(1);
        }
    };
    println!("Built {} {fire}", FireType::from(args.fire));

    for (item, quantity) in [("stick", args.sticks), ("wood_log", args.logs)] {
        if quantity == 0 {
            continue;
        }
        match sim.add_fuel(&fire, PLAYER, item, quantity, &mut inventories) {
            Ok(added) => println!(
                "Added {quantity} x {item}: {:.0} burn-seconds ({:.0} total)",
                added.accepted, added.fuel_amount
            ),
            Err(err) => println!("Could not add {item}: {err}"),
        }
    }

    if let Err(err) = sim.ignite_fire(&fire, Some(PLAYER), &mut inventories) {
        println!("\nThe fire would not light: {err}");
        print_notifications(&log);
        return;
    }

    println!("\nRunning simulation...\n");
    println!("Time(s) | State        | Temp(°C) | Fuel(s) | Fuel % | Warmth@1m");
    println!("--------|--------------|----------|---------|--------|----------");

    let mut tracker = sim.cooking_tracker();
    let mut cooking_started = false;
    let mut time = 0.0;
    let mut next_report = 0.0;
    let mut peak_temperature: f32 = 0.0;
    let mut last_state = FireState::Igniting;
    let mut end_reason = None;

    while time < args.duration {
        let report = sim.tick(args.dt, &mut inventories);
        time += args.dt;

        for (id, from, to) in &report.state_changes {
            if *id == fire {
                println!("        | {from} -> {to} at {time:.1}s");
                last_state = *to;
            }
        }
        if let Some((_, reason)) = report.extinguished.iter().find(|(id, _)| *id == fire) {
            end_reason = Some(*reason);
        }

        if let Some(raw) = &args.cook {
            if let Some(inventory) = inventories.get_mut(PLAYER) {
                if !cooking_started && last_state == FireState::Burning {
                    cooking_started = tracker
                        .start_cooking(sim.fire(&fire), raw, &mut *inventory)
                        .is_ok();
                }
                for outcome in tracker.update(args.dt, &sim, inventory) {
                    println!("        | cooking: {outcome:?}");
                }
            }
        }

        let Some(current) = sim.fire(&fire) else {
            break;
        };
        peak_temperature = peak_temperature.max(current.temperature());

        if time >= next_report {
            print_row(time, current, sim.warmth_at(&Vec3::new(1.0, 0.0, 0.0)));
            next_report += args.report_interval;
        }
    }

    println!("\n=== Simulation Complete ===");
    println!("Final time: {time:.1}s");
    println!("Peak temperature: {peak_temperature:.0}°C");
    match (sim.fire(&fire), end_reason) {
        (_, Some(reason)) => println!("The fire {reason}"),
        (Some(current), None) => println!(
            "Still {} with {:.0}s of fuel",
            current.state(),
            current.fuel_amount()
        ),
        (None, None) => println!("The fire is gone"),
    }
    if let Some(inventory) = inventories.get(PLAYER) {
        for item in ["cooked_meat", "cooked_fish", "baked_potato", "roasted_mushroom"] {
            let count = inventory.item_count(item);
            if count > 0 {
                println!("Cooked: {count} x {item}");
            }
        }
    }
    print_notifications(&log);

    if let Some(path) = &args.save {
        match sim.save_slot(path, "demo") {
            Ok(count) => println!("\nSaved {count} fire(s) to {}", path.display()),
            Err(err) => eprintln!("\nSave failed: {err}"),
        }
    }

    if args.validate {
        run_validation_tests();
    }
}

fn print_row(time: f32, fire: &FireInstance, warmth: f32) {
    println!(
        "{:7.1} | {:12} | {:8.1} | {:7.1} | {:6.1} | {:9.2}",
        time,
        fire.state().to_string(),
        fire.temperature(),
        fire.fuel_amount(),
        fire.fuel_percentage(),
        warmth
    );
}

fn print_notifications(log: &NotificationLog) {
    let notifications = log.drain();
    if notifications.is_empty() {
        return;
    }
    println!("\nPlayer notifications:");
    for notification in notifications {
        println!("  [{:?}] {}", notification.severity, notification.message);
    }
}

/// A lit campfire held at `temperature`
fn test_fire(temperature: f32) -> Option<FireInstance> {
    let types = FireTypeTable::default();
    let mut fire = FireInstance::new(
        FireId::new("validation"),
        FireType::Campfire,
        types.get(FireType::Campfire).ok()?,
        Vec3::zeros(),
        Rotation::identity(),
        false,
        20.0,
    );
    fire.add_fuel("wood_log", FuelType::Logs, 1, &FuelTable::default())
        .ok()?;
    fire.ignite(&FireThresholds::default()).ok()?;
    fire.adjust_temperature(temperature - fire.temperature());
    Some(fire)
}

fn extinguish_rate(weather: &Weather, temperature: f32, dt: f32, trials: u32, expected: ExtinguishReason) -> f32 {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut count = 0;
    for _ in 0..trials {
        let Some(mut fire) = test_fire(temperature) else {
            return 0.0;
        };
        if apply_environment(&mut fire, weather, dt, &mut rng) == Some(expected) {
            count += 1;
        }
    }
    count as f32 / trials as f32
}

fn report(passed: bool, pass: &str, fail: &str) {
    if passed {
        println!("  ✓ PASS: {pass}");
    } else {
        println!("  ✗ FAIL: {fail}");
    }
}

fn run_validation_tests() {
    println!("\n=== Running Validation Tests ===\n");

    // Test 1: Heavy rain drowns cool fires
    println!("Test 1: Heavy Rain");
    let rain = Weather {
        rain_intensity: 0.9,
        ..Weather::default()
    };
    let cool = extinguish_rate(&rain, 250.0, 0.1, 100_000, ExtinguishReason::Rain);
    let hot = extinguish_rate(&rain, 450.0, 0.1, 10_000, ExtinguishReason::Rain);
    println!("  250°C fire drowned: {:.3}% of ticks (expected 0.900%)", cool * 100.0);
    println!("  450°C fire drowned: {:.3}% of ticks", hot * 100.0);
    report(
        (0.0078..=0.0102).contains(&cool) && hot == 0.0,
        "Rain only drowns fires below 300°C",
        "Rain extinguish rate out of range",
    );

    // Test 2: Gales blow fires out
    println!("\nTest 2: Gale Force Wind");
    let gale = Weather {
        wind: Vec3::new(40.0, 0.0, 0.0),
        ..Weather::default()
    };
    let rate = extinguish_rate(&gale, 450.0, 1.0, 10_000, ExtinguishReason::Wind);
    println!("  Strength 40 wind: {:.1}% per second (expected 20.0%)", rate * 100.0);
    report(
        (0.17..=0.23).contains(&rate),
        "Gale extinguish rate matches",
        "Gale extinguish rate out of range",
    );

    // Test 3: Warmth falls off with distance
    println!("\nTest 3: Warmth Falloff");
    let config = SimulationConfig::default();
    let log = Arc::new(NotificationLog::new());
    let mut sim = FireSimulation::with_seed(config, log, 7);
    let mut inventories = Inventories::new();
    inventories.insert(PLAYER, SimpleInventory::new().with_item("wood_log", 1));
    let warmth = sim
        .spawn_fire(FireType::Campfire, Vec3::zeros(), Rotation::identity(), true)
        .and_then(|fire| {
            sim.add_fuel(&fire, PLAYER, "wood_log", 1, &mut inventories)?;
            sim.ignite_fire(&fire, None, &mut inventories)?;
            for _ in 0..50 {
                sim.tick(0.1, &mut inventories);
            }
            Ok([0.5_f32, 2.0, 4.0, 8.0].map(|d| sim.warmth_at(&Vec3::new(d, 0.0, 0.0))))
        });
    match warmth {
        Ok(samples) => {
            for (distance, value) in [0.5, 2.0, 4.0, 8.0].iter().zip(samples) {
                println!("  {distance:>4.1}m: {value:.2}");
            }
            report(
                samples.windows(2).all(|pair| pair[0] >= pair[1]) && samples[0] > 0.0,
                "Warmth decreases with distance",
                "Warmth did not fall off",
            );
        }
        Err(err) => println!("  ✗ FAIL: {err}"),
    }
}
