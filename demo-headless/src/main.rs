use clap::Parser;
use fire_spread_core::simulation::{JsonFileRunStore, RunStore};
use fire_spread_core::{
    ClockEvent, LatLng, SimError, SimulationConfig, SimulationParameters, SimulationSession,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Fire spread simulation demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "fire-spread-demo")]
#[command(about = "Headless fire spread simulation", long_about = None)]
struct Args {
    /// JSON configuration file (limits, duration, seed, location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Temperature in °C (0-50)
    #[arg(short, long, default_value_t = 30.0)]
    temperature: f64,

    /// Relative humidity in % (0-100)
    #[arg(long, default_value_t = 30.0)]
    humidity: f64,

    /// Wind speed in km/h (0-100)
    #[arg(short, long, default_value_t = 20.0)]
    wind_speed: f64,

    /// Wind direction in degrees (0=North, 90=East)
    #[arg(long, default_value_t = 0.0)]
    wind_direction: f64,

    /// Simulation speed multiplier (0.1-5)
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Seed fire as "lat,lng"; repeat for more. Defaults to the map centre.
    #[arg(short, long = "fire", value_parser = parse_lat_lng)]
    fires: Vec<LatLng>,

    /// Ticks before the run stops (overrides the config file)
    #[arg(short, long)]
    duration: Option<u64>,

    /// RNG seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Report every N ticks
    #[arg(short, long, default_value_t = 5)]
    report_interval: u64,

    /// Save the finished run to this JSON run store
    #[arg(long)]
    save: Option<PathBuf>,

    /// Replay the newest run in this JSON run store instead of placing fires
    #[arg(long)]
    replay_from: Option<PathBuf>,

    /// List the runs in this JSON run store and exit
    #[arg(long)]
    history: Option<PathBuf>,
}

fn parse_lat_lng(s: &str) -> Result<LatLng, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lng\", got \"{s}\""))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {e}"))?;
    let lng: f64 = lng.trim().parse().map_err(|e| format!("bad longitude: {e}"))?;
    Ok(LatLng::new(lat, lng))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), SimError> {
    if let Some(path) = &args.history {
        return list_history(&JsonFileRunStore::new(path));
    }

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(duration) = args.duration {
        config.auto_stop_duration = duration;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    let center = config.default_center;

    println!("=== Fire Spread Simulation ===\n");
    let mut session = SimulationSession::new(config)?;

    if let Some(path) = &args.replay_from {
        let store = JsonFileRunStore::new(path);
        let Some(latest) = store.recent(1)?.into_iter().next() else {
            return Err(SimError::MalformedReplay(format!(
                "no saved runs in {}",
                path.display()
            )));
        };
        println!("Replaying \"{}\" from {}", latest.display_name(), latest.timestamp);
        session.repeat_run(&latest)?;
    } else {
        session.set_parameters(SimulationParameters::new(
            args.wind_direction,
            args.wind_speed,
            args.temperature,
            args.humidity,
            args.speed,
        )?)?;
        let seeds = if args.fires.is_empty() {
            vec![center]
        } else {
            args.fires.clone()
        };
        for position in seeds {
            let fire = session.add_fire(position)?;
            println!("Placed fire {} at {}", fire.id, fire.position);
        }
        session.start()?;
    }

    let params = *session.params();
    println!(
        "Weather: {:.1}°C, {:.0}% humidity, wind {:.1} km/h from {} ({:.0}°)",
        *params.temperature(),
        *params.humidity(),
        *params.wind_speed(),
        params.wind_direction().compass_label(),
        *params.wind_direction()
    );
    println!("Fire risk: {}/100\n", session.risk());

    let interval = args.report_interval.max(1);
    while let Some(event) = session.tick() {
        let snapshot = session.snapshot();
        if snapshot.elapsed % interval == 0 || matches!(event, ClockEvent::AutoStopped { .. }) {
            println!(
                "[tick {:>3}/{}] active fires: {:>3}/{}  intensity: {:>6.2}  responders: {}",
                snapshot.elapsed,
                snapshot.auto_stop_duration,
                snapshot.active_count,
                snapshot.max_active_fires,
                snapshot.metrics.total_intensity,
                snapshot.metrics.required_responders,
            );
        }
    }

    println!("\n=== Summary ===");
    let snapshot = session.snapshot();
    println!("Ticks run: {}", snapshot.elapsed);
    println!("Active fires: {}", snapshot.active_count);
    println!("Estimated area: {:.1}", snapshot.metrics.total_area);
    println!("Responders required: {}", snapshot.metrics.required_responders);
    println!("\nRecommended actions:");
    for strategy in session.mitigation_strategies() {
        println!("  - {strategy}");
    }

    if let Some(path) = &args.save {
        let store = JsonFileRunStore::new(path);
        let id = session.save_to(&store, Some(center))?;
        println!("\nSaved run {id} to {}", path.display());
    }

    for notification in session.take_notifications() {
        tracing::debug!("{notification}");
    }
    Ok(())
}

fn list_history(store: &dyn RunStore) -> Result<(), SimError> {
    let runs = store.recent(10)?;
    if runs.is_empty() {
        println!("No saved runs.");
        return Ok(());
    }
    println!("{:<5} {:<25} {:<28} {:>8} {:>6} {:>5}", "id", "saved", "name", "duration", "fires", "risk");
    for run in runs {
        println!(
            "{:<5} {:<25} {:<28} {:>8} {:>6} {:>5}",
            run.id.to_string(),
            run.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            run.display_name(),
            run.duration_or_default(),
            run.fire_count(),
            run.fire_risk.map_or_else(|| "-".to_string(), |r| r.to_string()),
        );
    }
    Ok(())
}
