//! Interactive Fire Spread Demo
//!
//! A terminal REPL over a live, timer-driven simulation session. Fires are
//! placed by coordinate, the run ticks in the background once started, and
//! finished runs can be saved to and replayed from a JSON run store.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package demo-interactive -- [runs.json]
//! ```
//!
//! # Commands
//!
//! - `fire <lat> <lng>` - Place a seed fire
//! - `start` / `stop` / `toggle` - Control the run
//! - `clear` - Remove every fire and reset the clock
//! - `status` - Show clock, fire count and risk
//! - `fires` - List active fires
//! - `weather [temp humidity wind_speed wind_dir]` - Show or set conditions
//! - `speed <x>` - Set the simulation speed (allowed while running)
//! - `metrics` - Show responders and recommended actions
//! - `log` - Show earlier notifications
//! - `save` - Save the current run in the background
//! - `history` - List saved runs
//! - `replay <id>` - Replay a saved run
//! - `repeat` - Replay the current seed fires
//! - `rename <id> <name>` - Rename a saved run
//! - `delete <id>` - Delete a saved run
//! - `help` - Show available commands
//! - `quit` - Exit

use fire_spread_core::simulation::{JsonFileRunStore, RunId, RunStore};
use fire_spread_core::{
    LatLng, LiveSession, SessionPrompt, SimError, SimulationConfig, SimulationParameters,
    SimulationSession,
};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_RUNS_FILE: &str = "fire_runs.json";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    println!("╔═══════════════════════════════════════════════════════════╗");
    println!("║            Fire Spread Simulation - Interactive           ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();

    let runs_file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_RUNS_FILE.to_string());
    let store: Arc<JsonFileRunStore> = Arc::new(JsonFileRunStore::new(&runs_file));

    let session = match SimulationSession::new(SimulationConfig::default()) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to create session: {e}");
            return;
        }
    };
    let mut live = LiveSession::new(session);
    println!("Runs are stored in {runs_file}");

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to create readline: {e}");
            return;
        }
    };

    println!("\nType 'help' for available commands.\n");

    loop {
        match rl.readline("fire> ") {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                let parts: Vec<&str> = line.split_whitespace().collect();
                let Some(command) = parts.first() else {
                    continue;
                };

                let result = match command.to_lowercase().as_str() {
                    "fire" | "f" => place_fire(&live, &parts),
                    "start" => live.start(),
                    "stop" => {
                        if !live.stop() {
                            println!("Simulation is not running");
                        }
                        Ok(())
                    }
                    "toggle" | "t" => live.toggle().map(|active| {
                        println!("Simulation {}", if active { "started" } else { "stopped" });
                    }),
                    "clear" | "c" => {
                        live.clear();
                        Ok(())
                    }
                    "status" | "st" => {
                        show_status(&live);
                        Ok(())
                    }
                    "fires" | "ls" => {
                        show_fires(&live);
                        Ok(())
                    }
                    "weather" | "w" => set_weather(&live, &parts),
                    "speed" => parse_arg::<f64>(&parts, 1, "speed <x>")
                        .and_then(|speed| live.lock().set_simulation_speed(speed)),
                    "metrics" | "m" => {
                        show_metrics(&live);
                        Ok(())
                    }
                    "log" => {
                        show_log(&live);
                        Ok(())
                    }
                    "save" => live
                        .save_in_background(store.clone(), None)
                        .map(|_| println!("Saving in the background...")),
                    "history" | "hi" => show_history(store.as_ref()),
                    "replay" | "r" => replay(&mut live, store.as_ref(), &parts),
                    "repeat" => live.repeat_current(),
                    "rename" => rename(&live, store.as_ref(), &parts),
                    "delete" => parse_arg::<u64>(&parts, 1, "delete <id>")
                        .and_then(|id| live.lock().delete_run(store.as_ref(), RunId(id))),
                    "help" | "?" => {
                        print_help();
                        Ok(())
                    }
                    "quit" | "exit" | "q" => break,
                    other => {
                        println!("Unknown command: {other}. Type 'help' for commands.");
                        Ok(())
                    }
                };

                if let Err(e) = result {
                    println!("Error: {e}");
                }
                report_pending(&live);
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }

    live.stop();
    println!("Goodbye!");
}

fn parse_arg<T: std::str::FromStr>(parts: &[&str], index: usize, usage: &str) -> Result<T, SimError> {
    parts
        .get(index)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| SimError::InvalidParameter(format!("usage: {usage}")))
}

fn place_fire(live: &LiveSession, parts: &[&str]) -> Result<(), SimError> {
    let lat = parse_arg::<f64>(parts, 1, "fire <lat> <lng>")?;
    let lng = parse_arg::<f64>(parts, 2, "fire <lat> <lng>")?;
    let fire = live.lock().add_fire(LatLng::new(lat, lng))?;
    println!("Placed {} at {} heading {:.0}°", fire.id, fire.position, *fire.direction);
    Ok(())
}

fn set_weather(live: &LiveSession, parts: &[&str]) -> Result<(), SimError> {
    if parts.len() == 1 {
        let session = live.lock();
        let p = session.params();
        println!("Temperature:   {:.1}°C", *p.temperature());
        println!("Humidity:      {:.0}%", *p.humidity());
        println!(
            "Wind:          {:.1} km/h from {} ({:.0}°)",
            *p.wind_speed(),
            p.wind_direction().compass_label(),
            *p.wind_direction()
        );
        println!("Speed:         {:.1}x", p.simulation_speed());
        println!("Fire risk:     {}/100", session.risk());
        return Ok(());
    }

    let usage = "weather <temp> <humidity> <wind_speed> <wind_dir>";
    let temperature = parse_arg::<f64>(parts, 1, usage)?;
    let humidity = parse_arg::<f64>(parts, 2, usage)?;
    let wind_speed = parse_arg::<f64>(parts, 3, usage)?;
    let wind_direction = parse_arg::<f64>(parts, 4, usage)?;

    let mut session = live.lock();
    let speed = session.params().simulation_speed();
    let params =
        SimulationParameters::new(wind_direction, wind_speed, temperature, humidity, speed)?;
    session.set_parameters(params)?;
    println!("Fire risk is now {}/100", session.risk());
    Ok(())
}

fn show_status(live: &LiveSession) {
    let snapshot = live.lock().snapshot();
    println!("State:         {:?}", snapshot.state);
    println!("Elapsed:       {}/{} ticks", snapshot.elapsed, snapshot.auto_stop_duration);
    println!("Active fires:  {}/{}", snapshot.active_count, snapshot.max_active_fires);
    println!("Fire risk:     {}/100", snapshot.risk);
    println!("Wind from:     {}", snapshot.wind_label);
    if snapshot.is_replay {
        println!("Mode:          replay");
    }
}

fn show_fires(live: &LiveSession) {
    let snapshot = live.lock().snapshot();
    if snapshot.fires.is_empty() {
        println!("No active fires");
        return;
    }
    println!("{:<24} {:>9} {:>8} {:>5}  position", "id", "intensity", "heading", "idle");
    for fire in &snapshot.fires {
        println!(
            "{:<24} {:>9.3} {:>7.1}° {:>5}  {}",
            fire.id.as_str(),
            fire.intensity,
            *fire.direction,
            fire.last_movement,
            fire.position
        );
    }
}

fn show_metrics(live: &LiveSession) {
    let session = live.lock();
    let metrics = session.metrics();
    println!("Active fires:        {}", metrics.active_fires);
    println!("Total intensity:     {:.2}", metrics.total_intensity);
    println!("Estimated area:      {:.1}", metrics.total_area);
    println!("Responders required: {}", metrics.required_responders);
    println!("Recommended actions:");
    for strategy in &metrics.strategies {
        println!("  - {strategy}");
    }
}

fn show_log(live: &LiveSession) {
    let session = live.lock();
    let mut any = false;
    for notification in session.notification_history() {
        println!("{notification}");
        any = true;
    }
    if !any {
        println!("No notifications yet");
    }
}

fn show_history(store: &dyn RunStore) -> Result<(), SimError> {
    let runs = store.recent(10)?;
    if runs.is_empty() {
        println!("No saved runs");
        return Ok(());
    }
    for run in runs {
        println!(
            "#{}  {}  {:<28} {:>3} ticks  {:>2} fires  risk {}",
            run.id,
            run.timestamp.format("%Y-%m-%d %H:%M"),
            run.display_name(),
            run.duration_or_default(),
            run.fire_count(),
            risk_label(run.fire_risk)
        );
    }
    Ok(())
}

fn risk_label(risk: Option<u8>) -> String {
    match risk {
        Some(risk) => risk.to_string(),
        None => "-".to_string(),
    }
}

fn replay(live: &mut LiveSession, store: &dyn RunStore, parts: &[&str]) -> Result<(), SimError> {
    let id = RunId(parse_arg::<u64>(parts, 1, "replay <id>")?);
    let run = store
        .recent(usize::MAX)?
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| SimError::MalformedReplay(format!("no saved run #{id}")))?;
    live.repeat_run(&run)
}

fn rename(live: &LiveSession, store: &dyn RunStore, parts: &[&str]) -> Result<(), SimError> {
    let id = RunId(parse_arg::<u64>(parts, 1, "rename <id> <name>")?);
    let name = parts.get(2..).unwrap_or_default().join(" ");
    live.lock().rename_run(store, id, &name)
}

fn report_pending(live: &LiveSession) {
    let mut session = live.lock();
    for notification in session.take_notifications() {
        println!("{notification}");
    }
    if let Some(prompt) = session.take_prompt() {
        println!("== {} ==", prompt.title());
        match prompt {
            SessionPrompt::Save { .. } => println!("Type 'save' to store this run."),
            SessionPrompt::RepeatOrExit => {
                println!("Type 'repeat' to run it again or 'clear' to start over.");
            }
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  fire <lat> <lng>        Place a seed fire (f)");
    println!("  start | stop | toggle   Control the run (t)");
    println!("  clear                   Remove all fires and reset (c)");
    println!("  status                  Clock and fire count (st)");
    println!("  fires                   List active fires (ls)");
    println!("  weather [t h ws wd]     Show or set conditions (w)");
    println!("  speed <x>               Simulation speed, 0.1-5");
    println!("  metrics                 Responders and recommended actions (m)");
    println!("  log                     Earlier notifications");
    println!("  save                    Save the current run");
    println!("  history                 List saved runs (hi)");
    println!("  replay <id>             Replay a saved run (r)");
    println!("  repeat                  Replay the current seed fires");
    println!("  rename <id> <name>      Rename a saved run");
    println!("  delete <id>             Delete a saved run");
    println!("  quit                    Exit (q)");
}
