mod commands;
mod demo_clock;
mod scene_store;

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use beatscene_core::config::Config;
use beatscene_core::{EngineHandle, EngineServices};
use beatscene_types::EngineTelemetry;

use commands::{ClockCommand, Command};
use demo_clock::DemoClock;
use scene_store::{numbered_names, SceneList, SharedScenes};

const DEMO_SCENES: usize = 4;

fn init_logging(verbose: bool) {
    use simplelog::{LevelFilter, WriteLogger};

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    let log_path = dirs::config_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("beatscene")
        .join("beatscene.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("cannot create log file {}: {}", log_path.display(), e);
            return;
        }
    };

    if let Err(e) = WriteLogger::init(log_level, simplelog::Config::default(), log_file) {
        eprintln!("failed to initialize logger: {}", e);
        return;
    }

    log::info!("beatscene starting (log level: {:?})", log_level);
}

struct App {
    engine: EngineHandle,
    clock: Arc<DemoClock>,
    scenes: SharedScenes,
}

impl App {
    /// Returns false when the loop should stop.
    fn run_command(&mut self, command: Command) -> io::Result<bool> {
        let engine = &self.engine;
        match command {
            Command::Enable | Command::Disable => {
                self.scenes.lock().reset_index();
                engine.set_enabled(command == Command::Enable);
            }
            Command::Source(source) => engine.set_tempo_source(source),
            Command::Bpm(bpm) => engine.set_manual_bpm(bpm),
            Command::TapBpm(bpm) => engine.set_tap_tempo_bpm(bpm),
            Command::Division(division) => engine.set_beat_division(division),
            Command::Play => {
                engine.toggle_play_pause();
                // The master clock may have flipped; let the engine re-observe it.
                engine.notify_external_clock_changed();
            }
            Command::Reset => engine.reset_downbeat(),
            Command::Scenes(count) => {
                self.scenes.lock().set_names(numbered_names(count));
                engine.notify_scene_list_changed();
            }
            Command::Mode(mode) => self.scenes.lock().set_mode(mode),
            Command::Clock(clock) => {
                match clock {
                    ClockCommand::Play => self.clock.set_playing(true),
                    ClockCommand::Stop => self.clock.set_playing(false),
                    ClockCommand::Beat => {
                        let beat = self.clock.step_beat();
                        println!("master beat {}", beat);
                    }
                    ClockCommand::Bpm(bpm) => self.clock.set_bpm(bpm),
                }
                engine.notify_external_clock_changed();
            }
            Command::Status { json } => self.print_status(json)?,
            Command::Help => println!("{}", commands::HELP),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn print_status(&mut self, json: bool) -> io::Result<()> {
        self.engine.drain_telemetry();
        let telemetry = self.engine.telemetry().clone();
        if json {
            let out = serde_json::to_string_pretty(&telemetry).map_err(io::Error::other)?;
            println!("{}", out);
            return Ok(());
        }
        print_telemetry(&telemetry);
        let scenes = self.scenes.lock();
        if scenes.is_empty() {
            println!("  scenes:    none");
            return Ok(());
        }
        let current = match (scenes.current(), scenes.current_name()) {
            (Some(index), Some(name)) => format!("{} (index {})", name, index),
            _ => "-".to_string(),
        };
        println!(
            "  scenes:    {} ({}), current {}",
            scenes.len(),
            scenes.mode(),
            current
        );
        Ok(())
    }
}

fn print_telemetry(t: &EngineTelemetry) {
    println!("  phase:     {:?}", t.phase);
    println!("  source:    {} @ {:.1} bpm", t.tempo_source, t.current_bpm);
    println!(
        "  beat:      {}/{} ({:.0}%)",
        t.beat_counter,
        t.beat_division,
        t.progress() * 100.0
    );
    println!(
        "  playing:   {}{}",
        t.is_playing,
        if t.local_clock_running { " (local clock)" } else { "" }
    );
    println!("  fires:     {}", t.fires);
}

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose" || a == "-v");
    init_logging(verbose);

    let config = Config::load();
    let engine_config = config.engine_config();

    let clock = Arc::new(DemoClock::new(engine_config.manual_bpm));
    let scenes = SharedScenes::new(SceneList::numbered(DEMO_SCENES));
    let services = EngineServices::new(
        clock.clone(),
        Box::new(scenes.clone()),
        Box::new(|| {
            log::debug!(target: "flash", "flash");
            println!("*");
        }),
    );
    let engine = EngineHandle::spawn(engine_config, services, config.flash_duration());

    let mut app = App {
        engine,
        clock,
        scenes,
    };

    println!("beatscene: {} scenes loaded; type 'help' for commands", DEMO_SCENES);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        match commands::parse(&line) {
            Ok(Some(command)) => {
                if !app.run_command(command)? {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => println!("{}", e),
        }
        stdout.flush()?;
    }

    app.engine.shutdown();
    log::info!("beatscene exiting");
    Ok(())
}
