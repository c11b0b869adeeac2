//! Skycourier entry point
//!
//! Runs a block-compiled program file against a campaign level and plays
//! the resulting event log back as a text animation. Level selection and
//! settings come from the command line; the real game wires these from its
//! own UI.

use std::{env, fs, process, thread};

use skycourier::{
    Playback, Pose, RunOutcome, Settings, SoundCue, Stage, load_level, run_program,
};

/// A stage that narrates playback through the log facade
struct LogStage;

impl Stage for LogStage {
    fn draw_drone(&mut self, x: f32, y: f32, heading: f32, pose: Pose) {
        log::info!("drone at ({x:.1}, {y:.1}) heading {heading:.0} [{pose:?}]");
    }

    fn hide_parcel(&mut self) {
        log::info!("parcel collected");
    }

    fn play_sound(&mut self, cue: SoundCue) {
        log::info!("sound: {cue:?}");
    }

    fn show_success(&mut self) {
        println!("Delivered!");
    }

    fn highlight_source(&mut self, source: Option<&str>) {
        if let Some(id) = source {
            log::debug!("block {id}");
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("usage: skycourier <level> <program.lua> [settings.json]");
        process::exit(2);
    }

    let settings = match args.get(2) {
        Some(path) => match load_settings(path) {
            Ok(settings) => settings,
            Err(err) => {
                eprintln!("bad settings file {path}: {err}");
                process::exit(2);
            }
        },
        None => Settings::default(),
    };

    let level = match args[0].parse::<usize>() {
        Ok(index) => match load_level(index) {
            Ok(level) => level,
            Err(err) => {
                eprintln!("{err}");
                process::exit(2);
            }
        },
        Err(_) => {
            eprintln!("level must be a number, got {:?}", args[0]);
            process::exit(2);
        }
    };

    let source = match fs::read_to_string(&args[1]) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("cannot read {}: {err}", args[1]);
            process::exit(2);
        }
    };

    log::info!("Skycourier starting: level {}, program {}", args[0], args[1]);
    let report = run_program(level, &source, &settings);
    if let Some(fault) = &report.fault {
        eprintln!("program fault: {fault}");
    }
    println!("outcome: {:?}", report.outcome);

    let outcome = report.outcome;
    let mut playback = Playback::new(report, &settings);
    let delay = playback.frame_delay();
    let mut stage = LogStage;
    while playback.step(&mut stage) {
        thread::sleep(delay);
    }

    process::exit(if outcome == RunOutcome::Success { 0 } else { 1 });
}

fn load_settings(path: &str) -> Result<Settings, String> {
    let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
    Settings::from_json(&json).map_err(|e| e.to_string())
}
