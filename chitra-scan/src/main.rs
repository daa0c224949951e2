//! chitra-scan - Gantry raster scanner console
//!
//! Loads the configuration, builds the gantry and waits for console
//! commands (see [`chitra_scan::jog`]). `center` homes the gantry and runs a
//! full scan into the configured row log.
//!
//! With `--scan` the console is skipped: the gantry is homed, scanned once
//! and the program exits.

use chitra_scan::devices::create_gantry;
use chitra_scan::jog::{self, JogCommand, JogEvent};
use chitra_scan::scan::{CsvRowLog, ScanController};
use chitra_scan::{Config, Error, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::env;
use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const DEFAULT_CONFIG: &str = "chitra.toml";

/// Command line options
struct Args {
    config_path: Option<String>,
    scan_once: bool,
}

/// Parse command line arguments.
///
/// Supports:
/// - `chitra-scan <path>` (positional)
/// - `chitra-scan --config <path>` / `-c <path>`
/// - `--scan` to home, scan once and exit
fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let mut config_path = None;
    let mut scan_once = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" if i + 1 < args.len() => {
                config_path = Some(args[i + 1].clone());
                i += 1;
            }
            "--scan" => scan_once = true,
            arg if !arg.starts_with('-') && config_path.is_none() => {
                config_path = Some(arg.to_string());
            }
            _ => {}
        }
        i += 1;
    }

    Args {
        config_path,
        scan_once,
    }
}

fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None if Path::new(DEFAULT_CONFIG).exists() => Config::load(DEFAULT_CONFIG),
        None => Ok(Config::default()),
    }
}

/// Forward console lines to the control loop
fn spawn_console_reader() -> Result<Receiver<String>> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        log::error!("Console read error: {}", e);
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}

fn report(event: JogEvent) {
    match event {
        JogEvent::Moved(p) | JogEvent::Position(p) => println!("({}, {})", p.x, p.y),
        JogEvent::Scanned(outcome) => println!("{:?}", outcome),
        JogEvent::Quit => {}
    }
}

fn main() -> Result<()> {
    let args = parse_args();
    let config = load_config(args.config_path.as_deref())?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("chitra-scan v{} starting...", env!("CARGO_PKG_VERSION"));
    match &args.config_path {
        Some(path) => log::info!("Using config: {}", path),
        None => log::info!("Using config: {} or defaults", DEFAULT_CONFIG),
    }
    log::info!(
        "Device: {} ({})",
        config.device.name,
        config.device.device_type
    );

    let gantry = create_gantry(&config)?;
    let row_log = CsvRowLog::create(&config.output.csv_path)?;
    let mut scanner = ScanController::new(gantry, Box::new(row_log), &config)?;
    scanner.beep()?;

    if args.scan_once {
        scanner.home()?;
        let outcome = scanner.scan()?;
        log::info!("{:?}", outcome);
        return Ok(());
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let input = spawn_console_reader()?;
    let poll = Duration::from_millis(config.jog.poll_ms);
    println!("Commands: left right up down center pos quit");

    while running.load(Ordering::Relaxed) {
        let line = match input.recv_timeout(poll) {
            Ok(line) => line,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<JogCommand>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        match jog::apply(&mut scanner, command) {
            Ok(JogEvent::Quit) => break,
            Ok(event) => report(event),
            Err(e) => log::error!("{:?} failed: {}", command, e),
        }
    }

    log::info!("chitra-scan stopped");
    Ok(())
}
