//! gridgrab - a deterministic factory-automation simulation
//!
//! Headless runner: builds a demo world of grabber/container stations, ticks
//! the grabber state machines, streams transfer events, and saves the world.

mod config;
mod headless;

use anyhow::Result;
use config::SimConfig;
use headless::HeadlessConfig;
use std::{env, path::PathBuf};
use tracing::info;

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting gridgrab v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    if cli.help {
        print_usage();
        return Ok(());
    }

    let sim = match &cli.config {
        Some(path) => SimConfig::load_from_path(path),
        None => SimConfig::load(),
    };

    headless::run(HeadlessConfig {
        sim,
        scenario: cli.scenario,
        max_ticks: cli.ticks,
        world_seed: cli.seed,
        save_dir: cli.save_dir,
        no_save: cli.no_save,
        event_log: cli.event_log,
    })
}

struct CliOptions {
    ticks: Option<u64>,
    seed: Option<u64>,
    config: Option<PathBuf>,
    scenario: Option<String>,
    save_dir: Option<PathBuf>,
    no_save: bool,
    event_log: Option<PathBuf>,
    help: bool,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut opts = CliOptions {
            ticks: None,
            seed: None,
            config: None,
            scenario: None,
            save_dir: None,
            no_save: false,
            event_log: None,
            help: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--ticks" => opts.ticks = args.next().and_then(|v| v.parse().ok()),
                "--seed" => opts.seed = args.next().and_then(|v| v.parse().ok()),
                "--config" => opts.config = args.next().map(PathBuf::from),
                "--scenario" => opts.scenario = args.next(),
                "--save-dir" => opts.save_dir = args.next().map(PathBuf::from),
                "--no-save" => opts.no_save = true,
                "--event-log" => opts.event_log = args.next().map(PathBuf::from),
                "--help" | "-h" => opts.help = true,
                other => tracing::warn!("Unknown argument: {other}"),
            }
        }

        opts
    }
}

fn print_usage() {
    println!("gridgrab [OPTIONS]");
    println!();
    println!("  --ticks N        simulate N ticks (default: config max_ticks)");
    println!("  --seed N         world seed override");
    println!("  --config PATH    simulation config (default: config/sim.toml)");
    println!("  --scenario NAME  world scenario: demo or drain (default: demo)");
    println!("  --save-dir PATH  directory for the world save (default: saves)");
    println!("  --no-save        skip saving the world at exit");
    println!("  --event-log PATH write transfer events as JSONL");
    println!("  -h, --help       show this help");
}

#[cfg(test)]
mod tests {
    use super::CliOptions;

    #[test]
    fn parse_covers_runner_flags() {
        let args = [
            "--ticks", "120", "--seed", "7", "--scenario", "drain", "--no-save",
        ]
        .iter()
        .map(|s| s.to_string());

        let opts = CliOptions::parse(args);
        assert_eq!(opts.ticks, Some(120));
        assert_eq!(opts.seed, Some(7));
        assert_eq!(opts.scenario.as_deref(), Some("drain"));
        assert!(opts.no_save);
        assert!(!opts.help);
    }

    #[test]
    fn unknown_flags_are_ignored() {
        let opts = CliOptions::parse(["--belts".to_string()].into_iter());
        assert_eq!(opts.scenario, None);
        assert!(!opts.help);
    }
}
