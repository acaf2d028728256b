// ============================================================================
// main.rs — Reef Lab
// Entry point. Parses the command line, initializes logging, then either runs
// the headless simulation or starts the event loop.
// ============================================================================

mod animator;
mod app;
mod chart;
mod config;
mod headless;
mod lab;
mod lab_page;
mod lab_ui;
mod menu;
mod metrics;
mod model;
mod page;
mod simulator;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use winit::event_loop::{ControlFlow, EventLoop};

use app::{App, AppConfig};
use config::{SimulationParams, CONTROL_DEFAULTS, DEFAULT_STEPS, RESET_DEFAULTS};
use headless::HeadlessConfig;

#[derive(Parser, Debug)]
#[command(name = "reef-lab", version, about = "Reef population and carbon-cycle lab")]
struct Cli {
    /// Run one simulation without a window and print the series.
    #[arg(long)]
    headless: bool,

    /// Resource level (0-100).
    #[arg(long)]
    resource: Option<i32>,

    /// Fishing pressure (0-100).
    #[arg(long)]
    fishing: Option<i32>,

    /// Pollution (0-200).
    #[arg(long)]
    pollution: Option<i32>,

    /// Number of simulation steps.
    #[arg(long, default_value_t = DEFAULT_STEPS)]
    steps: usize,

    /// Preset name under presets/ to start from.
    #[arg(long)]
    preset: Option<String>,

    /// Headless: write the series as CSV.
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,

    /// Headless: write the full run record as JSON.
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,
}

impl Cli {
    /// Preset first, then individual flags, on top of `fallback`.
    fn params(&self, fallback: SimulationParams) -> Result<SimulationParams> {
        let base = match &self.preset {
            Some(name) => lab::load_preset(Path::new(lab::PRESET_DIR), name)?,
            None => fallback,
        };
        Ok(base.with_overrides(self.resource, self.fishing, self.pollution))
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.headless {
        let config = HeadlessConfig {
            params: cli.params(RESET_DEFAULTS)?,
            steps: cli.steps,
            csv_path: cli.csv.clone(),
            json_path: cli.json.clone(),
            ..HeadlessConfig::default()
        };
        if let Err(e) = headless::run_headless(&config) {
            log::error!("Headless run failed: {:#}", e);
            return Err(e);
        }
        return Ok(());
    }

    if cli.csv.is_some() || cli.json.is_some() {
        log::warn!("--csv/--json only apply to --headless runs; ignoring");
    }

    let config = AppConfig {
        initial_params: cli.params(CONTROL_DEFAULTS)?,
        steps: cli.steps,
        ..AppConfig::default()
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_fallback_defaults() {
        let cli = Cli::parse_from(["reef-lab", "--headless", "--fishing", "70"]);
        let params = cli.params(RESET_DEFAULTS).unwrap();
        assert_eq!(
            params,
            SimulationParams {
                resource: 80,
                fishing: 70,
                pollution: 40,
            }
        );
        assert_eq!(cli.steps, DEFAULT_STEPS);
    }

    #[test]
    fn missing_preset_is_an_error() {
        let cli = Cli::parse_from(["reef-lab", "--preset", "does-not-exist-anywhere"]);
        assert!(cli.params(CONTROL_DEFAULTS).is_err());
    }
}
