// ============================================================================
// headless.rs — Reef Lab
// Windowless runner: one simulation, diagnostics, a stdout table and the
// requested exports.
// ============================================================================

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;

use crate::config::{SimulationParams, DEFAULT_STEPS, RESET_DEFAULTS};
use crate::lab::{export_run_json, export_series_csv, RunRecord};
use crate::metrics::RunDiagnostics;
use crate::model::{simulate, PopulationSeries};

#[derive(Clone, Debug)]
pub struct HeadlessConfig {
    pub params: SimulationParams,
    pub steps: usize,
    pub csv_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
    pub print_table: bool,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            params: RESET_DEFAULTS,
            steps: DEFAULT_STEPS,
            csv_path: None,
            json_path: None,
            print_table: true,
        }
    }
}

pub fn run_headless(config: &HeadlessConfig) -> Result<PopulationSeries> {
    let params = &config.params;
    log::info!(
        "Headless run started: resource={} fishing={} pollution={} steps={}",
        params.resource,
        params.fishing,
        params.pollution,
        config.steps,
    );

    let started = Instant::now();
    let series = simulate(params, config.steps);
    RunDiagnostics::from_series(&series).log(1, None);

    if config.print_table {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        write_table(&mut out, &series).context("failed to write table to stdout")?;
    }

    if let Some(path) = &config.csv_path {
        export_series_csv(path, &series)?;
    }
    if let Some(path) = &config.json_path {
        let record = RunRecord::new(Local::now(), *params, &series);
        export_run_json(path, &record)?;
    }

    log::info!(
        "Headless run finished in {:.2} ms",
        started.elapsed().as_secs_f64() * 1000.0
    );
    Ok(series)
}

/// Fixed-width `step prey predators capacity` table.
pub fn write_table<W: Write>(out: &mut W, series: &PopulationSeries) -> io::Result<()> {
    writeln!(out, "{:>5} {:>8} {:>10} {:>9}", "step", "prey", "predators", "capacity")?;
    for (step, prey, predators, capacity) in series.rows() {
        writeln!(out, "{:>5} {:>8} {:>10} {:>9}", step, prey, predators, capacity)?;
    }
    out.flush()
}
