// ============================================================================
// lab.rs — Reef Lab
// Session state for the window: events log, status line, run diagnostics
// history, and the export / preset helpers shared with headless mode.
// ============================================================================

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::config::SimulationParams;
use crate::metrics::RunDiagnostics;
use crate::model::PopulationSeries;

/// Directory holding saved parameter presets.
pub const PRESET_DIR: &str = "presets";
/// Root directory for exported runs.
pub const RUNS_DIR: &str = "runs";

// ======================== Lab Event ========================

#[derive(Clone, Debug, Serialize)]
pub struct LabEvent {
    pub time_ms: f64,
    pub event_type: String,
    pub details: String,
}

impl LabEvent {
    pub fn to_log_line(&self) -> String {
        format!(
            "[{:.1}ms] {} — {}",
            self.time_ms, self.event_type, self.details,
        )
    }
}

// ======================== Run Record ========================

/// Everything needed to reproduce and inspect one run.
#[derive(Clone, Debug, Serialize)]
pub struct RunRecord {
    pub run_id: String,
    pub timestamp: String,
    pub app_version: &'static str,
    pub params: SimulationParams,
    pub steps: usize,
    pub diagnostics: RunDiagnostics,
    pub series: PopulationSeries,
}

impl RunRecord {
    pub fn new(
        now: DateTime<Local>,
        params: SimulationParams,
        series: &PopulationSeries,
    ) -> Self {
        Self {
            run_id: run_id(now),
            timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            app_version: env!("CARGO_PKG_VERSION"),
            params,
            steps: series.len().saturating_sub(1),
            diagnostics: RunDiagnostics::from_series(series),
            series: series.clone(),
        }
    }
}

pub fn run_id(now: DateTime<Local>) -> String {
    format!("run_{}", now.format("%Y%m%d_%H%M%S"))
}

/// `runs/<date>` for exports made at `now`.
pub fn run_dir(root: &Path, now: DateTime<Local>) -> PathBuf {
    root.join(now.format("%Y-%m-%d").to_string())
}

// ======================== Export ========================

pub fn series_csv_header() -> &'static str {
    "step,prey,predators,capacity"
}

pub fn export_series_csv(path: &Path, series: &PopulationSeries) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{}", series_csv_header())?;
    for (step, prey, predators, capacity) in series.rows() {
        writeln!(out, "{},{},{},{}", step, prey, predators, capacity)?;
    }
    out.flush()
        .with_context(|| format!("failed to write {}", path.display()))?;

    log::info!("Exported {} rows to {:?}", series.len(), path);
    Ok(())
}

pub fn export_run_json(path: &Path, record: &RunRecord) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(record).context("failed to serialize run record")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("Exported run record {} to {:?}", record.run_id, path);
    Ok(())
}

// ======================== Presets ========================

fn preset_path(dir: &Path, name: &str) -> Result<PathBuf> {
    let name = name.trim();
    if name.is_empty() {
        bail!("preset name is empty");
    }
    if name.contains(['/', '\\']) || name.starts_with('.') {
        bail!("invalid preset name {:?}", name);
    }
    Ok(dir.join(format!("{}.json", name)))
}

pub fn save_preset(dir: &Path, name: &str, params: &SimulationParams) -> Result<PathBuf> {
    let path = preset_path(dir, name)?;
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let json = serde_json::to_string_pretty(params).context("failed to serialize preset")?;
    fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("Preset saved: {:?}", path);
    Ok(path)
}

pub fn load_preset(dir: &Path, name: &str) -> Result<SimulationParams> {
    let path = preset_path(dir, name)?;
    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let params = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse preset {}", path.display()))?;
    log::info!("Loaded preset from {:?}", path);
    Ok(params)
}

// ======================== Lab State ========================

/// Page sections reachable from the nav links.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageSection {
    Population,
    CarbonCycle,
}

impl PageSection {
    pub const ALL: [PageSection; 2] = [PageSection::Population, PageSection::CarbonCycle];

    pub fn title(self) -> &'static str {
        match self {
            PageSection::Population => "Population model",
            PageSection::CarbonCycle => "Carbon cycle",
        }
    }
}

pub struct LabState {
    pub session_start: Instant,

    // -- Events --
    pub events: Vec<LabEvent>,
    pub show_logs_panel: bool,

    // -- Runs --
    pub run_count: u32,
    pub last_diag: Option<RunDiagnostics>,

    // -- Presets --
    pub preset_name: String,

    /// Section a nav link asked to bring into view.
    pub scroll_to: Option<PageSection>,

    status_message: Option<(String, Instant)>,
}

impl Default for LabState {
    fn default() -> Self {
        Self {
            session_start: Instant::now(),
            events: Vec::with_capacity(256),
            show_logs_panel: true,
            run_count: 0,
            last_diag: None,
            preset_name: String::from("default"),
            scroll_to: None,
            status_message: None,
        }
    }
}

impl LabState {
    pub fn log_event(&mut self, event_type: &str, details: &str) {
        let time_ms = self.session_start.elapsed().as_secs_f64() * 1000.0;
        log::debug!("{}: {}", event_type, details);
        self.events.push(LabEvent {
            time_ms,
            event_type: event_type.to_string(),
            details: details.to_string(),
        });
    }

    /// Logs diagnostics for a finished run and keeps them for the next delta.
    pub fn record_run(&mut self, params: &SimulationParams, series: &PopulationSeries) {
        self.run_count += 1;
        let diag = RunDiagnostics::from_series(series);
        diag.log(self.run_count, self.last_diag.as_ref());
        self.log_event(
            "RUN",
            &format!(
                "resource={} fishing={} pollution={} → K={} prey={} sharks={}",
                params.resource,
                params.fishing,
                params.pollution,
                diag.capacity,
                diag.final_prey,
                diag.final_predators,
            ),
        );
        self.last_diag = Some(diag);
    }

    /// Writes CSV and JSON exports of `series` under `runs/<date>/`.
    pub fn export_run(
        &mut self,
        params: SimulationParams,
        series: &PopulationSeries,
    ) -> Result<PathBuf> {
        let now = Local::now();
        let record = RunRecord::new(now, params, series);
        let dir = run_dir(Path::new(RUNS_DIR), now);
        let csv = dir.join(format!("{}.csv", record.run_id));
        export_series_csv(&csv, series)?;
        export_run_json(&dir.join(format!("{}.json", record.run_id)), &record)?;
        self.log_event("EXPORT", &format!("Saved {}", record.run_id));
        Ok(csv)
    }

    pub fn set_status(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    /// Current status message; clears itself after 5 seconds.
    pub fn current_status(&mut self) -> Option<&str> {
        let should_clear = matches!(
            &self.status_message,
            Some((_, when)) if when.elapsed().as_secs() >= 5
        );
        if should_clear {
            self.status_message = None;
        }
        self.status_message.as_ref().map(|(msg, _)| msg.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_STEPS, RESET_DEFAULTS};
    use crate::model::simulate;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("reef-lab-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn csv_export_writes_header_and_every_step() {
        let dir = scratch_dir("csv");
        let path = dir.join("nested").join("series.csv");
        let series = simulate(&RESET_DEFAULTS, 3);

        export_series_csv(&path, &series).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "step,prey,predators,capacity",
                "0,62,5,104",
                "1,74,6,104",
                "2,82,7,104",
                "3,88,8,104",
            ]
        );
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn json_record_carries_params_and_diagnostics() {
        let dir = scratch_dir("json");
        let path = dir.join("run.json");
        let series = simulate(&RESET_DEFAULTS, DEFAULT_STEPS);
        let record = RunRecord::new(Local::now(), RESET_DEFAULTS, &series);

        export_run_json(&path, &record).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["params"]["fishing"], 30);
        assert_eq!(value["steps"], 50);
        assert_eq!(value["diagnostics"]["capacity"], 104);
        assert_eq!(value["diagnostics"]["final_predators"], 536);
        assert_eq!(value["series"]["prey"].as_array().unwrap().len(), 51);
        assert!(value["run_id"].as_str().unwrap().starts_with("run_"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn presets_save_and_load() {
        let dir = scratch_dir("presets");
        let params = SimulationParams {
            resource: 35,
            fishing: 70,
            pollution: 120,
        };
        let path = save_preset(&dir, "overfished", &params).unwrap();
        assert!(path.ends_with("overfished.json"));
        assert_eq!(load_preset(&dir, "overfished").unwrap(), params);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn preset_names_cannot_escape_directory() {
        let dir = scratch_dir("bad-presets");
        assert!(save_preset(&dir, "../evil", &RESET_DEFAULTS).is_err());
        assert!(save_preset(&dir, "  ", &RESET_DEFAULTS).is_err());
        assert!(load_preset(&dir, "missing").is_err());
    }

    #[test]
    fn run_dir_is_grouped_by_date() {
        let now = Local::now();
        let dir = run_dir(Path::new(RUNS_DIR), now);
        assert_eq!(dir, Path::new("runs").join(now.format("%Y-%m-%d").to_string()));
        assert!(run_id(now).starts_with("run_"));
    }

    #[test]
    fn record_run_tracks_previous_diagnostics() {
        let mut lab = LabState::default();
        lab.record_run(&RESET_DEFAULTS, &simulate(&RESET_DEFAULTS, DEFAULT_STEPS));
        lab.record_run(&RESET_DEFAULTS, &simulate(&RESET_DEFAULTS, 10));
        assert_eq!(lab.run_count, 2);
        assert_eq!(lab.last_diag.as_ref().map(|d| d.steps), Some(10));
        assert_eq!(lab.events.len(), 2);
        assert_eq!(lab.events[0].event_type, "RUN");
    }

    #[test]
    fn status_message_is_readable_right_away() {
        let mut lab = LabState::default();
        assert!(lab.current_status().is_none());
        lab.set_status("Preset saved".to_string());
        assert_eq!(lab.current_status(), Some("Preset saved"));
    }
}
