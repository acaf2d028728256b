// ============================================================================
// metrics.rs — Reef Lab
// Run diagnostics: peaks, means and prey collapse for one population series.
// ============================================================================

use serde::Serialize;

use crate::model::PopulationSeries;

/// Summary of one completed run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunDiagnostics {
    pub steps: usize,
    pub capacity: u32,

    pub final_prey: u32,
    pub final_predators: u32,

    pub peak_prey: u32,
    pub peak_prey_step: usize,
    pub peak_predators: u32,
    pub peak_predators_step: usize,

    pub mean_prey: f64,
    pub mean_predators: f64,

    /// First step at which the prey population reached zero.
    pub prey_collapse_step: Option<usize>,
}

impl RunDiagnostics {
    pub fn from_series(series: &PopulationSeries) -> Self {
        let (peak_prey_step, peak_prey) = peak(&series.prey);
        let (peak_predators_step, peak_predators) = peak(&series.predators);

        RunDiagnostics {
            steps: series.len().saturating_sub(1),
            capacity: series.carrying_capacity(),
            final_prey: series.final_prey(),
            final_predators: series.final_predators(),
            peak_prey,
            peak_prey_step,
            peak_predators,
            peak_predators_step,
            mean_prey: mean(&series.prey),
            mean_predators: mean(&series.predators),
            prey_collapse_step: series.prey.iter().position(|&p| p == 0),
        }
    }

    /// Log at INFO level, with deltas against the previous run if any.
    pub fn log(&self, run: u32, prev: Option<&RunDiagnostics>) {
        log::info!("══════════════ Run {} Diagnostics ══════════════", run);

        if let Some(p) = prev {
            log::info!(
                "TRENDS: ΔK={:+} | Δprey_final={:+} | Δsharks_final={:+} | Δprey_mean={:+.1}",
                self.capacity as i64 - p.capacity as i64,
                self.final_prey as i64 - p.final_prey as i64,
                self.final_predators as i64 - p.final_predators as i64,
                self.mean_prey - p.mean_prey,
            );
        }

        log::info!(
            "CAPACITY: K={} over {} steps",
            self.capacity,
            self.steps
        );
        log::info!(
            "PARROTFISH: final={} | peak={} @{} | mean={:.1}",
            self.final_prey,
            self.peak_prey,
            self.peak_prey_step,
            self.mean_prey,
        );
        log::info!(
            "LEMON SHARKS: final={} | peak={} @{} | mean={:.1}",
            self.final_predators,
            self.peak_predators,
            self.peak_predators_step,
            self.mean_predators,
        );
        match self.prey_collapse_step {
            Some(step) => log::info!("COLLAPSE: parrotfish extinct from step {}", step),
            None => log::info!("COLLAPSE: none"),
        }
    }
}

/// First index holding the maximum value.
fn peak(values: &[u32]) -> (usize, u32) {
    values
        .iter()
        .copied()
        .enumerate()
        .fold((0, 0), |best, (i, v)| if v > best.1 { (i, v) } else { best })
}

fn mean(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}
