// ============================================================================
// chart.rs — Reef Lab
// egui_plot line chart standing in for the page's chart widget.
// ============================================================================

use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoints};

use crate::page::{ChartSurface, SeriesKind};

struct ChartSeries {
    kind: SeriesKind,
    color: egui::Color32,
    dashed: bool,
    staged: Vec<f64>,
    shown: Vec<f64>,
}

impl ChartSeries {
    fn new(kind: SeriesKind, color: egui::Color32, dashed: bool) -> Self {
        Self {
            kind,
            color,
            dashed,
            staged: Vec::new(),
            shown: Vec::new(),
        }
    }
}

/// Three-series population chart. Data set through [`ChartSurface`] is only
/// drawn after `update`.
pub struct PopulationChart {
    series: [ChartSeries; 3],
    redraws: u64,
}

impl Default for PopulationChart {
    fn default() -> Self {
        Self {
            series: [
                ChartSeries::new(SeriesKind::Prey, egui::Color32::from_rgb(0x0e, 0xa5, 0xa4), false),
                ChartSeries::new(SeriesKind::Predators, egui::Color32::from_rgb(0x0b, 0x72, 0x85), false),
                ChartSeries::new(SeriesKind::Capacity, egui::Color32::from_rgb(0x6b, 0x72, 0x80), true),
            ],
            redraws: 0,
        }
    }
}

impl PopulationChart {
    /// Values currently on screen for `kind`.
    pub fn shown(&self, kind: SeriesKind) -> &[f64] {
        &self.series[kind.index()].shown
    }

    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    pub fn show(&self, ui: &mut egui::Ui, height: f32) {
        Plot::new("population_chart")
            .height(height)
            .legend(Legend::default())
            .include_x(0.0)
            .include_y(0.0)
            .show_grid(true)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .show(ui, |plot_ui| {
                for series in &self.series {
                    let points: PlotPoints = series
                        .shown
                        .iter()
                        .enumerate()
                        .map(|(step, &v)| [step as f64, v])
                        .collect();
                    let mut line = Line::new(points)
                        .name(series.kind.label())
                        .color(series.color)
                        .width(2.0);
                    if series.dashed {
                        line = line.style(LineStyle::Dashed { length: 6.0 });
                    }
                    plot_ui.line(line);
                }
            });
    }
}

impl ChartSurface for PopulationChart {
    fn set_series(&mut self, kind: SeriesKind, values: &[u32]) {
        self.series[kind.index()].staged = values.iter().map(|&v| v as f64).collect();
    }

    fn update(&mut self) {
        for series in &mut self.series {
            series.shown.clone_from(&series.staged);
        }
        self.redraws += 1;
    }
}
