// ============================================================================
// simulator.rs — Reef Lab
// Page component around the population model: reads the sliders, runs the
// model, feeds the chart and the summary readouts.
// ============================================================================

use crate::config::{SimulationParams, DEFAULT_STEPS, RESET_DEFAULTS};
use crate::model::{carrying_capacity, simulate, PopulationSeries};
use crate::page::{ChartSurface, ControlSurface, ElementId, SeriesKind, SLIDER_READOUTS};

/// Elements without which the simulator cannot work at all.
const REQUIRED: [ElementId; 4] = [
    ElementId::PopulationChart,
    ElementId::Resource,
    ElementId::Fishing,
    ElementId::Pollution,
];

pub struct PopulationSimulator<C: ChartSurface> {
    chart: C,
    steps: usize,
    last_params: Option<SimulationParams>,
    last_run: Option<PopulationSeries>,
}

impl<C: ChartSurface> PopulationSimulator<C> {
    /// Wires the simulator to `page` and performs the initial run with
    /// whatever values the sliders currently hold.
    pub fn init<S: ControlSurface>(page: &mut S, chart: C) -> Option<Self> {
        Self::with_steps(page, chart, DEFAULT_STEPS)
    }

    pub fn with_steps<S: ControlSurface>(page: &mut S, chart: C, steps: usize) -> Option<Self> {
        if let Some(missing) = REQUIRED.iter().find(|id| !page.has_element(**id)) {
            log::debug!("Population simulator disabled: #{} not found", missing);
            return None;
        }

        let mut sim = Self {
            chart,
            steps,
            last_params: None,
            last_run: None,
        };
        sim.update_labels(page);
        sim.run(page);
        Some(sim)
    }

    pub fn chart(&self) -> &C {
        &self.chart
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn last_run(&self) -> Option<&PopulationSeries> {
        self.last_run.as_ref()
    }

    /// Parameters the last successful run was computed from.
    pub fn last_params(&self) -> Option<SimulationParams> {
        self.last_params
    }

    /// Slider `input` handler: copy each slider's value into its readout.
    pub fn update_labels<S: ControlSurface>(&self, page: &mut S) {
        for (control, readout) in SLIDER_READOUTS {
            if !page.has_element(readout) {
                continue;
            }
            if let Some(value) = page.control_value(control) {
                page.set_text(readout, &value);
            }
        }
    }

    /// Reads the three sliders, parsing each text value as an integer.
    pub fn read_params<S: ControlSurface>(page: &S) -> Option<SimulationParams> {
        Some(SimulationParams {
            resource: read_control(page, ElementId::Resource)?,
            fishing: read_control(page, ElementId::Fishing)?,
            pollution: read_control(page, ElementId::Pollution)?,
        })
    }

    /// Runs one full simulation and publishes it. The chart and readouts only
    /// change once the whole series is computed.
    pub fn run<S: ControlSurface>(&mut self, page: &mut S) -> Option<&PopulationSeries> {
        let params = Self::read_params(page)?;

        let capacity = carrying_capacity(params.resource, params.pollution);
        if page.has_element(ElementId::CapacityValue) {
            page.set_text(ElementId::CapacityValue, &capacity.to_string());
        }

        let series = simulate(&params, self.steps);

        self.chart.set_series(SeriesKind::Prey, &series.prey);
        self.chart.set_series(SeriesKind::Predators, &series.predators);
        self.chart.set_series(SeriesKind::Capacity, &series.capacity);
        self.chart.update();

        if page.has_element(ElementId::PreyCount) {
            page.set_text(ElementId::PreyCount, &series.final_prey().to_string());
        }
        if page.has_element(ElementId::PredatorCount) {
            page.set_text(ElementId::PredatorCount, &series.final_predators().to_string());
        }

        log::debug!(
            "Run: resource={} fishing={} pollution={} K={} -> prey={} sharks={}",
            params.resource,
            params.fishing,
            params.pollution,
            capacity,
            series.final_prey(),
            series.final_predators(),
        );

        self.last_params = Some(params);
        self.last_run = Some(series);
        self.last_run.as_ref()
    }

    /// Reset button: restore the fixed defaults, refresh readouts, rerun.
    pub fn reset<S: ControlSurface>(&mut self, page: &mut S) -> Option<&PopulationSeries> {
        self.apply_params(page, &RESET_DEFAULTS)
    }

    /// Writes `params` into the sliders, then behaves like a reset.
    pub fn apply_params<S: ControlSurface>(
        &mut self,
        page: &mut S,
        params: &SimulationParams,
    ) -> Option<&PopulationSeries> {
        page.set_control_value(ElementId::Resource, params.resource);
        page.set_control_value(ElementId::Fishing, params.fishing);
        page.set_control_value(ElementId::Pollution, params.pollution);
        self.update_labels(page);
        self.run(page)
    }
}

fn read_control<S: ControlSurface>(page: &S, id: ElementId) -> Option<i32> {
    let raw = page.control_value(id)?;
    match raw.trim().parse::<i32>() {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring run: #{} has non-integer value {:?} ({})", id, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;
    use crate::page::ElementLookup;

    #[derive(Default)]
    struct FakeControls {
        present: HashSet<ElementId>,
        values: HashMap<ElementId, String>,
        texts: HashMap<ElementId, String>,
    }

    impl FakeControls {
        fn full_page() -> Self {
            let mut page = Self::default();
            page.present.extend([
                ElementId::PopulationChart,
                ElementId::Resource,
                ElementId::Fishing,
                ElementId::Pollution,
                ElementId::ResourceValue,
                ElementId::FishingValue,
                ElementId::PollutionValue,
                ElementId::PreyCount,
                ElementId::PredatorCount,
                ElementId::CapacityValue,
            ]);
            page.set_sliders("80", "30", "40");
            page
        }

        fn set_sliders(&mut self, resource: &str, fishing: &str, pollution: &str) {
            self.values.insert(ElementId::Resource, resource.to_string());
            self.values.insert(ElementId::Fishing, fishing.to_string());
            self.values.insert(ElementId::Pollution, pollution.to_string());
        }

        fn text(&self, id: ElementId) -> Option<&str> {
            self.texts.get(&id).map(String::as_str)
        }
    }

    impl ElementLookup for FakeControls {
        fn has_element(&self, id: ElementId) -> bool {
            self.present.contains(&id)
        }
    }

    impl ControlSurface for FakeControls {
        fn control_value(&self, id: ElementId) -> Option<String> {
            self.values.get(&id).cloned()
        }

        fn set_control_value(&mut self, id: ElementId, value: i32) {
            self.values.insert(id, value.to_string());
        }

        fn set_text(&mut self, id: ElementId, text: &str) {
            assert!(self.present.contains(&id), "write to absent #{}", id);
            self.texts.insert(id, text.to_string());
        }
    }

    #[derive(Default)]
    struct FakeChart {
        staged: HashMap<SeriesKind, Vec<u32>>,
        shown: HashMap<SeriesKind, Vec<u32>>,
        updates: usize,
    }

    impl ChartSurface for FakeChart {
        fn set_series(&mut self, kind: SeriesKind, values: &[u32]) {
            self.staged.insert(kind, values.to_vec());
        }

        fn update(&mut self) {
            self.shown = self.staged.clone();
            self.updates += 1;
        }
    }

    #[test]
    fn init_runs_once_with_current_sliders() {
        let mut page = FakeControls::full_page();
        let sim = PopulationSimulator::init(&mut page, FakeChart::default()).unwrap();

        assert_eq!(sim.chart().updates, 1);
        assert_eq!(page.text(ElementId::CapacityValue), Some("104"));
        assert_eq!(page.text(ElementId::PreyCount), Some("0"));
        assert_eq!(page.text(ElementId::PredatorCount), Some("536"));
        assert_eq!(page.text(ElementId::ResourceValue), Some("80"));
        assert_eq!(page.text(ElementId::PollutionValue), Some("40"));

        let shown = &sim.chart().shown;
        assert_eq!(shown[&SeriesKind::Prey][0], 62);
        assert_eq!(shown[&SeriesKind::Predators][0], 5);
        assert!(shown[&SeriesKind::Capacity].iter().all(|&k| k == 104));
        assert!(shown.values().all(|s| s.len() == DEFAULT_STEPS + 1));
    }

    #[test]
    fn moving_a_slider_only_updates_its_readout() {
        let mut page = FakeControls::full_page();
        let sim = PopulationSimulator::init(&mut page, FakeChart::default()).unwrap();

        page.set_sliders("55", "30", "40");
        sim.update_labels(&mut page);

        assert_eq!(page.text(ElementId::ResourceValue), Some("55"));
        assert_eq!(page.text(ElementId::CapacityValue), Some("104"));
        assert_eq!(sim.chart().updates, 1);
    }

    #[test]
    fn explicit_run_reads_fresh_values() {
        let mut page = FakeControls::full_page();
        let mut sim = PopulationSimulator::init(&mut page, FakeChart::default()).unwrap();

        page.set_sliders("100", "0", "0");
        let series = sim.run(&mut page).unwrap();
        assert_eq!(series.carrying_capacity(), 150);

        assert_eq!(sim.chart().updates, 2);
        assert_eq!(page.text(ElementId::CapacityValue), Some("150"));
        assert_eq!(page.text(ElementId::PredatorCount), Some("2298"));
    }

    #[test]
    fn reset_restores_defaults_and_reruns() {
        let mut page = FakeControls::full_page();
        page.set_sliders("10", "90", "150");
        let mut sim = PopulationSimulator::init(&mut page, FakeChart::default()).unwrap();
        assert_ne!(page.text(ElementId::CapacityValue), Some("104"));

        sim.reset(&mut page);

        assert_eq!(page.control_value(ElementId::Resource).as_deref(), Some("80"));
        assert_eq!(page.control_value(ElementId::Fishing).as_deref(), Some("30"));
        assert_eq!(page.control_value(ElementId::Pollution).as_deref(), Some("40"));
        assert_eq!(page.text(ElementId::FishingValue), Some("30"));
        assert_eq!(page.text(ElementId::CapacityValue), Some("104"));
        assert_eq!(sim.last_run(), Some(&simulate(&RESET_DEFAULTS, DEFAULT_STEPS)));
        assert_eq!(sim.last_params(), Some(RESET_DEFAULTS));
        assert_eq!(sim.chart().updates, 2);
    }

    #[test]
    fn repeated_runs_replace_previous_series() {
        let mut page = FakeControls::full_page();
        let mut sim =
            PopulationSimulator::with_steps(&mut page, FakeChart::default(), 10).unwrap();
        let first = sim.last_run().cloned().unwrap();
        let second = sim.run(&mut page).cloned().unwrap();
        assert_eq!(first, second);
        assert_eq!(sim.chart().shown[&SeriesKind::Prey].len(), 11);
    }

    #[test]
    fn missing_chart_surface_disables_simulator() {
        let mut page = FakeControls::full_page();
        page.present.remove(&ElementId::PopulationChart);
        assert!(PopulationSimulator::init(&mut page, FakeChart::default()).is_none());
        assert!(page.texts.is_empty());
    }

    #[test]
    fn missing_slider_disables_simulator() {
        let mut page = FakeControls::full_page();
        page.present.remove(&ElementId::Fishing);
        assert!(PopulationSimulator::init(&mut page, FakeChart::default()).is_none());
        assert!(page.texts.is_empty());
    }

    #[test]
    fn optional_readouts_may_be_absent() {
        let mut page = FakeControls::full_page();
        for id in [
            ElementId::ResourceValue,
            ElementId::PreyCount,
            ElementId::CapacityValue,
        ] {
            page.present.remove(&id);
        }
        let sim = PopulationSimulator::init(&mut page, FakeChart::default()).unwrap();
        assert_eq!(sim.chart().updates, 1);
        assert_eq!(page.text(ElementId::PredatorCount), Some("536"));
        assert_eq!(page.text(ElementId::FishingValue), Some("30"));
        assert_eq!(page.text(ElementId::PreyCount), None);
    }

    #[test]
    fn unparseable_slider_skips_the_run() {
        let mut page = FakeControls::full_page();
        let mut sim = PopulationSimulator::init(&mut page, FakeChart::default()).unwrap();

        page.set_sliders("80", "thirty", "40");
        assert!(sim.run(&mut page).is_none());
        assert_eq!(sim.chart().updates, 1);
        assert_eq!(page.text(ElementId::PredatorCount), Some("536"));
    }

    #[test]
    fn slider_text_is_trimmed_before_parsing() {
        let mut page = FakeControls::full_page();
        page.set_sliders(" 80 ", "30\n", "40");
        let params = PopulationSimulator::<FakeChart>::read_params(&page).unwrap();
        assert_eq!(params, RESET_DEFAULTS);
    }
}
