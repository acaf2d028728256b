// ============================================================================
// lab_page.rs — Reef Lab
// In-window element store backing the page components: slider values,
// readouts, nav state, and the carbon-cycle paths with their stroke styles.
// Emulates the small part of a browser's rendering engine the stroke
// animation relies on (linear dash-offset transitions).
// ============================================================================

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::time::Duration;

use crate::config::{SimulationParams, FISHING_RANGE, POLLUTION_RANGE, RESOURCE_RANGE};
use crate::page::{
    ControlSurface, ElementId, ElementLookup, MenuSurface, NavDisplay, StrokeSurface,
    StrokeTransition, CARBON_PATHS,
};

/// Coordinate space of the carbon-cycle diagram.
pub const VIEW_BOX: [f32; 2] = [400.0, 220.0];

// ======================== Range Inputs ========================

#[derive(Clone, Debug)]
pub struct RangeInput {
    pub value: i32,
    pub range: RangeInclusive<i32>,
}

impl RangeInput {
    fn new(value: i32, range: RangeInclusive<i32>) -> Self {
        Self {
            value: value.clamp(*range.start(), *range.end()),
            range,
        }
    }
}

// ======================== Stroke Styles ========================

/// A dash-offset tween started by the host when a transition is configured.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Tween {
    from: f32,
    to: f32,
    start: Duration,
    duration: Duration,
}

impl Tween {
    fn value_at(&self, now: Duration) -> f32 {
        if now <= self.start {
            return self.from;
        }
        let elapsed = now - self.start;
        if elapsed >= self.duration || self.duration.is_zero() {
            return self.to;
        }
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from + (self.to - self.from) * t
    }
}

/// Inline stroke overrides of one path.
#[derive(Clone, Debug, Default)]
pub struct StrokeStyle {
    pub transition: Option<StrokeTransition>,
    pub dasharray: Option<f32>,
    pub dashoffset: Option<f32>,
    tween: Option<Tween>,
}

impl StrokeStyle {
    /// Dash offset as currently rendered, taking a running tween into account.
    pub fn effective_offset(&self, now: Duration) -> Option<f32> {
        let target = self.dashoffset?;
        Some(self.tween.map_or(target, |t| t.value_at(now)))
    }

    fn has_overrides(&self) -> bool {
        self.dasharray.is_some() || self.dashoffset.is_some()
    }
}

/// One drawable path of the diagram.
#[derive(Clone, Debug)]
pub struct CarbonPath {
    pub id: ElementId,
    pub label: &'static str,
    pub points: Vec<[f32; 2]>,
    pub style: StrokeStyle,
}

impl CarbonPath {
    fn new(id: ElementId, label: &'static str, points: Vec<[f32; 2]>) -> Self {
        Self {
            id,
            label,
            points,
            style: StrokeStyle::default(),
        }
    }

    pub fn length(&self) -> f32 {
        polyline_length(&self.points)
    }

    /// Fraction of the path currently drawn, from its start.
    pub fn visible_fraction(&self, now: Duration) -> f32 {
        let length = self.length();
        match (self.style.dasharray, self.style.effective_offset(now)) {
            (Some(dash), offset) if length > 0.0 => {
                let offset = offset.unwrap_or(0.0);
                ((dash - offset) / length).clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }
}

fn default_paths() -> Vec<CarbonPath> {
    vec![
        CarbonPath::new(
            ElementId::CarbonPath1,
            "Atmosphere → Ocean",
            vec![[60.0, 40.0], [60.0, 120.0], [90.0, 170.0]],
        ),
        CarbonPath::new(
            ElementId::CarbonPath2,
            "Ocean → Seagrass",
            vec![[110.0, 180.0], [200.0, 180.0]],
        ),
        CarbonPath::new(
            ElementId::CarbonPath3,
            "Seagrass → Sediment",
            vec![[220.0, 170.0], [260.0, 120.0], [300.0, 120.0]],
        ),
        CarbonPath::new(
            ElementId::CarbonPath4,
            "Sediment → Atmosphere",
            vec![[320.0, 110.0], [340.0, 60.0], [300.0, 30.0], [90.0, 30.0]],
        ),
    ]
}

pub fn polyline_length(points: &[[f32; 2]]) -> f32 {
    points
        .windows(2)
        .map(|w| ((w[1][0] - w[0][0]).powi(2) + (w[1][1] - w[0][1]).powi(2)).sqrt())
        .sum()
}

/// Leading part of a polyline covering `fraction` of its total length.
pub fn partial_polyline(points: &[[f32; 2]], fraction: f32) -> Vec<[f32; 2]> {
    if points.len() < 2 || fraction >= 1.0 {
        return points.to_vec();
    }
    if fraction <= 0.0 {
        return Vec::new();
    }

    let mut remaining = polyline_length(points) * fraction;
    let mut out = vec![points[0]];
    for w in points.windows(2) {
        let seg = ((w[1][0] - w[0][0]).powi(2) + (w[1][1] - w[0][1]).powi(2)).sqrt();
        if seg >= remaining {
            let t = if seg > 0.0 { remaining / seg } else { 0.0 };
            out.push([
                w[0][0] + (w[1][0] - w[0][0]) * t,
                w[0][1] + (w[1][1] - w[0][1]) * t,
            ]);
            break;
        }
        remaining -= seg;
        out.push(w[1]);
    }
    out
}

// ======================== Lab Page ========================

/// Host-side page for the native window.
pub struct LabPage {
    clock: Duration,
    nav_display: NavDisplay,
    aria_expanded: bool,
    sliders: BTreeMap<ElementId, RangeInput>,
    texts: BTreeMap<ElementId, String>,
    paths: Vec<CarbonPath>,
}

impl LabPage {
    pub fn new(initial: &SimulationParams) -> Self {
        let mut sliders = BTreeMap::new();
        sliders.insert(ElementId::Resource, RangeInput::new(initial.resource, RESOURCE_RANGE));
        sliders.insert(ElementId::Fishing, RangeInput::new(initial.fishing, FISHING_RANGE));
        sliders.insert(ElementId::Pollution, RangeInput::new(initial.pollution, POLLUTION_RANGE));

        let texts = [
            ElementId::ResourceValue,
            ElementId::FishingValue,
            ElementId::PollutionValue,
            ElementId::PreyCount,
            ElementId::PredatorCount,
            ElementId::CapacityValue,
        ]
        .into_iter()
        .map(|id| (id, String::new()))
        .collect();

        Self {
            clock: Duration::ZERO,
            nav_display: NavDisplay::None,
            aria_expanded: false,
            sliders,
            texts,
            paths: default_paths(),
        }
    }

    /// Advances the page clock used to start and sample transitions.
    pub fn set_clock(&mut self, now: Duration) {
        self.clock = now;
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn nav_display(&self) -> NavDisplay {
        self.nav_display
    }

    pub fn aria_expanded(&self) -> bool {
        self.aria_expanded
    }

    pub fn slider_mut(&mut self, id: ElementId) -> Option<&mut RangeInput> {
        self.sliders.get_mut(&id)
    }

    pub fn text(&self, id: ElementId) -> &str {
        self.texts.get(&id).map_or("", String::as_str)
    }

    pub fn paths(&self) -> &[CarbonPath] {
        &self.paths
    }

    /// True while any path still carries inline dash overrides.
    pub fn is_animating(&self) -> bool {
        self.paths.iter().any(|p| p.style.has_overrides())
    }

    fn path_mut(&mut self, id: ElementId) -> Option<&mut CarbonPath> {
        self.paths.iter_mut().find(|p| p.id == id)
    }
}

impl ElementLookup for LabPage {
    fn has_element(&self, id: ElementId) -> bool {
        if CARBON_PATHS.contains(&id) {
            return self.paths.iter().any(|p| p.id == id);
        }
        match id {
            ElementId::Resource | ElementId::Fishing | ElementId::Pollution => {
                self.sliders.contains_key(&id)
            }
            ElementId::ResourceValue
            | ElementId::FishingValue
            | ElementId::PollutionValue
            | ElementId::PreyCount
            | ElementId::PredatorCount
            | ElementId::CapacityValue => self.texts.contains_key(&id),
            _ => true,
        }
    }
}

impl MenuSurface for LabPage {
    fn set_nav_display(&mut self, display: NavDisplay) {
        self.nav_display = display;
    }

    fn set_aria_expanded(&mut self, expanded: bool) {
        self.aria_expanded = expanded;
    }
}

impl ControlSurface for LabPage {
    fn control_value(&self, id: ElementId) -> Option<String> {
        self.sliders.get(&id).map(|s| s.value.to_string())
    }

    fn set_control_value(&mut self, id: ElementId, value: i32) {
        if let Some(slider) = self.sliders.get_mut(&id) {
            // Range inputs clamp assigned values to their bounds.
            slider.value = value.clamp(*slider.range.start(), *slider.range.end());
        }
    }

    fn set_text(&mut self, id: ElementId, text: &str) {
        if let Some(slot) = self.texts.get_mut(&id) {
            slot.clear();
            slot.push_str(text);
        }
    }
}

impl StrokeSurface for LabPage {
    fn total_length(&self, id: ElementId) -> Option<f32> {
        self.paths.iter().find(|p| p.id == id).map(CarbonPath::length)
    }

    fn set_stroke_transition(&mut self, id: ElementId, transition: StrokeTransition) {
        if let Some(path) = self.path_mut(id) {
            path.style.transition = Some(transition);
        }
    }

    fn set_stroke_dasharray(&mut self, id: ElementId, value: Option<f32>) {
        if let Some(path) = self.path_mut(id) {
            path.style.dasharray = value;
        }
    }

    fn set_stroke_dashoffset(&mut self, id: ElementId, value: Option<f32>) {
        let now = self.clock;
        let Some(path) = self.path_mut(id) else {
            return;
        };
        let style = &mut path.style;

        let Some(target) = value else {
            style.dashoffset = None;
            style.tween = None;
            return;
        };

        // Only a change away from an existing override is transitioned.
        style.tween = match (style.transition, style.effective_offset(now)) {
            (Some(transition), Some(current)) if current != target => Some(Tween {
                from: current,
                to: target,
                start: now + transition.delay,
                duration: transition.duration,
            }),
            _ => None,
        };
        style.dashoffset = Some(target);
    }
}
