// ============================================================================
// page.rs — Reef Lab
// Element identifiers and the capability traits the three page components use
// to reach their host. The desktop host and the test doubles implement these.
// ============================================================================

use std::fmt;
use std::time::Duration;

// ======================== Element Identifiers ========================

/// Every element the widget looks up on its host page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementId {
    NavToggle,
    MainNav,
    PopulationChart,
    Resource,
    Fishing,
    Pollution,
    ResourceValue,
    FishingValue,
    PollutionValue,
    PreyCount,
    PredatorCount,
    CapacityValue,
    RunButton,
    ResetButton,
    AnimateCarbon,
    CarbonPath1,
    CarbonPath2,
    CarbonPath3,
    CarbonPath4,
}

/// The drawable paths, in the order the animator staggers them.
pub const CARBON_PATHS: [ElementId; 4] = [
    ElementId::CarbonPath1,
    ElementId::CarbonPath2,
    ElementId::CarbonPath3,
    ElementId::CarbonPath4,
];

/// Slider controls paired with their numeric readouts.
pub const SLIDER_READOUTS: [(ElementId, ElementId); 3] = [
    (ElementId::Resource, ElementId::ResourceValue),
    (ElementId::Fishing, ElementId::FishingValue),
    (ElementId::Pollution, ElementId::PollutionValue),
];

impl ElementId {
    /// The markup `id` attribute of the element.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementId::NavToggle => "navToggle",
            ElementId::MainNav => "mainNav",
            ElementId::PopulationChart => "populationChart",
            ElementId::Resource => "resource",
            ElementId::Fishing => "fishing",
            ElementId::Pollution => "pollution",
            ElementId::ResourceValue => "resVal",
            ElementId::FishingValue => "fishVal",
            ElementId::PollutionValue => "pollVal",
            ElementId::PreyCount => "parCount",
            ElementId::PredatorCount => "sharkCount",
            ElementId::CapacityValue => "carryVal",
            ElementId::RunButton => "runBtn",
            ElementId::ResetButton => "resetBtn",
            ElementId::AnimateCarbon => "animateCarbon",
            ElementId::CarbonPath1 => "p1",
            ElementId::CarbonPath2 => "p2",
            ElementId::CarbonPath3 => "p3",
            ElementId::CarbonPath4 => "p4",
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ======================== Style Values ========================

/// Display mode of the navigation panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum NavDisplay {
    #[default]
    None,
    Flex,
}

impl NavDisplay {
    pub fn css_value(self) -> &'static str {
        match self {
            NavDisplay::None => "none",
            NavDisplay::Flex => "flex",
        }
    }

    pub fn is_visible(self) -> bool {
        self == NavDisplay::Flex
    }
}

/// A `stroke-dashoffset` transition with linear easing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrokeTransition {
    pub duration: Duration,
    pub delay: Duration,
}

impl fmt::Display for StrokeTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stroke-dashoffset {}ms linear {}ms",
            self.duration.as_millis(),
            self.delay.as_millis()
        )
    }
}

// ======================== Chart Series ========================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeriesKind {
    Prey,
    Predators,
    Capacity,
}

impl SeriesKind {
    pub const ALL: [SeriesKind; 3] = [SeriesKind::Prey, SeriesKind::Predators, SeriesKind::Capacity];

    pub fn label(self) -> &'static str {
        match self {
            SeriesKind::Prey => "Parrotfish",
            SeriesKind::Predators => "Lemon sharks",
            SeriesKind::Capacity => "Carrying capacity",
        }
    }

    pub fn index(self) -> usize {
        match self {
            SeriesKind::Prey => 0,
            SeriesKind::Predators => 1,
            SeriesKind::Capacity => 2,
        }
    }
}

// ======================== Capability Traits ========================

pub trait ElementLookup {
    fn has_element(&self, id: ElementId) -> bool;
}

/// What the menu controller may touch: the panel's display and the toggle
/// button's `aria-expanded` attribute.
pub trait MenuSurface: ElementLookup {
    fn set_nav_display(&mut self, display: NavDisplay);
    fn set_aria_expanded(&mut self, expanded: bool);
}

/// Range inputs and text readouts. Writes to absent elements are ignored.
pub trait ControlSurface: ElementLookup {
    /// Raw text value of a range input, as the host reports it.
    fn control_value(&self, id: ElementId) -> Option<String>;
    fn set_control_value(&mut self, id: ElementId, value: i32);
    fn set_text(&mut self, id: ElementId, text: &str);
}

/// External line-chart renderer. Series are staged with `set_series` and
/// become visible on `update`.
pub trait ChartSurface {
    fn set_series(&mut self, kind: SeriesKind, values: &[u32]);
    fn update(&mut self);
}

/// Stroke controls of a drawable path.
pub trait StrokeSurface: ElementLookup {
    fn total_length(&self, id: ElementId) -> Option<f32>;
    fn set_stroke_transition(&mut self, id: ElementId, transition: StrokeTransition);
    /// `None` clears the inline override.
    fn set_stroke_dasharray(&mut self, id: ElementId, value: Option<f32>);
    /// `None` clears the inline override.
    fn set_stroke_dashoffset(&mut self, id: ElementId, value: Option<f32>);
}
