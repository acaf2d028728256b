// ============================================================================
// config.rs — Reef Lab
// Simulation parameters, slider ranges, and the two sets of default values.
// ============================================================================

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Number of update steps in one simulation run.
pub const DEFAULT_STEPS: usize = 50;

pub const RESOURCE_RANGE: RangeInclusive<i32> = 0..=100;
pub const FISHING_RANGE: RangeInclusive<i32> = 0..=100;
pub const POLLUTION_RANGE: RangeInclusive<i32> = 0..=200;

/// Values the sliders carry when the page first loads.
pub const CONTROL_DEFAULTS: SimulationParams = SimulationParams {
    resource: 80,
    fishing: 30,
    pollution: 40,
};

/// Values the Reset button writes back into the sliders. Kept independent of
/// [`CONTROL_DEFAULTS`] even though they currently agree.
pub const RESET_DEFAULTS: SimulationParams = SimulationParams {
    resource: 80,
    fishing: 30,
    pollution: 40,
};

/// The three user-adjustable inputs of the population model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Resource abundance, 0–100.
    pub resource: i32,
    /// Fishing pressure.
    pub fishing: i32,
    /// Pollution level, 0–300 conceptually.
    pub pollution: i32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        CONTROL_DEFAULTS
    }
}

impl SimulationParams {
    /// Overrides individual fields, leaving the rest untouched.
    pub fn with_overrides(
        self,
        resource: Option<i32>,
        fishing: Option<i32>,
        pollution: Option<i32>,
    ) -> Self {
        Self {
            resource: resource.unwrap_or(self.resource),
            fishing: fishing.unwrap_or(self.fishing),
            pollution: pollution.unwrap_or(self.pollution),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_defaults_match_documented_values() {
        assert_eq!(RESET_DEFAULTS.resource, 80);
        assert_eq!(RESET_DEFAULTS.fishing, 30);
        assert_eq!(RESET_DEFAULTS.pollution, 40);
    }

    #[test]
    fn control_defaults_sit_inside_slider_ranges() {
        let p = SimulationParams::default();
        assert!(RESOURCE_RANGE.contains(&p.resource));
        assert!(FISHING_RANGE.contains(&p.fishing));
        assert!(POLLUTION_RANGE.contains(&p.pollution));
    }

    #[test]
    fn overrides_replace_only_given_fields() {
        let p = RESET_DEFAULTS.with_overrides(None, Some(55), None);
        assert_eq!(
            p,
            SimulationParams {
                resource: 80,
                fishing: 55,
                pollution: 40
            }
        );
    }

    #[test]
    fn params_roundtrip_through_json() {
        let json = serde_json::to_string(&RESET_DEFAULTS).unwrap();
        assert_eq!(json, r#"{"resource":80,"fishing":30,"pollution":40}"#);
        let back: SimulationParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RESET_DEFAULTS);
    }
}
