// ============================================================================
// model.rs — Reef Lab
// Discrete-time parrotfish (prey) / lemon shark (predator) model bounded by a
// resource- and pollution-derived carrying capacity, with harvesting.
// ============================================================================

use serde::Serialize;

use crate::config::SimulationParams;

// ======================== Model Constants ========================

/// Capacity at full resources and zero pollution.
pub const BASE_CAPACITY: f64 = 150.0;
/// Capacity never drops below this, so runs never degenerate to K = 0.
pub const MIN_CAPACITY: u32 = 10;
/// Pollution level at which the capacity factor reaches zero.
pub const POLLUTION_CEILING: f64 = 300.0;

pub const INITIAL_PREY_FRACTION: f64 = 0.6;
pub const PREY_PER_PREDATOR: f64 = 12.0;
pub const MIN_INITIAL_PREDATORS: u32 = 5;

pub const PREY_GROWTH_SCALE: f64 = 0.45;
pub const PREDATOR_GROWTH_RATE: f64 = 0.18;
pub const PREDATION_RATE: f64 = 0.03;
pub const PREY_HARVEST_DIVISOR: f64 = 600.0;
pub const PREDATOR_HARVEST_DIVISOR: f64 = 900.0;
/// Prey abundance that gives predators a prey factor of 1.
pub const PREY_FACTOR_DIVISOR: f64 = 80.0;

// ======================== Capacity & Initial Conditions ========================

/// K = max(10, round(150 · resource/100 · (1 − pollution/300)))
pub fn carrying_capacity(resource: i32, pollution: i32) -> u32 {
    let raw = BASE_CAPACITY * (resource as f64 / 100.0) * (1.0 - pollution as f64 / POLLUTION_CEILING);
    clamp_count(raw.round()).max(MIN_CAPACITY)
}

/// Prey intrinsic growth rate, which scales with resource abundance.
pub fn prey_growth_rate(resource: i32) -> f64 {
    PREY_GROWTH_SCALE * (resource as f64 / 100.0 + 0.5)
}

/// Saturating conversion of an already-rounded value into a count.
fn clamp_count(value: f64) -> u32 {
    // `as` saturates: NaN and negatives become 0, overflow becomes u32::MAX.
    value.max(0.0) as u32
}

// ======================== Population State ========================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PopulationState {
    pub prey: u32,
    pub predators: u32,
}

/// Per-run constants of the update rule. Built once from the parameters and
/// immutable for the duration of the run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ecosystem {
    capacity: u32,
    prey_growth: f64,
    fishing: f64,
}

impl Ecosystem {
    pub fn new(params: &SimulationParams) -> Self {
        Self {
            capacity: carrying_capacity(params.resource, params.pollution),
            prey_growth: prey_growth_rate(params.resource),
            fishing: params.fishing as f64,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// P0 = round(0.6 · K), S0 = max(5, round(P0 / 12))
    pub fn initial_state(&self) -> PopulationState {
        let prey = clamp_count((self.capacity as f64 * INITIAL_PREY_FRACTION).round());
        let predators =
            clamp_count((prey as f64 / PREY_PER_PREDATOR).round()).max(MIN_INITIAL_PREDATORS);
        PopulationState { prey, predators }
    }

    /// One simultaneous update: both next values come from the same
    /// pre-update snapshot. Every term is rounded before it is combined.
    pub fn advance(&self, state: PopulationState) -> PopulationState {
        let p = state.prey as f64;
        let s = state.predators as f64;
        let k = self.capacity as f64;

        let harvest_prey = (p * (self.fishing / PREY_HARVEST_DIVISOR)).round();
        let predation = (PREDATION_RATE * s).round();
        let next_prey =
            (p + self.prey_growth * p * (1.0 - p / k) - harvest_prey - predation).round();

        let harvest_predators = (s * (self.fishing / PREDATOR_HARVEST_DIVISOR)).round();
        let prey_factor = (p / PREY_FACTOR_DIVISOR).max(0.0);
        let next_predators =
            (s + PREDATOR_GROWTH_RATE * s * prey_factor - harvest_predators).round();

        PopulationState {
            prey: clamp_count(next_prey),
            predators: clamp_count(next_predators),
        }
    }
}

// ======================== Series ========================

/// Three aligned series of `steps + 1` entries; index 0 is the initial state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PopulationSeries {
    pub prey: Vec<u32>,
    pub predators: Vec<u32>,
    pub capacity: Vec<u32>,
}

impl PopulationSeries {
    pub fn len(&self) -> usize {
        self.prey.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prey.is_empty()
    }

    pub fn final_prey(&self) -> u32 {
        self.prey.last().copied().unwrap_or(0)
    }

    pub fn final_predators(&self) -> u32 {
        self.predators.last().copied().unwrap_or(0)
    }

    pub fn carrying_capacity(&self) -> u32 {
        self.capacity.first().copied().unwrap_or(0)
    }

    /// Iterates `(step, prey, predators, capacity)` rows.
    pub fn rows(&self) -> impl Iterator<Item = (usize, u32, u32, u32)> + '_ {
        self.prey
            .iter()
            .zip(&self.predators)
            .zip(&self.capacity)
            .enumerate()
            .map(|(step, ((&p, &s), &k))| (step, p, s, k))
    }
}

/// Runs the model for `steps` updates and records every state, starting with
/// the initial condition.
pub fn simulate(params: &SimulationParams, steps: usize) -> PopulationSeries {
    let eco = Ecosystem::new(params);
    let capacity = eco.capacity();

    let mut series = PopulationSeries {
        prey: Vec::with_capacity(steps + 1),
        predators: Vec::with_capacity(steps + 1),
        capacity: vec![capacity; steps + 1],
    };

    let mut state = eco.initial_state();
    series.prey.push(state.prey);
    series.predators.push(state.predators);
    for _ in 0..steps {
        state = eco.advance(state);
        series.prey.push(state.prey);
        series.predators.push(state.predators);
    }
    series
}
