// ============================================================================
// animator.rs — Reef Lab
// One-shot "draw the stroke" animation over the four carbon-cycle paths,
// expressed as an explicit timeline of per-path actions.
// ============================================================================

use std::time::Duration;

use crate::page::{ElementId, ElementLookup, StrokeSurface, StrokeTransition, CARBON_PATHS};

/// Length of each path's reveal transition.
pub const STROKE_DURATION: Duration = Duration::from_millis(900);
/// Extra delay per path index.
pub const STROKE_STAGGER: Duration = Duration::from_millis(200);
/// Delay before the first path's overrides are cleared.
pub const CLEANUP_DELAY: Duration = Duration::from_millis(1500);

// ======================== Timeline ========================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeAction {
    /// Drop the dash offset to zero so the transition draws the path.
    Reveal,
    /// Remove the dash array and dash offset overrides.
    ClearOverrides,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Due {
    /// Fires on the first frame after scheduling.
    NextFrame,
    /// Fires once the clock reaches this instant.
    At(Duration),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledAction {
    pub element: ElementId,
    pub due: Due,
    pub action: StrokeAction,
}

impl ScheduledAction {
    fn is_due(&self, now: Duration) -> bool {
        match self.due {
            Due::NextFrame => true,
            Due::At(at) => at <= now,
        }
    }
}

/// Pending actions in scheduling order.
#[derive(Debug, Default)]
pub struct Timeline {
    pending: Vec<ScheduledAction>,
}

impl Timeline {
    pub fn schedule(&mut self, action: ScheduledAction) {
        self.pending.push(action);
    }

    /// Drops every pending action for `element`; returns how many were dropped.
    pub fn cancel(&mut self, element: ElementId) -> usize {
        let before = self.pending.len();
        self.pending.retain(|a| a.element != element);
        before - self.pending.len()
    }

    /// Removes and returns the actions due at `now`, frame-aligned ones first,
    /// then timed ones by due time.
    pub fn take_due(&mut self, now: Duration) -> Vec<ScheduledAction> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|a| a.is_due(now));
        self.pending = rest;
        due.sort_by_key(|a| match a.due {
            Due::NextFrame => (0, Duration::ZERO),
            Due::At(at) => (1, at),
        });
        due
    }

    pub fn pending(&self) -> &[ScheduledAction] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ======================== Animator ========================

/// Handle for the stroke animation; exists only when the trigger button is on
/// the page.
#[derive(Debug, Default)]
pub struct StrokeAnimator {
    timeline: Timeline,
}

impl StrokeAnimator {
    pub fn init<S: ElementLookup>(page: &S) -> Option<Self> {
        if !page.has_element(ElementId::AnimateCarbon) {
            log::debug!("Stroke animator disabled: #{} not found", ElementId::AnimateCarbon);
            return None;
        }
        Some(Self::default())
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn is_idle(&self) -> bool {
        self.timeline.is_empty()
    }

    /// Trigger click at clock time `now`. Each present path is hidden behind a
    /// full-length dash and gets its reveal and cleanup scheduled; absent
    /// paths are skipped.
    pub fn play<S: StrokeSurface>(&mut self, page: &mut S, now: Duration) {
        let mut started = 0;
        for (index, id) in CARBON_PATHS.into_iter().enumerate() {
            if !page.has_element(id) {
                continue;
            }
            let Some(length) = page.total_length(id) else {
                continue;
            };

            let stagger = STROKE_STAGGER * index as u32;
            // A restart supersedes whatever is still pending for this path.
            self.timeline.cancel(id);

            page.set_stroke_transition(
                id,
                StrokeTransition {
                    duration: STROKE_DURATION,
                    delay: stagger,
                },
            );
            page.set_stroke_dasharray(id, Some(length));
            page.set_stroke_dashoffset(id, Some(length));

            self.timeline.schedule(ScheduledAction {
                element: id,
                due: Due::NextFrame,
                action: StrokeAction::Reveal,
            });
            self.timeline.schedule(ScheduledAction {
                element: id,
                due: Due::At(now + CLEANUP_DELAY + stagger),
                action: StrokeAction::ClearOverrides,
            });
            started += 1;
        }
        log::debug!("Stroke animation started on {} path(s)", started);
    }

    /// Frame tick: applies every action due at `now`.
    pub fn advance<S: StrokeSurface>(&mut self, page: &mut S, now: Duration) {
        for scheduled in self.timeline.take_due(now) {
            let id = scheduled.element;
            if !page.has_element(id) {
                continue;
            }
            match scheduled.action {
                StrokeAction::Reveal => page.set_stroke_dashoffset(id, Some(0.0)),
                StrokeAction::ClearOverrides => {
                    page.set_stroke_dasharray(id, None);
                    page.set_stroke_dashoffset(id, None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct PathStyle {
        transition: Option<String>,
        dasharray: Option<f32>,
        dashoffset: Option<f32>,
    }

    struct FakePaths {
        lengths: HashMap<ElementId, f32>,
        styles: HashMap<ElementId, PathStyle>,
    }

    impl FakePaths {
        fn with(ids: &[ElementId]) -> Self {
            let lengths = ids
                .iter()
                .enumerate()
                .map(|(i, id)| (*id, 100.0 + 10.0 * i as f32))
                .collect();
            Self {
                lengths,
                styles: HashMap::new(),
            }
        }

        fn style(&self, id: ElementId) -> PathStyle {
            self.styles.get(&id).cloned().unwrap_or_default()
        }

        fn style_mut(&mut self, id: ElementId) -> &mut PathStyle {
            assert!(self.lengths.contains_key(&id), "style write on absent #{}", id);
            self.styles.entry(id).or_default()
        }
    }

    impl ElementLookup for FakePaths {
        fn has_element(&self, id: ElementId) -> bool {
            id == ElementId::AnimateCarbon || self.lengths.contains_key(&id)
        }
    }

    impl StrokeSurface for FakePaths {
        fn total_length(&self, id: ElementId) -> Option<f32> {
            self.lengths.get(&id).copied()
        }

        fn set_stroke_transition(&mut self, id: ElementId, transition: StrokeTransition) {
            self.style_mut(id).transition = Some(transition.to_string());
        }

        fn set_stroke_dasharray(&mut self, id: ElementId, value: Option<f32>) {
            self.style_mut(id).dasharray = value;
        }

        fn set_stroke_dashoffset(&mut self, id: ElementId, value: Option<f32>) {
            self.style_mut(id).dashoffset = value;
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn play_hides_every_path_behind_a_full_dash() {
        let mut page = FakePaths::with(&CARBON_PATHS);
        let mut anim = StrokeAnimator::init(&page).unwrap();
        anim.play(&mut page, ms(0));

        for (i, id) in CARBON_PATHS.into_iter().enumerate() {
            let len = 100.0 + 10.0 * i as f32;
            let style = page.style(id);
            assert_eq!(style.dasharray, Some(len));
            assert_eq!(style.dashoffset, Some(len));
            assert_eq!(
                style.transition.as_deref(),
                Some(format!("stroke-dashoffset 900ms linear {}ms", i * 200).as_str())
            );
        }
    }

    #[test]
    fn reveal_waits_for_next_frame() {
        let mut page = FakePaths::with(&CARBON_PATHS);
        let mut anim = StrokeAnimator::init(&page).unwrap();
        anim.play(&mut page, ms(1000));
        assert_eq!(page.style(ElementId::CarbonPath1).dashoffset, Some(100.0));

        anim.advance(&mut page, ms(1016));
        for id in CARBON_PATHS {
            assert_eq!(page.style(id).dashoffset, Some(0.0));
            assert!(page.style(id).dasharray.is_some());
        }
    }

    #[test]
    fn cleanup_is_staggered_per_path() {
        let mut page = FakePaths::with(&CARBON_PATHS);
        let mut anim = StrokeAnimator::init(&page).unwrap();
        anim.play(&mut page, ms(0));
        anim.advance(&mut page, ms(16));

        anim.advance(&mut page, ms(1499));
        assert!(page.style(ElementId::CarbonPath1).dasharray.is_some());

        anim.advance(&mut page, ms(1500));
        assert_eq!(page.style(ElementId::CarbonPath1).dasharray, None);
        assert_eq!(page.style(ElementId::CarbonPath1).dashoffset, None);
        assert!(page.style(ElementId::CarbonPath2).dasharray.is_some());

        anim.advance(&mut page, ms(1700));
        assert_eq!(page.style(ElementId::CarbonPath2).dasharray, None);
        assert!(page.style(ElementId::CarbonPath4).dasharray.is_some());

        anim.advance(&mut page, ms(2100));
        for id in CARBON_PATHS {
            assert_eq!(page.style(id).dasharray, None);
            assert_eq!(page.style(id).dashoffset, None);
        }
        assert!(anim.is_idle());
    }

    #[test]
    fn schedule_is_inspectable() {
        let mut page = FakePaths::with(&CARBON_PATHS);
        let mut anim = StrokeAnimator::init(&page).unwrap();
        anim.play(&mut page, ms(500));

        let cleanups: Vec<_> = anim
            .timeline()
            .pending()
            .iter()
            .filter(|a| a.action == StrokeAction::ClearOverrides)
            .map(|a| (a.element, a.due))
            .collect();
        assert_eq!(
            cleanups,
            vec![
                (ElementId::CarbonPath1, Due::At(ms(2000))),
                (ElementId::CarbonPath2, Due::At(ms(2200))),
                (ElementId::CarbonPath3, Due::At(ms(2400))),
                (ElementId::CarbonPath4, Due::At(ms(2600))),
            ]
        );
    }

    #[test]
    fn absent_paths_are_skipped_without_residue() {
        let present = [ElementId::CarbonPath1, ElementId::CarbonPath3];
        let mut page = FakePaths::with(&present);
        let mut anim = StrokeAnimator::init(&page).unwrap();
        anim.play(&mut page, ms(0));
        assert_eq!(anim.timeline().pending().len(), 4);

        // p3 keeps its index-based stagger even though p2 is missing.
        assert_eq!(
            page.style(ElementId::CarbonPath3).transition.as_deref(),
            Some("stroke-dashoffset 900ms linear 400ms")
        );

        anim.advance(&mut page, ms(16));
        anim.advance(&mut page, ms(5000));
        assert!(anim.is_idle());
        for id in present {
            assert_eq!(page.style(id).dasharray, None);
        }
        assert!(!page.styles.contains_key(&ElementId::CarbonPath2));
        assert!(!page.styles.contains_key(&ElementId::CarbonPath4));
    }

    #[test]
    fn no_paths_at_all_is_a_no_op() {
        let mut page = FakePaths::with(&[]);
        let mut anim = StrokeAnimator::init(&page).unwrap();
        anim.play(&mut page, ms(0));
        assert!(anim.is_idle());
        assert!(page.styles.is_empty());
    }

    #[test]
    fn retrigger_restarts_each_path() {
        let mut page = FakePaths::with(&CARBON_PATHS);
        let mut anim = StrokeAnimator::init(&page).unwrap();
        anim.play(&mut page, ms(0));
        anim.advance(&mut page, ms(16));

        anim.play(&mut page, ms(1000));
        assert_eq!(anim.timeline().pending().len(), 8);
        assert_eq!(page.style(ElementId::CarbonPath1).dashoffset, Some(100.0));

        // The first trigger's cleanup at 1500 ms no longer fires.
        anim.advance(&mut page, ms(1016));
        anim.advance(&mut page, ms(1600));
        assert_eq!(page.style(ElementId::CarbonPath1).dashoffset, Some(0.0));

        anim.advance(&mut page, ms(2500));
        assert_eq!(page.style(ElementId::CarbonPath1).dasharray, None);
    }

    #[test]
    fn missing_trigger_disables_animator() {
        struct Empty;
        impl ElementLookup for Empty {
            fn has_element(&self, _: ElementId) -> bool {
                false
            }
        }
        assert!(StrokeAnimator::init(&Empty).is_none());
    }

    #[test]
    fn timeline_orders_frame_actions_first() {
        let mut timeline = Timeline::default();
        timeline.schedule(ScheduledAction {
            element: ElementId::CarbonPath2,
            due: Due::At(ms(10)),
            action: StrokeAction::ClearOverrides,
        });
        timeline.schedule(ScheduledAction {
            element: ElementId::CarbonPath1,
            due: Due::At(ms(5)),
            action: StrokeAction::ClearOverrides,
        });
        timeline.schedule(ScheduledAction {
            element: ElementId::CarbonPath3,
            due: Due::NextFrame,
            action: StrokeAction::Reveal,
        });

        let due: Vec<_> = timeline.take_due(ms(20)).iter().map(|a| a.element).collect();
        assert_eq!(
            due,
            vec![
                ElementId::CarbonPath3,
                ElementId::CarbonPath1,
                ElementId::CarbonPath2
            ]
        );
        assert!(timeline.is_empty());
    }
}
