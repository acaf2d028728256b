// ============================================================================
// menu.rs — Reef Lab
// Responsive navigation: toggle button plus viewport-width breakpoint.
// ============================================================================

use crate::page::{ElementId, MenuSurface, NavDisplay};

/// Viewports wider than this always show the navigation panel.
pub const DESKTOP_BREAKPOINT: f32 = 980.0;

/// Handle for the navigation menu. Exists only when both the toggle button and
/// the panel are present on the page.
#[derive(Debug)]
pub struct MenuController {
    expanded: bool,
}

impl MenuController {
    /// Wires the menu and applies the initial state for `viewport_width`.
    pub fn init<S: MenuSurface>(page: &mut S, viewport_width: f32) -> Option<Self> {
        for id in [ElementId::NavToggle, ElementId::MainNav] {
            if !page.has_element(id) {
                log::debug!("Menu disabled: #{} not found", id);
                return None;
            }
        }

        let mut menu = Self { expanded: false };
        menu.on_viewport_resize(page, viewport_width);
        Some(menu)
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Button activation: flip the panel and mirror the state into
    /// `aria-expanded`.
    pub fn toggle<S: MenuSurface>(&mut self, page: &mut S) {
        self.expanded = !self.expanded;
        page.set_aria_expanded(self.expanded);
        page.set_nav_display(display_for(self.expanded));
        log::debug!("Menu toggled: expanded={}", self.expanded);
    }

    /// Desktop widths force the panel open; anything narrower collapses it,
    /// even if the user had opened it.
    pub fn on_viewport_resize<S: MenuSurface>(&mut self, page: &mut S, width: f32) {
        self.expanded = width > DESKTOP_BREAKPOINT;
        page.set_aria_expanded(self.expanded);
        page.set_nav_display(display_for(self.expanded));
    }
}

fn display_for(expanded: bool) -> NavDisplay {
    if expanded {
        NavDisplay::Flex
    } else {
        NavDisplay::None
    }
}
