// ============================================================================
// lab_ui.rs — Reef Lab
// egui rendering of the page: top bar with the nav toggle, the population
// section with sliders and chart, the carbon-cycle diagram, events log and
// status line. Rendering never mutates component state directly; clicks are
// reported back as `PageActions` for the app to dispatch.
// ============================================================================

use egui::{Align2, Color32, FontId, RichText, Sense, Stroke};

use crate::chart::PopulationChart;
use crate::lab::{LabState, PageSection};
use crate::lab_page::{partial_polyline, LabPage, VIEW_BOX};
use crate::page::{ElementId, SLIDER_READOUTS};

/// User intents collected during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageActions {
    pub toggle_nav: bool,
    pub sliders_changed: bool,
    pub run: bool,
    pub reset: bool,
    pub animate: bool,
    pub export: bool,
    pub save_preset: bool,
    pub load_preset: bool,
}

impl PageActions {
    pub fn any(&self) -> bool {
        *self != PageActions::default()
    }
}

const PATH_COLORS: [Color32; 4] = [
    Color32::from_rgb(0x38, 0xbd, 0xf8),
    Color32::from_rgb(0x0e, 0xa5, 0xa4),
    Color32::from_rgb(0x84, 0xcc, 0x16),
    Color32::from_rgb(0xf5, 0x9e, 0x0b),
];

/// Diagram node labels, in view-box coordinates.
const CARBON_NODES: [(&str, [f32; 2]); 4] = [
    ("Atmosphere", [60.0, 18.0]),
    ("Ocean", [95.0, 196.0]),
    ("Seagrass", [215.0, 198.0]),
    ("Sediment", [350.0, 122.0]),
];

/// Main entry point for rendering the page.
pub fn render_page(
    ctx: &egui::Context,
    page: &mut LabPage,
    chart: Option<&PopulationChart>,
    lab: &mut LabState,
) -> PageActions {
    let mut actions = PageActions::default();

    render_top_bar(ctx, page, lab, &mut actions);

    if lab.show_logs_panel {
        render_bottom_logs_panel(ctx, lab);
    }

    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical().show(ui, |ui| {
            render_population_section(ui, page, chart, lab, &mut actions);
            ui.add_space(12.0);
            ui.separator();
            render_carbon_section(ui, page, lab, &mut actions);
            ui.add_space(10.0);
        });
    });

    render_status_bar(ctx, lab);

    actions
}

// ======================== Top Bar ========================

fn render_top_bar(
    ctx: &egui::Context,
    page: &LabPage,
    lab: &mut LabState,
    actions: &mut PageActions,
) {
    egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading("🐠 Reef Lab");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if page.aria_expanded() { "✕" } else { "☰" };
                let toggle = ui
                    .button(RichText::new(label).size(18.0))
                    .on_hover_text(format!(
                        "aria-expanded={} | display: {}",
                        page.aria_expanded(),
                        page.nav_display().css_value(),
                    ));
                if toggle.clicked() {
                    actions.toggle_nav = true;
                }
                if ui.small_button("📋 Logs").clicked() {
                    lab.show_logs_panel = !lab.show_logs_panel;
                }
            });
        });

        if page.nav_display().is_visible() {
            ui.separator();
            ui.horizontal_wrapped(|ui| {
                for section in PageSection::ALL {
                    if ui.link(section.title()).clicked() {
                        lab.scroll_to = Some(section);
                    }
                }
            });
        }
        ui.add_space(2.0);
    });
}

fn section_heading(ui: &mut egui::Ui, section: PageSection, lab: &mut LabState) {
    let response = ui.heading(section.title());
    if lab.scroll_to == Some(section) {
        response.scroll_to_me(Some(egui::Align::TOP));
        lab.scroll_to = None;
    }
}

// ======================== Population Section ========================

fn slider_label(control: ElementId) -> &'static str {
    match control {
        ElementId::Resource => "Resource level",
        ElementId::Fishing => "Fishing pressure",
        ElementId::Pollution => "Pollution",
        _ => "",
    }
}

fn render_population_section(
    ui: &mut egui::Ui,
    page: &mut LabPage,
    chart: Option<&PopulationChart>,
    lab: &mut LabState,
    actions: &mut PageActions,
) {
    section_heading(ui, PageSection::Population, lab);
    ui.label(
        RichText::new("Parrotfish graze the reef; lemon sharks hunt them.")
            .small()
            .color(Color32::from_rgb(160, 170, 180)),
    );
    ui.add_space(6.0);

    egui::Grid::new("population_controls")
        .num_columns(3)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            for (control, readout) in SLIDER_READOUTS {
                ui.label(slider_label(control));
                if let Some(slider) = page.slider_mut(control) {
                    let range = slider.range.clone();
                    let response = ui.add(egui::Slider::new(&mut slider.value, range).show_value(false));
                    if response.changed() {
                        actions.sliders_changed = true;
                    }
                }
                ui.label(RichText::new(page.text(readout)).monospace().strong());
                ui.end_row();
            }
        });

    ui.add_space(4.0);
    ui.horizontal(|ui| {
        if ui.button("▶ Run").clicked() {
            actions.run = true;
        }
        if ui.button("🔄 Reset").clicked() {
            actions.reset = true;
        }
    });

    ui.add_space(4.0);
    egui::Grid::new("population_readouts")
        .num_columns(2)
        .spacing([16.0, 2.0])
        .show(ui, |ui| {
            for (label, id) in [
                ("Carrying capacity", ElementId::CapacityValue),
                ("Parrotfish", ElementId::PreyCount),
                ("Lemon sharks", ElementId::PredatorCount),
            ] {
                ui.label(label);
                ui.label(RichText::new(page.text(id)).monospace().strong());
                ui.end_row();
            }
        });

    ui.add_space(6.0);
    match chart {
        Some(chart) => chart.show(ui, 260.0),
        None => {
            ui.label(RichText::new("Chart unavailable").italics());
        }
    }

    ui.add_space(6.0);
    ui.collapsing("💾 Presets & Export", |ui| {
        ui.horizontal(|ui| {
            ui.label("Preset:");
            ui.add(egui::TextEdit::singleline(&mut lab.preset_name).desired_width(120.0));
            if ui.button("Save").clicked() {
                actions.save_preset = true;
            }
            if ui.button("Load").clicked() {
                actions.load_preset = true;
            }
        });
        if ui.button("📤 Export last run (CSV + JSON)").clicked() {
            actions.export = true;
        }
        if let Some(diag) = &lab.last_diag {
            ui.label(
                RichText::new(format!(
                    "Run {}: peak parrotfish {} @{} | peak sharks {} @{}",
                    lab.run_count,
                    diag.peak_prey,
                    diag.peak_prey_step,
                    diag.peak_predators,
                    diag.peak_predators_step,
                ))
                .small()
                .color(Color32::from_rgb(150, 200, 150)),
            );
        }
    });
}

// ======================== Carbon Section ========================

fn render_carbon_section(
    ui: &mut egui::Ui,
    page: &LabPage,
    lab: &mut LabState,
    actions: &mut PageActions,
) {
    section_heading(ui, PageSection::CarbonCycle, lab);
    ui.horizontal(|ui| {
        if ui.button("▶ Animate").clicked() {
            actions.animate = true;
        }
        if page.is_animating() {
            ui.spinner();
        }
    });
    ui.add_space(4.0);

    let width = ui.available_width().min(720.0);
    let size = egui::vec2(width, width * VIEW_BOX[1] / VIEW_BOX[0]);
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, egui::CornerRadius::same(6), Color32::from_rgb(12, 30, 44));

    let to_screen = |p: [f32; 2]| {
        rect.min + egui::vec2(p[0] / VIEW_BOX[0] * rect.width(), p[1] / VIEW_BOX[1] * rect.height())
    };
    let scale = rect.width() / VIEW_BOX[0];
    let now = page.clock();

    for (i, path) in page.paths().iter().enumerate() {
        let fraction = path.visible_fraction(now);
        let points: Vec<egui::Pos2> = partial_polyline(&path.points, fraction)
            .into_iter()
            .map(to_screen)
            .collect();
        if points.len() >= 2 {
            let color = PATH_COLORS[i % PATH_COLORS.len()];
            painter.add(egui::Shape::line(points, Stroke::new(3.0 * scale, color)));
        }
    }

    for (name, pos) in CARBON_NODES {
        painter.text(
            to_screen(pos),
            Align2::CENTER_CENTER,
            name,
            FontId::proportional(12.0 * scale.max(0.8)),
            Color32::from_rgb(220, 230, 240),
        );
    }

    ui.add_space(4.0);
    ui.horizontal_wrapped(|ui| {
        for (i, path) in page.paths().iter().enumerate() {
            ui.label(RichText::new("━").color(PATH_COLORS[i % PATH_COLORS.len()]));
            ui.label(RichText::new(path.label).small());
        }
    });
}

// ======================== Bottom Logs Panel ========================

fn render_bottom_logs_panel(ctx: &egui::Context, lab: &mut LabState) {
    egui::TopBottomPanel::bottom("logs_panel")
        .default_height(120.0)
        .min_height(60.0)
        .max_height(300.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("📋 Events Log").strong());
                ui.label(format!("({} events)", lab.events.len()));
                if ui.button("Clear").clicked() {
                    lab.events.clear();
                }
            });
            ui.separator();
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for event in lab.events.iter().rev().take(100) {
                        let color = match event.event_type.as_str() {
                            "RUN" => Color32::from_rgb(100, 255, 100),
                            "RESET" => Color32::from_rgb(255, 200, 100),
                            "MENU" => Color32::from_rgb(150, 200, 255),
                            "ANIMATE" => Color32::from_rgb(120, 220, 230),
                            "EXPORT" | "PRESET" => Color32::from_rgb(200, 150, 255),
                            _ => Color32::from_rgb(180, 180, 180),
                        };
                        ui.label(RichText::new(event.to_log_line()).small().color(color).monospace());
                    }
                });
        });
}

// ======================== Status Bar ========================

fn render_status_bar(ctx: &egui::Context, lab: &mut LabState) {
    if let Some(msg) = lab.current_status() {
        let msg = msg.to_string();
        egui::Area::new(egui::Id::new("status_bar"))
            .anchor(Align2::CENTER_BOTTOM, egui::vec2(0.0, -10.0))
            .show(ctx, |ui| {
                egui::Frame::default()
                    .fill(Color32::from_rgba_premultiplied(30, 80, 30, 220))
                    .corner_radius(egui::CornerRadius::same(4))
                    .inner_margin(egui::Margin::symmetric(12, 6))
                    .show(ui, |ui| {
                        ui.label(RichText::new(msg).color(Color32::WHITE));
                    });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONTROL_DEFAULTS;

    #[test]
    fn idle_frame_reports_no_actions() {
        let ctx = egui::Context::default();
        let mut page = LabPage::new(&CONTROL_DEFAULTS);
        let chart = PopulationChart::default();
        let mut lab = LabState::default();

        let mut actions = PageActions::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            actions = render_page(ctx, &mut page, Some(&chart), &mut lab);
        });
        assert!(!actions.any());
    }

    #[test]
    fn any_detects_a_single_flag() {
        let actions = PageActions {
            animate: true,
            ..Default::default()
        };
        assert!(actions.any());
    }
}
