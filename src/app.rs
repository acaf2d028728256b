// ============================================================================
// app.rs — Reef Lab
// Application state and winit event-loop handler with egui UI integration.
// Owns the page and the three components, and routes window events, clicks
// and shortcuts to them.
// ============================================================================

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes},
};

use crate::animator::StrokeAnimator;
use crate::chart::PopulationChart;
use crate::config::{SimulationParams, CONTROL_DEFAULTS, DEFAULT_STEPS};
use crate::lab::{self, LabState, PRESET_DIR};
use crate::lab_page::LabPage;
use crate::lab_ui::{self, PageActions};
use crate::menu::MenuController;
use crate::simulator::PopulationSimulator;

type Simulator = PopulationSimulator<PopulationChart>;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.03,
    g: 0.06,
    b: 0.09,
    a: 1.0,
};

// ======================== Application ========================

pub struct App {
    state: Option<AppState>,
    config: AppConfig,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub initial_params: SimulationParams,
    pub steps: usize,
    pub window_size: (u32, u32),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_params: CONTROL_DEFAULTS,
            steps: DEFAULT_STEPS,
            window_size: (1100, 900),
        }
    }
}

struct AppState {
    // GPU
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,

    // Window
    window: Arc<Window>,

    // egui
    egui_ctx: egui::Context,
    egui_winit_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,

    // Page & components
    page: LabPage,
    menu: Option<MenuController>,
    simulator: Option<Simulator>,
    animator: Option<StrokeAnimator>,

    // Research Lab
    lab: LabState,

    // Timing
    started: Instant,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { state: None, config }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        match create_state(event_loop, &self.config) {
            Ok(state) => {
                // Initial redraw — required on macOS with winit 0.30
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("Failed to start Reef Lab: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        // Pass events to egui first
        let egui_response = state.egui_winit_state.on_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput { event, .. } => {
                handle_keyboard(state, event_loop, &event, egui_response.consumed);
            }

            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    state.surface_config.width = new_size.width;
                    state.surface_config.height = new_size.height;
                    state.surface.configure(&state.device, &state.surface_config);
                }
                let width = new_size.to_logical::<f32>(state.window.scale_factor()).width;
                if let Some(menu) = &mut state.menu {
                    menu.on_viewport_resize(&mut state.page, width);
                }
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = redraw(state) {
                    log::error!("Frame failed: {:#}", e);
                }
            }

            _ => {}
        }
    }
}

fn create_state(
    event_loop: &winit::event_loop::ActiveEventLoop,
    config: &AppConfig,
) -> Result<AppState> {
    let (width, height) = config.window_size;
    let window_attrs = WindowAttributes::default()
        .with_title("Reef Lab — Parrotfish, Sharks & Carbon")
        .with_inner_size(winit::dpi::LogicalSize::new(width, height));

    let window = Arc::new(
        event_loop
            .create_window(window_attrs)
            .context("failed to create window")?,
    );

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    let surface = instance
        .create_surface(window.clone())
        .context("failed to create surface")?;

    let (device, queue, surface_config) =
        pollster::block_on(init_gpu(&instance, &surface, &window))?;

    surface.configure(&device, &surface_config);

    // ---- Initialize egui ----
    let egui_ctx = egui::Context::default();
    let mut visuals = egui::Visuals::dark();
    visuals.window_fill = egui::Color32::from_rgba_premultiplied(18, 32, 44, 240);
    visuals.panel_fill = egui::Color32::from_rgba_premultiplied(14, 26, 36, 235);
    egui_ctx.set_visuals(visuals);

    let egui_winit_state = egui_winit::State::new(
        egui_ctx.clone(),
        egui::ViewportId::ROOT,
        event_loop,
        Some(window.scale_factor() as f32),
        None,
        None,
    );

    let egui_renderer = egui_wgpu::Renderer::new(&device, surface_config.format, None, 1, false);

    // ---- Page & components ----
    let mut page = LabPage::new(&config.initial_params);
    let logical_width = window
        .inner_size()
        .to_logical::<f32>(window.scale_factor())
        .width;

    let menu = MenuController::init(&mut page, logical_width);
    let simulator = Simulator::with_steps(&mut page, PopulationChart::default(), config.steps);
    let animator = StrokeAnimator::init(&page);

    let mut lab = LabState::default();
    if let Some(sim) = &simulator {
        record_last_run(sim, &mut lab);
    }

    log::info!(
        "Reef Lab initialized: {:.0}px wide, menu={} simulator={:?} animator={}",
        logical_width,
        menu.is_some(),
        simulator.as_ref().map(Simulator::steps),
        animator.is_some(),
    );

    Ok(AppState {
        device,
        queue,
        surface,
        surface_config,
        window,
        egui_ctx,
        egui_winit_state,
        egui_renderer,
        page,
        menu,
        simulator,
        animator,
        lab,
        started: Instant::now(),
    })
}

// ======================== GPU Initialization ========================

async fn init_gpu(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'_>,
    window: &Window,
) -> Result<(wgpu::Device, wgpu::Queue, wgpu::SurfaceConfiguration)> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| anyhow!("failed to find a suitable GPU adapter"))?;

    log::info!("GPU: {}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("reef_lab_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: Default::default(),
            },
            None,
        )
        .await
        .context("failed to create device")?;

    let size = window.inner_size();
    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| surface_caps.formats.first())
        .copied()
        .ok_or_else(|| anyhow!("surface reports no supported formats"))?;
    let alpha_mode = surface_caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

    let surface_config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };

    Ok((device, queue, surface_config))
}

// ======================== Keyboard Handling ========================

fn handle_keyboard(
    state: &mut AppState,
    event_loop: &winit::event_loop::ActiveEventLoop,
    event: &winit::event::KeyEvent,
    egui_consumed: bool,
) {
    if !event.state.is_pressed() {
        return;
    }

    // Global hotkey — always handled, even when egui has focus
    if let Key::Named(NamedKey::Escape) = &event.logical_key {
        event_loop.exit();
        return;
    }

    // Page shortcuts — only if egui didn't consume the event
    if egui_consumed {
        return;
    }

    let mut actions = PageActions::default();
    match &event.logical_key {
        Key::Named(NamedKey::Space) => actions.run = true,
        Key::Character(c) => match c.as_str() {
            "r" | "R" => actions.reset = true,
            "m" | "M" => actions.toggle_nav = true,
            "a" | "A" => actions.animate = true,
            _ => {}
        },
        _ => {}
    }

    if actions.any() {
        let now = state.started.elapsed();
        apply_actions(state, actions, now);
    }
}

// ======================== Action Dispatch ========================

fn record_last_run(sim: &Simulator, lab: &mut LabState) {
    if let (Some(params), Some(series)) = (sim.last_params(), sim.last_run()) {
        lab.record_run(&params, series);
    }
}

fn apply_actions(state: &mut AppState, actions: PageActions, now: Duration) {
    if actions.toggle_nav {
        if let Some(menu) = &mut state.menu {
            menu.toggle(&mut state.page);
            let detail = if menu.is_expanded() { "Menu opened" } else { "Menu closed" };
            state.lab.log_event("MENU", detail);
        }
    }

    if actions.sliders_changed {
        if let Some(sim) = &state.simulator {
            sim.update_labels(&mut state.page);
        }
    }

    if actions.run {
        if let Some(sim) = &mut state.simulator {
            if sim.run(&mut state.page).is_some() {
                record_last_run(sim, &mut state.lab);
            }
        }
    }

    if actions.reset {
        if let Some(sim) = &mut state.simulator {
            if sim.reset(&mut state.page).is_some() {
                state.lab.log_event("RESET", "Sliders restored to defaults");
                record_last_run(sim, &mut state.lab);
            }
        }
    }

    if actions.animate {
        if let Some(animator) = &mut state.animator {
            animator.play(&mut state.page, now);
            state.lab.log_event("ANIMATE", "Carbon-cycle paths redrawn");
        }
    }

    if actions.save_preset {
        save_preset(state);
    }

    if actions.load_preset {
        load_preset(state);
    }

    if actions.export {
        export_last_run(state);
    }
}

fn save_preset(state: &mut AppState) {
    let Some(params) = Simulator::read_params(&state.page) else {
        state.lab.set_status("Preset not saved: slider values are invalid".to_string());
        return;
    };
    let name = state.lab.preset_name.trim().to_string();
    match lab::save_preset(Path::new(PRESET_DIR), &name, &params) {
        Ok(path) => {
            state.lab.log_event("PRESET", &format!("Saved '{}'", name));
            state.lab.set_status(format!("Preset saved: {:?}", path));
        }
        Err(e) => {
            log::error!("Failed to save preset: {:#}", e);
            state.lab.set_status(format!("Preset save failed: {}", e));
        }
    }
}

fn load_preset(state: &mut AppState) {
    let name = state.lab.preset_name.trim().to_string();
    let params = match lab::load_preset(Path::new(PRESET_DIR), &name) {
        Ok(params) => params,
        Err(e) => {
            log::error!("Failed to load preset: {:#}", e);
            state.lab.set_status(format!("Preset load failed: {}", e));
            return;
        }
    };

    state.lab.log_event("PRESET", &format!("Loaded '{}'", name));
    state.lab.set_status(format!("Preset '{}' loaded", name));
    if let Some(sim) = &mut state.simulator {
        if sim.apply_params(&mut state.page, &params).is_some() {
            record_last_run(sim, &mut state.lab);
        }
    }
}

fn export_last_run(state: &mut AppState) {
    let Some(sim) = &state.simulator else {
        return;
    };
    let (Some(params), Some(series)) = (sim.last_params(), sim.last_run()) else {
        state.lab.set_status("Nothing to export yet".to_string());
        return;
    };
    match state.lab.export_run(params, series) {
        Ok(path) => state.lab.set_status(format!("Exported run to {:?}", path)),
        Err(e) => {
            log::error!("Export failed: {:#}", e);
            state.lab.set_status(format!("Export failed: {}", e));
        }
    }
}

// ======================== Frame Rendering ========================

fn redraw(state: &mut AppState) -> Result<()> {
    let now = state.started.elapsed();
    state.page.set_clock(now);

    // Scheduled stroke actions fire before this frame's input is handled.
    if let Some(animator) = &mut state.animator {
        animator.advance(&mut state.page, now);
    }

    // ---- egui frame ----
    let raw_input = state.egui_winit_state.take_egui_input(&state.window);
    let chart = state.simulator.as_ref().map(|sim| sim.chart());
    let mut actions = PageActions::default();
    let full_output = state.egui_ctx.run(raw_input, |ctx| {
        actions = lab_ui::render_page(ctx, &mut state.page, chart, &mut state.lab);
    });
    state
        .egui_winit_state
        .handle_platform_output(&state.window, full_output.platform_output);

    // ---- Handle page actions ----
    if actions.any() {
        apply_actions(state, actions, now);
    }

    // ---- Acquire frame ----
    let output = match state.surface.get_current_texture() {
        Ok(t) => t,
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
            state.surface.configure(&state.device, &state.surface_config);
            return Ok(());
        }
        Err(e) => return Err(anyhow!("failed to acquire frame: {:?}", e)),
    };
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let paint_jobs = state
        .egui_ctx
        .tessellate(full_output.shapes, full_output.pixels_per_point);
    let screen_descriptor = egui_wgpu::ScreenDescriptor {
        size_in_pixels: [state.surface_config.width, state.surface_config.height],
        pixels_per_point: full_output.pixels_per_point,
    };

    for (id, image_delta) in &full_output.textures_delta.set {
        state
            .egui_renderer
            .update_texture(&state.device, &state.queue, *id, image_delta);
    }

    let mut egui_encoder = state
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });

    state.egui_renderer.update_buffers(
        &state.device,
        &state.queue,
        &mut egui_encoder,
        &paint_jobs,
        &screen_descriptor,
    );

    render_egui_pass(
        &state.egui_renderer,
        &mut egui_encoder,
        &view,
        &paint_jobs,
        &screen_descriptor,
    );

    state.queue.submit(std::iter::once(egui_encoder.finish()));
    output.present();

    for id in &full_output.textures_delta.free {
        state.egui_renderer.free_texture(id);
    }

    Ok(())
}

// ======================== egui Render Helper ========================

/// Render egui paint jobs into a render pass cleared to the page background.
/// Extracted as a free function to decouple the egui::Renderer lifetime
/// from the AppState borrow, allowing the render pass encoder to be local.
fn render_egui_pass(
    renderer: &egui_wgpu::Renderer,
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    paint_jobs: &[egui::ClippedPrimitive],
    screen_descriptor: &egui_wgpu::ScreenDescriptor,
) {
    let pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("egui_render_pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    // forget_lifetime converts RenderPass<'encoder> → RenderPass<'static>
    // which is required by egui_wgpu::Renderer::render in wgpu 24.
    let mut pass = pass.forget_lifetime();
    renderer.render(&mut pass, paint_jobs, screen_descriptor);
}
