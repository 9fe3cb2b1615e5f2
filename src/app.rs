// src/app.rs

use winit::{event::WindowEvent, window::Window};

use shatter_pulse::{BreathingTransform, CanvasLayout, CellSet, PulseClock, PulseWave, ShatterConfig};

use crate::rendering_lib::renderer::{CellRenderer, FrameParams};
use crate::rendering_lib::shader::CELL_SHADER_SOURCE;
use crate::ui::{build_ui, OverlayInfo};

const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

pub struct ShatterApp {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    renderer: CellRenderer,
    cells: CellSet,
    strategy_label: String,
    seed: u64,
    wave: PulseWave,
    breathing: BreathingTransform,
    layout: CanvasLayout,
    clock: PulseClock,
    pulse: f64,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl ShatterApp {
    pub async fn new(
        window: std::sync::Arc<Window>,
        settings: &ShatterConfig,
        cells: CellSet,
        seed: u64,
    ) -> Self {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone()).unwrap();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    label: None,
                },
                None,
            )
            .await
            .unwrap();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps.formats.iter().copied()
            .find(|f| f.is_srgb()).unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = CellRenderer::new(
            &device, config.format, CELL_SHADER_SOURCE,
            size.width as f32, size.height as f32,
            &cells,
        );

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(), egui::ViewportId::ROOT, &window,
            Some(window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            &device, config.format, None, 1,
        );

        Self {
            surface, device, queue, config, size,
            renderer, cells,
            strategy_label: settings.strategy.to_string(),
            seed,
            wave: PulseWave::new(settings.period_ms),
            breathing: BreathingTransform::new(settings.breathing_scale()),
            layout: settings.canvas_layout(),
            clock: PulseClock::start(),
            pulse: 1.0,
            egui_ctx, egui_state, egui_renderer,
        }
    }

    pub fn get_size(&self) -> winit::dpi::PhysicalSize<u32> { self.size }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Advances the pulse to the current clock reading.
    pub fn update(&mut self) {
        self.pulse = self.wave.at(self.clock.elapsed_ms());
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        let output_texture = self.surface.get_current_texture()?;
        let view = output_texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Main Command Encoder"),
        });

        let width = self.size.width as f32;
        let height = self.size.height as f32;
        let to_window = self.layout.window_transform(width, height);
        self.renderer.render_cells(
            &self.queue, &mut encoder, &view,
            &FrameParams {
                cells: &self.cells,
                pulse: self.pulse,
                breathing: &self.breathing,
                to_window: &to_window,
                screen_width: width,
                screen_height: height,
                clear_color: CLEAR_COLOR,
            },
        );

        let info = OverlayInfo {
            strategy: &self.strategy_label,
            seed: self.seed,
            cell_count: self.cells.len(),
            vertex_count: self.cells.vertex_count(),
            pulse: self.pulse,
        };
        let raw_input = self.egui_state.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| { build_ui(ctx, &info); });
        self.egui_state.handle_platform_output(window, full_output.platform_output);
        let tris = self.egui_ctx.tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };
        self.egui_renderer.update_buffers(&self.device, &self.queue, &mut encoder, &tris, &screen_descriptor);
        {
            let mut gui_render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("GUI Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view, resolve_target: None,
                    ops: wgpu::Operations { load: wgpu::LoadOp::Load, store: wgpu::StoreOp::Store },
                })],
                depth_stencil_attachment: None, occlusion_query_set: None, timestamp_writes: None,
            });
            self.egui_renderer.render(&mut gui_render_pass, &tris, &screen_descriptor);
        }
        for tex_id in &full_output.textures_delta.free { self.egui_renderer.free_texture(tex_id); }

        self.queue.submit(std::iter::once(encoder.finish()));
        output_texture.present();
        Ok(())
    }

    /// Feeds window events to egui. Returns true when egui consumed the event.
    pub fn handle_window_event(&mut self, event: &WindowEvent, window: &Window) -> bool {
        self.egui_state.on_window_event(window, event).consumed
    }
}
