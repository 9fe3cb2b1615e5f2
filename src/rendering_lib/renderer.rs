// src/rendering_lib/renderer.rs

use bytemuck::{Pod, Zeroable};
use glam::{Affine2, Vec2};
use log::warn;
use wgpu::util::DeviceExt;

use shatter_pulse::canvas::to_pixels;
use shatter_pulse::{BreathingTransform, CellSet};

use super::vertex::CellVertex;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ViewportUniform {
    size: [f32; 2],
    _padding: [f32; 2],
}

impl ViewportUniform {
    fn new(width: f32, height: f32) -> Self {
        Self {
            size: [width, height],
            _padding: [0.0; 2],
        }
    }
}

/// Per-frame inputs for drawing the cell set.
pub struct FrameParams<'a> {
    pub cells: &'a CellSet,
    pub pulse: f64,
    pub breathing: &'a BreathingTransform,
    pub to_window: &'a Affine2,
    pub screen_width: f32,
    pub screen_height: f32,
    pub clear_color: wgpu::Color,
}

/// Draws convex cells as triangle fans. Buffers are sized once for the cell
/// set, whose topology never changes after generation.
pub struct CellRenderer {
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,

    frame_vertices: Vec<CellVertex>,
    frame_indices: Vec<u32>,
    polygon_scratch: Vec<Vec2>,

    viewport_buffer: wgpu::Buffer,
    viewport_bind_group: wgpu::BindGroup,
}

impl CellRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        shader_source: &str,
        initial_screen_width: f32,
        initial_screen_height: f32,
        cells: &CellSet,
    ) -> Self {
        let shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cell Shader Module"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let viewport_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Viewport Uniform Buffer"),
            contents: bytemuck::bytes_of(&ViewportUniform::new(
                initial_screen_width,
                initial_screen_height,
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let viewport_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("viewport_bind_group_layout"),
            });

        let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &viewport_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_buffer.as_entire_binding(),
            }],
            label: Some("viewport_bind_group"),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Cell Pipeline Layout"),
                bind_group_layouts: &[&viewport_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cell Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader_module,
                entry_point: "vs_main",
                buffers: &[CellVertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader_module,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // cells are wound either way
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let max_vertices = cells.vertex_count().max(1);
        let max_indices = cells
            .iter()
            .map(|cell| (cell.polygon().count() - 2) * 3)
            .sum::<usize>()
            .max(1);

        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell Vertex Buffer"),
            size: (max_vertices * std::mem::size_of::<CellVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let index_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell Index Buffer"),
            size: (max_indices * std::mem::size_of::<u32>()) as u64,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            render_pipeline,
            vertex_buffer,
            index_buffer,
            frame_vertices: Vec::with_capacity(max_vertices),
            frame_indices: Vec::with_capacity(max_indices),
            polygon_scratch: Vec::new(),
            viewport_buffer,
            viewport_bind_group,
        }
    }

    fn add_polygon_to_frame(&mut self, color: [f32; 4]) {
        let count = self.polygon_scratch.len();
        if count < 3 {
            return;
        }
        let start_vertex_index = self.frame_vertices.len() as u32;
        for point in &self.polygon_scratch {
            self.frame_vertices.push(CellVertex::new(*point, color));
        }
        for i in 1..(count as u32 - 1) {
            self.frame_indices.push(start_vertex_index);
            self.frame_indices.push(start_vertex_index + i);
            self.frame_indices.push(start_vertex_index + i + 1);
        }
    }

    pub fn render_cells(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        output_view: &wgpu::TextureView,
        frame: &FrameParams<'_>,
    ) {
        queue.write_buffer(
            &self.viewport_buffer,
            0,
            bytemuck::bytes_of(&ViewportUniform::new(frame.screen_width, frame.screen_height)),
        );

        self.frame_vertices.clear();
        self.frame_indices.clear();

        for cell in frame.cells {
            let displaced = frame.breathing.apply(cell.polygon(), frame.pulse);
            self.polygon_scratch.clear();
            self.polygon_scratch
                .extend(displaced.iter().map(|p| to_pixels(frame.to_window, p)));
            self.add_polygon_to_frame(cell.color().to_linear_rgba());
        }

        let vertex_bytes = (self.frame_vertices.len() * std::mem::size_of::<CellVertex>()) as u64;
        let index_bytes = (self.frame_indices.len() * std::mem::size_of::<u32>()) as u64;
        let fits = vertex_bytes <= self.vertex_buffer.size() && index_bytes <= self.index_buffer.size();
        if !fits {
            warn!("Frame geometry exceeds the buffers sized at startup; skipping draw");
        }
        let draw = fits && !self.frame_indices.is_empty();

        if draw {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.frame_vertices));
            queue.write_buffer(&self.index_buffer, 0, bytemuck::cast_slice(&self.frame_indices));
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Cell Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(frame.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        if draw {
            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.viewport_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..vertex_bytes));
            render_pass.set_index_buffer(self.index_buffer.slice(..index_bytes), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.frame_indices.len() as u32, 0, 0..1);
        }
    }
}
