// src/ui.rs
use egui;

/// What the overlay shows about the running animation.
pub struct OverlayInfo<'a> {
    pub strategy: &'a str,
    pub seed: u64,
    pub cell_count: usize,
    pub vertex_count: usize,
    pub pulse: f64,
}

pub fn build_ui(ctx: &egui::Context, info: &OverlayInfo<'_>) {
    egui::Window::new("Shatter Pulse")
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
        .resizable(false)
        .collapsible(true)
        .show(ctx, |ui| {
            ui.vertical(|ui| {
                ui.label(format!("Strategy: {}", info.strategy));
                ui.label(format!("Seed: {}", info.seed));
                ui.separator();
                ui.label(format!("Cells: {}", info.cell_count));
                ui.label(format!("Vertices: {}", info.vertex_count));
                ui.add(egui::ProgressBar::new(info.pulse as f32).text(format!("pulse {:.2}", info.pulse)));
            });
        });
}
