// src/main.rs

pub mod app;
pub mod ui;
pub mod rendering_lib;

use std::time::Duration;

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use web_time::Instant;
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoopWindowTarget, EventLoop},
    window::WindowBuilder,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use app::ShatterApp;
use shatter_pulse::{CellGenerator, ShatterConfig};

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(start))]
pub async fn run() {
    cfg_if::cfg_if! {
        if #[cfg(target_arch = "wasm32")] {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            console_log::init_with_level(log::Level::Warn).expect("Couldn't initialize logger");
        } else {
            env_logger::init();
        }
    }

    let settings = ShatterConfig::from_env();
    if let Err(e) = settings.validate() {
        error!("{}", e);
        return;
    }

    let seed = settings.seed.unwrap_or_else(rand::random);
    info!("Generating cells with strategy {} and seed {}", settings.strategy, seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let cells = match CellGenerator::from_config(&settings).generate(&mut rng) {
        Ok(cells) => cells,
        Err(e) => {
            error!("Cell generation failed: {}", e);
            return;
        }
    };

    let event_loop = EventLoop::new().unwrap();
    let window = std::sync::Arc::new(
        WindowBuilder::new()
            .with_title("Shatter Pulse")
            .with_inner_size(winit::dpi::LogicalSize::new(600, 600))
            .build(&event_loop)
            .unwrap(),
    );

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::WindowExtWebSys;
        web_sys::window()
            .and_then(|win| win.document())
            .and_then(|doc| {
                let dst = doc.get_element_by_id("wasm-viewport")?;
                let canvas = web_sys::Element::from(window.canvas()?);
                dst.append_child(&canvas).ok()?;
                Some(())
            })
            .expect("Couldn't append canvas to document body.");
    }

    let mut app_state = ShatterApp::new(window.clone(), &settings, cells, seed).await;
    let frame_interval = Duration::from_millis(settings.frame_interval_ms);
    let mut next_frame = Instant::now();

    event_loop
        .run(move |event, target: &EventLoopWindowTarget<()>| {
            match event {
                Event::WindowEvent {
                    ref event,
                    window_id,
                } if window_id == window.id() => {
                    if !app_state.handle_window_event(event, &window) {
                        match event {
                            WindowEvent::CloseRequested => {
                                target.exit();
                            }
                            WindowEvent::Resized(physical_size) => {
                                app_state.resize(*physical_size);
                            }
                            WindowEvent::RedrawRequested => { /* In AboutToWait */ }
                            _ => {}
                        }
                    }
                }
                Event::AboutToWait => {
                    let now = Instant::now();
                    if now >= next_frame {
                        app_state.update();
                        match app_state.render(&window) {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                app_state.resize(app_state.get_size());
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                error!("WGPU Out Of Memory! Exiting.");
                                target.exit();
                            }
                            Err(e) => warn!("Surface error: {:?}", e),
                        }
                        next_frame = now + frame_interval;
                    }

                    if !target.exiting() {
                        target.set_control_flow(ControlFlow::WaitUntil(next_frame));
                    }
                }
                Event::LoopExiting => {}
                _ => {}
            }
        })
        .unwrap();
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() {
    run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {}
