//! Interactive viewer.
//!
//! | key            | action                          |
//! |----------------|---------------------------------|
//! | arrows         | pan                             |
//! | `=` / `-`      | zoom in / out by a factor of 2  |
//! | `]` / `[`      | double / halve the iterations   |
//! | `P`            | switch between f64 and fixed    |
//! | `S` / `L`      | save / load the view            |
//!
//! The view file is the first argument, or `mandelbrot.view`.

mod present;

use std::{env, path::PathBuf, process};

use fixed_mandelbrot::{screen, FractalRenderer, RenderError, ViewConfig};
use log::{error, info, warn};
use thiserror::Error;
use winit::{
    dpi::PhysicalSize,
    error::OsError,
    event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

use present::{PresentError, Presenter};

/// One integer word and three fractional words.
const WORDS: usize = 4;
const DEFAULT_VIEW_PATH: &str = "mandelbrot.view";
const PAN_PIXELS: i32 = 32;

#[derive(Error, Debug)]
enum ViewerError {
    #[error("failed to open a window: {0}")]
    Window(#[from] OsError),
    #[error(transparent)]
    Present(#[from] PresentError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

struct Viewer {
    window: Window,
    presenter: Presenter,
    renderer: FractalRenderer<WORDS>,
    view_path: PathBuf,
    dirty: bool,
}

impl Viewer {
    fn new(event_loop: &EventLoop<()>, view_path: PathBuf) -> Result<Self, ViewerError> {
        let window = WindowBuilder::new()
            .with_title("fixed-mandelbrot")
            .build(event_loop)?;
        let presenter = Presenter::new(&window)?;
        let renderer = FractalRenderer::new(physical_size(window.inner_size()))?;

        let mut viewer = Self {
            window,
            presenter,
            renderer,
            view_path,
            dirty: true,
        };
        if viewer.view_path.exists() {
            viewer.load();
        }
        viewer.update_title();
        Ok(viewer)
    }

    fn handle(&mut self, event: Event<'_, ()>, control_flow: &mut ControlFlow) {
        control_flow.set_wait();
        match event {
            Event::WindowEvent { window_id, event } if window_id == self.window.id() => match event {
                WindowEvent::CloseRequested => control_flow.set_exit(),
                WindowEvent::Resized(size) => self.resize(size),
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => self.key(key),
                _ => {}
            },
            Event::RedrawRequested(window_id) if window_id == self.window.id() => self.redraw(),
            _ => {}
        }
    }

    fn key(&mut self, key: VirtualKeyCode) {
        match key {
            VirtualKeyCode::Left => self.renderer.pan(-PAN_PIXELS, 0),
            VirtualKeyCode::Right => self.renderer.pan(PAN_PIXELS, 0),
            VirtualKeyCode::Up => self.renderer.pan(0, PAN_PIXELS),
            VirtualKeyCode::Down => self.renderer.pan(0, -PAN_PIXELS),
            VirtualKeyCode::Equals | VirtualKeyCode::NumpadAdd => self.renderer.zoom_pow2(1),
            VirtualKeyCode::Minus | VirtualKeyCode::NumpadSubtract => self.renderer.zoom_pow2(-1),
            VirtualKeyCode::LBracket => {
                let max_iterations = self.renderer.viewport().max_iterations;
                self.renderer.set_max_iterations(max_iterations / 2);
            }
            VirtualKeyCode::RBracket => {
                let max_iterations = self.renderer.viewport().max_iterations;
                self.renderer.set_max_iterations(max_iterations.saturating_mul(2));
            }
            VirtualKeyCode::P => {
                let precision = self.renderer.precision().toggled();
                info!("switching to {:?} precision", precision);
                self.renderer.set_precision(precision);
            }
            VirtualKeyCode::S => {
                self.save();
                return;
            }
            VirtualKeyCode::L => self.load(),
            _ => return,
        }
        self.invalidate();
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        let size = physical_size(size);
        self.presenter.resize(size);
        self.renderer.resize(size);
        self.invalidate();
    }

    fn redraw(&mut self) {
        if self.dirty {
            let elapsed = self.renderer.render();
            info!("frame rendered in {:?}", elapsed);
            self.presenter.upload(self.renderer.pixels());
            self.dirty = false;
        }
        self.presenter.draw();
    }

    fn invalidate(&mut self) {
        self.dirty = true;
        self.update_title();
        self.window.request_redraw();
    }

    fn update_title(&self) {
        let viewport = self.renderer.viewport();
        self.window.set_title(&format!(
            "fixed-mandelbrot: ({}, {}) zoom {:e}, {} iterations, {:?}",
            viewport.center_x.to_f64(),
            viewport.center_y.to_f64(),
            viewport.zoom.to_f64(),
            viewport.max_iterations,
            self.renderer.precision(),
        ));
    }

    fn save(&self) {
        match self.renderer.to_config().save(&self.view_path) {
            Ok(()) => info!("saved view to {}", self.view_path.display()),
            Err(error) => warn!("failed to save {}: {}", self.view_path.display(), error),
        }
    }

    fn load(&mut self) {
        match ViewConfig::load(&self.view_path) {
            Ok(config) => {
                info!("loaded view from {}", self.view_path.display());
                self.renderer.apply_config(&config);
            }
            Err(error) => warn!("failed to load {}: {}", self.view_path.display(), error),
        }
    }
}

fn physical_size(size: PhysicalSize<u32>) -> screen::Size {
    screen::Size::new(size.width.max(1), size.height.max(1))
}

fn main() {
    env_logger::init();

    let view_path = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_VIEW_PATH));

    let event_loop = EventLoop::new();
    let mut viewer = match Viewer::new(&event_loop, view_path) {
        Ok(viewer) => viewer,
        Err(error) => {
            error!("{}", error);
            process::exit(1);
        }
    };

    event_loop.run(move |event, _, control_flow| viewer.handle(event, control_flow));
}
