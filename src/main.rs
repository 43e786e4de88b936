use std::any::Any;
use std::env;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::info;
use pollster::block_on;
use thiserror::Error;
use winit::dpi::LogicalSize;
use winit::event::{
    ElementState, Event, KeyboardInput, MouseButton as WinitMouseButton, MouseScrollDelta,
    WindowEvent,
};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use slime_lights::{
    FrameContext, KeyCode, MouseButton, NamedKey, Renderer, Scene, SceneConfig, SceneDriver,
};

const FRAME_STEP: f32 = 1.0 / 60.0;
const DEFAULT_FRAMES: u32 = 60;
/// Pixels per scroll line for touchpads reporting pixel deltas.
const PIXELS_PER_LINE: f32 = 40.0;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let config = match &options.path {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };

    let mut scene = Scene::new(config);
    scene.initialize().context("failed to initialize scene")?;

    if options.summary_only {
        return run_headless(scene, &options);
    }

    match run_interactive(scene) {
        Ok(()) => Ok(()),
        Err(InteractiveError::Window(err, scene)) => {
            eprintln!(
                "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
            );
            run_headless(*scene, &options)
        }
        Err(InteractiveError::Other(err)) => Err(err),
    }
}

fn run_headless(mut scene: Scene, options: &CliOptions) -> Result<()> {
    let (width, height) = scene.viewport();
    let pointer = options
        .pointer
        .unwrap_or_else(|| Vec2::new(width as f32 / 2.0, height as f32 / 2.0));
    scene.on_pointer_move(pointer);
    for key in &options.keys {
        scene.on_key(*key);
    }
    for _ in 0..options.frames {
        scene.tick(FRAME_STEP);
    }
    print!("{}", scene.summary());
    Ok(())
}

enum InteractiveError {
    /// The window system is unavailable; the scene is handed back for a headless run.
    Window(WindowInitError, Box<Scene>),
    Other(anyhow::Error),
}

impl From<anyhow::Error> for InteractiveError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err)
    }
}

fn run_interactive(mut scene: Scene) -> Result<(), InteractiveError> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let mut event_loop = match event_loop {
        Ok(event_loop) => event_loop,
        Err(panic) => {
            let err = WindowInitError::from_panic("event loop", panic);
            return Err(InteractiveError::Window(err, Box::new(scene)));
        }
    };

    let (width, height) = scene.viewport();
    let window = match WindowBuilder::new()
        .with_title("Slime Lights")
        .with_inner_size(LogicalSize::new(width as f64, height as f64))
        .build(&event_loop)
    {
        Ok(window) => Arc::new(window),
        Err(err) => {
            let err = WindowInitError::new("window", err.to_string());
            return Err(InteractiveError::Window(err, Box::new(scene)));
        }
    };

    let renderer = block_on(Renderer::new(Arc::clone(&window), scene.textures()))?;
    let size = window.inner_size();
    scene.on_resize(size.width, size.height);
    scene.on_pointer_move(Vec2::new(size.width as f32 / 2.0, size.height as f32 / 2.0));

    let mut app = AppState {
        renderer,
        scene,
        frame: FrameContext::new(),
        last_frame: Instant::now(),
        last_error: None,
    };

    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        if let Err(err) = app.process_event(&event, control_flow) {
            app.last_error = Some(err);
            control_flow.set_exit();
        }
    });

    print!("{}", app.scene.summary());

    match app.last_error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

struct AppState {
    renderer: Renderer,
    scene: Scene,
    frame: FrameContext,
    last_frame: Instant,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug, Error)]
#[error("failed to initialize {stage}: {message}")]
struct WindowInitError {
    stage: &'static str,
    message: String,
}

impl WindowInitError {
    fn new(stage: &'static str, message: String) -> Self {
        Self { stage, message }
    }

    fn from_panic(stage: &'static str, panic: Box<dyn Any + Send>) -> Self {
        Self::new(stage, panic_message(panic))
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

impl AppState {
    fn process_event(&mut self, event: &Event<()>, control_flow: &mut ControlFlow) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        control_flow.set_exit();
                    }
                    WindowEvent::Resized(size) => {
                        self.renderer.resize(*size);
                        self.scene.on_resize(size.width, size.height);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.renderer.resize(**new_inner_size);
                        self.scene
                            .on_resize(new_inner_size.width, new_inner_size.height);
                    }
                    WindowEvent::KeyboardInput { input, .. } => {
                        self.handle_keyboard(input, control_flow);
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        self.handle_mouse_button(*state, *button);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let pos = Vec2::new(position.x as f32, position.y as f32);
                        self.scene.on_pointer_move(pos);
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let lines = match delta {
                            MouseScrollDelta::LineDelta(_, y) => *y,
                            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                        };
                        self.scene.on_scroll(lines);
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(window_id) if *window_id == self.renderer.window_id() => {
                let now = Instant::now();
                let dt = now.duration_since(self.last_frame).as_secs_f32();
                self.last_frame = now;

                self.scene.tick(dt);
                self.scene.render(&mut self.frame);
                if let Err(err) = self.renderer.render(&self.frame) {
                    match err {
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                            let size = self.renderer.window().inner_size();
                            self.renderer.resize(size);
                        }
                        wgpu::SurfaceError::OutOfMemory => {
                            return Err(anyhow!("GPU is out of memory"));
                        }
                        wgpu::SurfaceError::Timeout => {
                            info!("Surface timeout; retrying next frame");
                        }
                    }
                }
            }
            Event::MainEventsCleared => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_keyboard(&mut self, input: &KeyboardInput, control_flow: &mut ControlFlow) {
        if input.state != ElementState::Pressed {
            return;
        }
        let Some(keycode) = input.virtual_keycode.and_then(map_keycode) else {
            return;
        };
        if keycode == KeyCode::Named(NamedKey::Escape) {
            control_flow.set_exit();
            return;
        }
        self.scene.on_key(keycode);
    }

    fn handle_mouse_button(&mut self, state: ElementState, button: WinitMouseButton) {
        let Some(button) = map_mouse_button(button) else {
            return;
        };
        self.scene
            .on_pointer_button(button, state == ElementState::Pressed);
    }
}

/// Buttons whose index does not fit in a byte are ignored.
fn map_mouse_button(button: WinitMouseButton) -> Option<MouseButton> {
    let index = match button {
        WinitMouseButton::Left => 0,
        WinitMouseButton::Right => 1,
        WinitMouseButton::Middle => 2,
        WinitMouseButton::Other(value) => u8::try_from(value).ok()?,
    };
    Some(MouseButton::new(index))
}

fn map_keycode(code: winit::event::VirtualKeyCode) -> Option<KeyCode> {
    use winit::event::VirtualKeyCode as Key;
    Some(match code {
        Key::Left => KeyCode::Named(NamedKey::Left),
        Key::Right => KeyCode::Named(NamedKey::Right),
        Key::Escape => KeyCode::Named(NamedKey::Escape),
        Key::Key0 | Key::Numpad0 => KeyCode::Digit(0),
        Key::Key1 | Key::Numpad1 => KeyCode::Digit(1),
        Key::Key2 | Key::Numpad2 => KeyCode::Digit(2),
        Key::Key3 | Key::Numpad3 => KeyCode::Digit(3),
        Key::Key4 | Key::Numpad4 => KeyCode::Digit(4),
        Key::Key5 | Key::Numpad5 => KeyCode::Digit(5),
        Key::Key6 | Key::Numpad6 => KeyCode::Digit(6),
        Key::Key7 | Key::Numpad7 => KeyCode::Digit(7),
        Key::Key8 | Key::Numpad8 => KeyCode::Digit(8),
        Key::Key9 | Key::Numpad9 => KeyCode::Digit(9),
        Key::A => KeyCode::Character('A'),
        Key::B => KeyCode::Character('B'),
        Key::C => KeyCode::Character('C'),
        Key::D => KeyCode::Character('D'),
        Key::E => KeyCode::Character('E'),
        Key::F => KeyCode::Character('F'),
        Key::G => KeyCode::Character('G'),
        Key::H => KeyCode::Character('H'),
        Key::I => KeyCode::Character('I'),
        Key::J => KeyCode::Character('J'),
        Key::K => KeyCode::Character('K'),
        Key::L => KeyCode::Character('L'),
        Key::M => KeyCode::Character('M'),
        Key::N => KeyCode::Character('N'),
        Key::O => KeyCode::Character('O'),
        Key::P => KeyCode::Character('P'),
        Key::Q => KeyCode::Character('Q'),
        Key::R => KeyCode::Character('R'),
        Key::S => KeyCode::Character('S'),
        Key::T => KeyCode::Character('T'),
        Key::U => KeyCode::Character('U'),
        Key::V => KeyCode::Character('V'),
        Key::W => KeyCode::Character('W'),
        Key::X => KeyCode::Character('X'),
        Key::Y => KeyCode::Character('Y'),
        Key::Z => KeyCode::Character('Z'),
        _ => return None,
    })
}

const USAGE: &str =
    "Usage: slime-lights [scene.xml] [--summary-only] [--frames N] [--keys K1,K2,..] [--pointer X,Y]";

#[derive(Debug)]
struct CliOptions {
    path: Option<PathBuf>,
    summary_only: bool,
    frames: u32,
    keys: Vec<KeyCode>,
    pointer: Option<Vec2>,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self {
            path: None,
            summary_only: false,
            frames: DEFAULT_FRAMES,
            keys: Vec::new(),
            pointer: None,
        };
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--summary-only" => options.summary_only = true,
                "--frames" => {
                    let value = next_value(&mut args, "--frames")?;
                    options.frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count {value:?}"))?;
                }
                "--keys" => {
                    let value = next_value(&mut args, "--keys")?;
                    options.keys = value
                        .split(',')
                        .filter(|name| !name.trim().is_empty())
                        .map(|name| {
                            KeyCode::from_name(name).ok_or_else(|| anyhow!("unknown key {name:?}"))
                        })
                        .collect::<Result<_>>()?;
                }
                "--pointer" => {
                    let value = next_value(&mut args, "--pointer")?;
                    options.pointer = Some(parse_pointer(&value)?);
                }
                other if other.starts_with("--") => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
                path => {
                    if options.path.is_some() {
                        return Err(anyhow!("Unexpected extra argument: {path}. {USAGE}"));
                    }
                    options.path = Some(PathBuf::from(path));
                }
            }
        }
        Ok(options)
    }
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} expects a value. {USAGE}"))
}

fn parse_pointer(value: &str) -> Result<Vec2> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| anyhow!("pointer must be X,Y: {value:?}"))?;
    let x = x
        .trim()
        .parse::<f32>()
        .with_context(|| format!("invalid pointer x {x:?}"))?;
    let y = y
        .trim()
        .parse::<f32>()
        .with_context(|| format!("invalid pointer y {y:?}"))?;
    Ok(Vec2::new(x, y))
}
