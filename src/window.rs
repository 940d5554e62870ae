//! SDL2 front-end: one streaming ARGB8888 texture the size of the window,
//! plus translation of SDL events into viewer events.

use sdl2::event::Event;
use sdl2::keyboard::{KeyboardUtil, Keycode, Mod};
use sdl2::mouse::MouseButton as SdlMouseButton;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

use crate::controls::MouseButton;

pub const FPS: u64 = 60;
pub const FRAME_TARGET_TIME: f64 = 1000.0 / FPS as f64;

/// Keyboard commands the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NextModel,
    PreviousModel,
    ToggleFill,
    ToggleShade,
    ToggleEdges,
    ToggleVertices,
    ExportImage,
    ExportModel,
    ExportAll,
    CancelExport,
}

impl Command {
    fn from_keycode(key: Keycode) -> Option<Self> {
        let command = match key {
            Keycode::Right | Keycode::Down => Self::NextModel,
            Keycode::Left | Keycode::Up => Self::PreviousModel,
            Keycode::Num1 => Self::ToggleFill,
            Keycode::Num2 => Self::ToggleShade,
            Keycode::Num3 => Self::ToggleEdges,
            Keycode::Num4 => Self::ToggleVertices,
            Keycode::P => Self::ExportImage,
            Keycode::O => Self::ExportModel,
            Keycode::B => Self::ExportAll,
            Keycode::C => Self::CancelExport,
            _ => return None,
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    Quit,
    Resize(u32, u32),
    Pressed {
        x: f64,
        y: f64,
    },
    Dragged {
        x: f64,
        y: f64,
        button: MouseButton,
        ctrl: bool,
    },
    Scrolled(f64),
    Command(Command),
}

pub struct FrameLimiter {
    previous_frame_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window) -> Self {
        Self {
            previous_frame_time: window.timer().ticks64(),
        }
    }

    /// Sleeps off the rest of the frame budget and returns the milliseconds
    /// since the previous call.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> u64 {
        let mut current_time = window.timer().ticks64();
        let mut delta_time = current_time - self.previous_frame_time;

        if delta_time < FRAME_TARGET_TIME as u64 {
            let time_to_wait = (FRAME_TARGET_TIME as u64) - delta_time;
            std::thread::sleep(std::time::Duration::from_millis(time_to_wait));
            current_time = window.timer().ticks64();
            delta_time = current_time - self.previous_frame_time;
        }

        self.previous_frame_time = current_time;
        delta_time
    }
}

pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    // Field order matters: `texture` borrows from `texture_creator` and must drop first.
    texture: sdl2::render::Texture<'static>,
    texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    event_pump: sdl2::EventPump,
    keyboard: KeyboardUtil,
    timer_subsystem: sdl2::TimerSubsystem,
    width: u32,
    height: u32,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let texture = Self::streaming_texture(&texture_creator, width, height)?;

        Ok(Self {
            canvas,
            texture,
            texture_creator,
            event_pump: sdl_context.event_pump()?,
            keyboard: sdl_context.keyboard(),
            timer_subsystem,
            width,
            height,
        })
    }

    fn streaming_texture(
        creator: &sdl2::render::TextureCreator<sdl2::video::WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<sdl2::render::Texture<'static>, String> {
        // SAFETY: the creator is boxed, so its address is stable, and it is
        // owned by the same `Window` as every texture made here. Field order
        // drops the texture first.
        let creator: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(creator as *const _) };
        // SDL rejects zero-sized textures; a minimized window keeps a 1x1 one.
        creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width.max(1), height.max(1))
            .map_err(|e| e.to_string())
    }

    /// Drain pending SDL events.
    pub fn poll_events(&mut self) -> Vec<WindowEvent> {
        let ctrl = self
            .keyboard
            .mod_state()
            .intersects(Mod::LCTRLMOD | Mod::RCTRLMOD);

        let mut events = Vec::new();
        for event in self.event_pump.poll_iter() {
            let translated = match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => Some(WindowEvent::Quit),
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => Command::from_keycode(key).map(WindowEvent::Command),
                Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(w, h),
                    ..
                } => Some(WindowEvent::Resize(w.max(0) as u32, h.max(0) as u32)),
                Event::MouseButtonDown {
                    x,
                    y,
                    mouse_btn: SdlMouseButton::Left | SdlMouseButton::Right,
                    ..
                } => Some(WindowEvent::Pressed {
                    x: x as f64,
                    y: y as f64,
                }),
                Event::MouseMotion {
                    mousestate, x, y, ..
                } => {
                    let button = if mousestate.left() {
                        Some(MouseButton::Primary)
                    } else if mousestate.right() {
                        Some(MouseButton::Secondary)
                    } else {
                        None
                    };
                    button.map(|button| WindowEvent::Dragged {
                        x: x as f64,
                        y: y as f64,
                        button,
                        ctrl,
                    })
                }
                Event::MouseWheel { y, .. } => Some(WindowEvent::Scrolled(y as f64)),
                _ => None,
            };
            events.extend(translated);
        }
        events
    }

    /// Upload an ARGB8888 frame the size of the window and show it.
    pub fn present(&mut self, buffer: &[u8]) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        self.texture
            .update(None, buffer, (self.width * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, Some(Rect::new(0, 0, self.width, self.height)))?;
        self.canvas.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), String> {
        self.texture = Self::streaming_texture(&self.texture_creator, width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}
