use device_backend::geometry::{cursor_y, flip_y};
use device_backend::*;
use raw_window_handle::{
    HasRawDisplayHandle, HasRawWindowHandle, RawDisplayHandle, RawWindowHandle,
};
pub use winit;
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, Event, MouseButton, MouseScrollDelta, TouchPhase, VirtualKeyCode, WindowEvent},
    event_loop::{EventLoop, EventLoopBuilder},
    platform::run_return::EventLoopExtRunReturn,
    window::{CursorGrabMode, Fullscreen, Window, WindowBuilder},
};

/// pixel deltas (touchpads) are turned into wheel lines using this many pixels per line.
const PIXELS_PER_LINE: f64 = 25.0;

/// config that you provide to winit device
#[derive(Debug, Default)]
pub struct WinitConfig {
    /// allow creating the event loop off the main thread. only honored on windows and unix-likes.
    /// mostly useful for tests.
    pub any_thread: bool,
}

/// This is the winit Device. Each `poll_input` pumps the event loop until it runs out of events.
pub struct WinitDevice {
    pub event_loop: EventLoop<()>,
    pub window: Window,
    /// size of the drawable area in physical pixels. used to flip cursor rows
    pub inner_size: PhysicalSize<u32>,
    pub recorder: InputRecorder,
    pub scroll: ScrollAccumulator,
    /// the touch that drives the emulated left mouse button
    pub pointer_touch_id: Option<u64>,
    /// placement requested while full screen, applied when going back to windowed
    pub restore: Option<Geometry>,
    /// our own geometry changes, reported as resized on the next poll
    pub resize_pending: bool,
    /// set once the window is closed. sticky.
    pub should_close: bool,
    pub device_config: DeviceConfig,
}

unsafe impl HasRawWindowHandle for WinitDevice {
    fn raw_window_handle(&self) -> RawWindowHandle {
        self.window.raw_window_handle()
    }
}

unsafe impl HasRawDisplayHandle for WinitDevice {
    fn raw_display_handle(&self) -> RawDisplayHandle {
        self.window.raw_display_handle()
    }
}

impl Device for WinitDevice {
    type Configuration = WinitConfig;
    type WindowType = Window;

    fn init(config: Self::Configuration, device_config: DeviceConfig) -> Result<Self, DeviceError> {
        if device_config.gfx_api_type == GfxApiType::GL {
            return Err(DeviceError::UnsupportedGfxApi {
                backend: "winit",
                api: GfxApiType::GL,
            });
        }
        #[allow(unused_mut)]
        let mut event_loop_builder = EventLoopBuilder::new();
        #[cfg(any(
            target_os = "linux",
            target_os = "dragonfly",
            target_os = "freebsd",
            target_os = "netbsd",
            target_os = "openbsd"
        ))]
        {
            use winit::platform::unix::EventLoopBuilderExtUnix;
            event_loop_builder.with_any_thread(config.any_thread);
        }
        #[cfg(target_os = "windows")]
        {
            use winit::platform::windows::EventLoopBuilderExtWindows;
            event_loop_builder.with_any_thread(config.any_thread);
        }
        #[cfg(not(any(
            target_os = "linux",
            target_os = "dragonfly",
            target_os = "freebsd",
            target_os = "netbsd",
            target_os = "openbsd",
            target_os = "windows"
        )))]
        let _ = config;
        let event_loop = event_loop_builder.build();

        let [width, height] = device_config.size;
        let window = WindowBuilder::new()
            .with_title(device_config.title.clone())
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(true)
            .build(&event_loop)
            .map_err(|err| DeviceError::WindowCreation(err.to_string()))?;
        let inner_size = window.inner_size();
        tracing::info!(
            width = inner_size.width,
            height = inner_size.height,
            "created winit window"
        );

        let mut device = Self {
            event_loop,
            window,
            inner_size,
            recorder: InputRecorder::new(),
            scroll: ScrollAccumulator::default(),
            pointer_touch_id: None,
            restore: None,
            resize_pending: false,
            should_close: false,
            device_config,
        };
        if let Some(geometry) = device.device_config.initial_geometry() {
            device.apply_geometry(geometry);
        }
        if device.device_config.fullscreen {
            device.toggle_full_screen();
        }
        Ok(device)
    }

    fn dispose(self) {
        tracing::info!("disposing winit device");
        drop(self.window);
    }

    fn poll_input(&mut self) -> Option<Input> {
        if self.should_close {
            return None;
        }
        self.recorder.begin_poll();
        if std::mem::take(&mut self.resize_pending) {
            self.recorder.record(DeviceEvent::Resized);
        }
        let mut frame_events: Vec<WindowEvent<'static>> = Vec::new();
        self.event_loop.run_return(|event, _, control_flow| {
            control_flow.set_poll();
            match event {
                // assume single window, so no need to check window id.
                Event::WindowEvent {
                    event: WindowEvent::ScaleFactorChanged { new_inner_size, .. },
                    ..
                } => frame_events.push(WindowEvent::Resized(*new_inner_size)),
                Event::WindowEvent { event, .. } => {
                    if let Some(event) = event.to_static() {
                        frame_events.push(event);
                    }
                }
                Event::MainEventsCleared => control_flow.set_exit(),
                _ => {}
            }
        });
        for event in frame_events {
            self.handle_event(event);
        }
        if self.should_close {
            tracing::info!("winit window closed");
            return None;
        }
        Some(self.recorder.snapshot())
    }

    fn size(&self) -> Geometry {
        let inner = self.window.inner_size();
        match self.window.inner_position() {
            Ok(position) => self.screen_frame().to_geometry(position, inner),
            // wayland and mobile don't tell us where the window is.
            Err(_) => Geometry::new(0, 0, inner.width, inner.height),
        }
    }

    fn set_size(&mut self, geometry: Geometry) {
        if self.is_full_screen() {
            self.restore = Some(geometry);
            return;
        }
        self.apply_geometry(geometry);
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn is_full_screen(&self) -> bool {
        self.window.fullscreen().is_some()
    }

    fn toggle_full_screen(&mut self) {
        if self.is_full_screen() {
            tracing::debug!("leaving full screen");
            self.window.set_fullscreen(None);
            if let Some(geometry) = self.restore.take() {
                self.apply_geometry(geometry);
            }
        } else {
            tracing::debug!("entering full screen");
            let monitor = self.window.current_monitor();
            self.window.set_fullscreen(Some(Fullscreen::Borderless(monitor)));
        }
        self.resize_pending = true;
    }

    fn show_cursor(&mut self, show: bool) {
        self.window.set_cursor_visible(show);
        let result = if show {
            self.window.set_cursor_grab(CursorGrabMode::None)
        } else {
            // x11 and windows can only confine, macos can only lock.
            self.window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Locked))
        };
        if let Err(err) = result {
            tracing::warn!(%err, show, "failed to change cursor grab");
        }
    }

    fn set_cursor_at(&mut self, x: i32, y: i32) {
        let height = self.window.inner_size().height as i32;
        let position = PhysicalPosition::new(x as f64, (height - y) as f64);
        if let Err(err) = self.window.set_cursor_position(position) {
            tracing::warn!(%err, x, y, "failed to place cursor");
        }
    }

    fn get_window(&mut self) -> Option<&mut Self::WindowType> {
        Some(&mut self.window)
    }

    fn get_config(&self) -> &DeviceConfig {
        &self.device_config
    }
}

impl WinitDevice {
    /// the frame placements are measured in. same for every monitor, so `size` reads back
    /// what `set_size` wrote even when the window lands on another monitor.
    fn screen_frame(&self) -> ScreenFrame {
        match self
            .window
            .primary_monitor()
            .or_else(|| self.window.current_monitor())
        {
            Some(monitor) => ScreenFrame {
                left: monitor.position().x,
                top: monitor.position().y,
                height: monitor.size().height,
            },
            None => ScreenFrame {
                left: 0,
                top: 0,
                height: self.window.inner_size().height,
            },
        }
    }

    /// move and resize the drawable area, ignoring full screen state.
    fn apply_geometry(&mut self, geometry: Geometry) {
        let target = self.screen_frame().to_desktop(geometry);
        // positions are set on the outer frame, so account for decorations.
        let (dx, dy) = match (self.window.inner_position(), self.window.outer_position()) {
            (Ok(inner), Ok(outer)) => (inner.x - outer.x, inner.y - outer.y),
            _ => (0, 0),
        };
        self.window
            .set_inner_size(PhysicalSize::new(geometry.w, geometry.h));
        self.window
            .set_outer_position(PhysicalPosition::new(target.x - dx, target.y - dy));
        self.resize_pending = true;
        tracing::debug!(?geometry, "window placement changed");
    }

    fn handle_event(&mut self, event: WindowEvent<'static>) {
        let device_event = match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.should_close = true;
                None
            }
            WindowEvent::Focused(focus) => Some(DeviceEvent::Focus(focus)),
            WindowEvent::Resized(size) => {
                self.inner_size = size;
                Some(DeviceEvent::Resized)
            }
            WindowEvent::Moved(_) => Some(DeviceEvent::Resized),
            WindowEvent::KeyboardInput { input, .. } => {
                match input.virtual_keycode.and_then(winit_key_to_key) {
                    Some(key) => Some(key_event(input.state, key)),
                    None => {
                        tracing::trace!(key = ?input.virtual_keycode, "ignoring unmapped key");
                        None
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                winit_mouse_button_to_key(button).map(|key| key_event(state, key))
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // winit is positive when rolling away from the user.
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -(y as f64),
                    MouseScrollDelta::PixelDelta(position) => -position.y / PIXELS_PER_LINE,
                };
                match self.scroll.lines(lines) {
                    0 => None,
                    lines => Some(DeviceEvent::Scroll(lines)),
                }
            }
            WindowEvent::CursorMoved { position, .. } => Some(DeviceEvent::CursorMoved {
                x: position.x.round() as i32,
                y: cursor_y(position.y, self.inner_size.height),
            }),
            WindowEvent::Touch(touch) => {
                // the first finger down acts as the left mouse button.
                if self.pointer_touch_id.is_some() && self.pointer_touch_id != Some(touch.id) {
                    return;
                }
                self.recorder.record(DeviceEvent::CursorMoved {
                    x: touch.location.x.round() as i32,
                    y: cursor_y(touch.location.y, self.inner_size.height),
                });
                match touch.phase {
                    TouchPhase::Started => {
                        self.pointer_touch_id = Some(touch.id);
                        Some(DeviceEvent::KeyPressed(Key::MouseLeft))
                    }
                    TouchPhase::Moved => None,
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        self.pointer_touch_id = None;
                        Some(DeviceEvent::KeyReleased(Key::MouseLeft))
                    }
                }
            }
            _ => None,
        };
        if let Some(device_event) = device_event {
            self.recorder.record(device_event);
        }
    }
}

/// desktop position of the primary monitor and its height. y grows downward on the desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenFrame {
    left: i32,
    top: i32,
    height: u32,
}

impl ScreenFrame {
    /// placement of a drawable area whose top left corner sits at `position` on the desktop.
    fn to_geometry(self, position: PhysicalPosition<i32>, size: PhysicalSize<u32>) -> Geometry {
        Geometry {
            x: position.x - self.left,
            y: flip_y(position.y - self.top, size.height, self.height),
            w: size.width,
            h: size.height,
        }
    }

    /// desktop position of the top left corner of the drawable area.
    fn to_desktop(self, geometry: Geometry) -> PhysicalPosition<i32> {
        PhysicalPosition::new(
            self.left + geometry.x,
            self.top + flip_y(geometry.y, geometry.h, self.height),
        )
    }
}

fn key_event(state: ElementState, key: Key) -> DeviceEvent {
    match state {
        ElementState::Pressed => DeviceEvent::KeyPressed(key),
        ElementState::Released => DeviceEvent::KeyReleased(key),
    }
}

fn winit_mouse_button_to_key(button: MouseButton) -> Option<Key> {
    match button {
        MouseButton::Left => Some(Key::MouseLeft),
        MouseButton::Right => Some(Key::MouseRight),
        MouseButton::Middle => Some(Key::MouseMiddle),
        MouseButton::Other(_) => None,
    }
}

fn winit_key_to_key(key_code: VirtualKeyCode) -> Option<Key> {
    let key = match key_code {
        VirtualKeyCode::Key0 => Key::Key0,
        VirtualKeyCode::Key1 => Key::Key1,
        VirtualKeyCode::Key2 => Key::Key2,
        VirtualKeyCode::Key3 => Key::Key3,
        VirtualKeyCode::Key4 => Key::Key4,
        VirtualKeyCode::Key5 => Key::Key5,
        VirtualKeyCode::Key6 => Key::Key6,
        VirtualKeyCode::Key7 => Key::Key7,
        VirtualKeyCode::Key8 => Key::Key8,
        VirtualKeyCode::Key9 => Key::Key9,

        VirtualKeyCode::A => Key::A,
        VirtualKeyCode::B => Key::B,
        VirtualKeyCode::C => Key::C,
        VirtualKeyCode::D => Key::D,
        VirtualKeyCode::E => Key::E,
        VirtualKeyCode::F => Key::F,
        VirtualKeyCode::G => Key::G,
        VirtualKeyCode::H => Key::H,
        VirtualKeyCode::I => Key::I,
        VirtualKeyCode::J => Key::J,
        VirtualKeyCode::K => Key::K,
        VirtualKeyCode::L => Key::L,
        VirtualKeyCode::M => Key::M,
        VirtualKeyCode::N => Key::N,
        VirtualKeyCode::O => Key::O,
        VirtualKeyCode::P => Key::P,
        VirtualKeyCode::Q => Key::Q,
        VirtualKeyCode::R => Key::R,
        VirtualKeyCode::S => Key::S,
        VirtualKeyCode::T => Key::T,
        VirtualKeyCode::U => Key::U,
        VirtualKeyCode::V => Key::V,
        VirtualKeyCode::W => Key::W,
        VirtualKeyCode::X => Key::X,
        VirtualKeyCode::Y => Key::Y,
        VirtualKeyCode::Z => Key::Z,

        VirtualKeyCode::Numpad0 => Key::Keypad0,
        VirtualKeyCode::Numpad1 => Key::Keypad1,
        VirtualKeyCode::Numpad2 => Key::Keypad2,
        VirtualKeyCode::Numpad3 => Key::Keypad3,
        VirtualKeyCode::Numpad4 => Key::Keypad4,
        VirtualKeyCode::Numpad5 => Key::Keypad5,
        VirtualKeyCode::Numpad6 => Key::Keypad6,
        VirtualKeyCode::Numpad7 => Key::Keypad7,
        VirtualKeyCode::Numpad8 => Key::Keypad8,
        VirtualKeyCode::Numpad9 => Key::Keypad9,
        VirtualKeyCode::NumpadAdd => Key::KeypadAdd,
        VirtualKeyCode::NumpadSubtract => Key::KeypadSubtract,
        VirtualKeyCode::NumpadMultiply => Key::KeypadMultiply,
        VirtualKeyCode::NumpadDivide => Key::KeypadDivide,
        VirtualKeyCode::NumpadDecimal => Key::KeypadDecimal,
        VirtualKeyCode::NumpadEnter => Key::KeypadEnter,
        VirtualKeyCode::NumpadEquals => Key::KeypadEquals,

        VirtualKeyCode::Equals => Key::Equals,
        VirtualKeyCode::Comma => Key::Comma,
        VirtualKeyCode::Minus => Key::Minus,
        VirtualKeyCode::Period => Key::Period,
        VirtualKeyCode::Semicolon => Key::Semicolon,
        VirtualKeyCode::Slash => Key::Slash,
        VirtualKeyCode::Grave => Key::Grave,
        VirtualKeyCode::LBracket => Key::LBracket,
        VirtualKeyCode::Backslash => Key::Backslash,
        VirtualKeyCode::RBracket => Key::RBracket,
        VirtualKeyCode::Apostrophe => Key::Apostrophe,

        VirtualKeyCode::Tab => Key::Tab,
        VirtualKeyCode::Space => Key::Space,
        VirtualKeyCode::Insert => Key::Insert,
        VirtualKeyCode::Delete => Key::Delete,
        VirtualKeyCode::Back => Key::Backspace,
        VirtualKeyCode::Return => Key::Enter,
        VirtualKeyCode::Escape => Key::Escape,
        VirtualKeyCode::Pause => Key::Pause,
        VirtualKeyCode::Capital => Key::CapsLock,
        VirtualKeyCode::Numlock => Key::NumLock,
        VirtualKeyCode::Scroll => Key::ScrollLock,
        VirtualKeyCode::Snapshot => Key::Snapshot,

        VirtualKeyCode::PageUp => Key::PageUp,
        VirtualKeyCode::PageDown => Key::PageDown,
        VirtualKeyCode::Home => Key::Home,
        VirtualKeyCode::End => Key::End,
        VirtualKeyCode::Left => Key::Left,
        VirtualKeyCode::Right => Key::Right,
        VirtualKeyCode::Up => Key::Up,
        VirtualKeyCode::Down => Key::Down,

        VirtualKeyCode::LShift => Key::LShift,
        VirtualKeyCode::RShift => Key::RShift,
        VirtualKeyCode::LControl => Key::LControl,
        VirtualKeyCode::RControl => Key::RControl,
        VirtualKeyCode::LAlt => Key::LAlt,
        VirtualKeyCode::RAlt => Key::RAlt,
        VirtualKeyCode::LWin => Key::LSuper,
        VirtualKeyCode::RWin => Key::RSuper,

        VirtualKeyCode::F1 => Key::F1,
        VirtualKeyCode::F2 => Key::F2,
        VirtualKeyCode::F3 => Key::F3,
        VirtualKeyCode::F4 => Key::F4,
        VirtualKeyCode::F5 => Key::F5,
        VirtualKeyCode::F6 => Key::F6,
        VirtualKeyCode::F7 => Key::F7,
        VirtualKeyCode::F8 => Key::F8,
        VirtualKeyCode::F9 => Key::F9,
        VirtualKeyCode::F10 => Key::F10,
        VirtualKeyCode::F11 => Key::F11,
        VirtualKeyCode::F12 => Key::F12,
        VirtualKeyCode::F13 => Key::F13,
        VirtualKeyCode::F14 => Key::F14,
        VirtualKeyCode::F15 => Key::F15,
        VirtualKeyCode::F16 => Key::F16,
        VirtualKeyCode::F17 => Key::F17,
        VirtualKeyCode::F18 => Key::F18,
        VirtualKeyCode::F19 => Key::F19,
        VirtualKeyCode::F20 => Key::F20,
        VirtualKeyCode::F21 => Key::F21,
        VirtualKeyCode::F22 => Key::F22,
        VirtualKeyCode::F23 => Key::F23,
        VirtualKeyCode::F24 => Key::F24,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_letters_and_keypad() {
        assert_eq!(winit_key_to_key(VirtualKeyCode::W), Some(Key::W));
        assert_eq!(winit_key_to_key(VirtualKeyCode::X), Some(Key::X));
        assert_eq!(winit_key_to_key(VirtualKeyCode::Numpad7), Some(Key::Keypad7));
        assert_eq!(winit_key_to_key(VirtualKeyCode::Return), Some(Key::Enter));
        assert_eq!(winit_key_to_key(VirtualKeyCode::LWin), Some(Key::LSuper));
    }

    #[test]
    fn placement_reads_back_on_a_secondary_monitor() {
        let frame = ScreenFrame {
            left: 0,
            top: 0,
            height: 1080,
        };
        // right of a 1920 wide primary, and below its bottom edge.
        let geometry = Geometry::new(2200, -300, 600, 400);
        let corner = frame.to_desktop(geometry);
        assert_eq!((corner.x, corner.y), (2200, 980));
        assert_eq!(frame.to_geometry(corner, PhysicalSize::new(600, 400)), geometry);
    }

    #[test]
    fn frame_offsets_apply_to_both_axes() {
        let frame = ScreenFrame {
            left: -1280,
            top: 120,
            height: 1024,
        };
        let geometry = Geometry::new(600, 200, 600, 400);
        let corner = frame.to_desktop(geometry);
        assert_eq!((corner.x, corner.y), (-680, 120 + 1024 - 200 - 400));
        assert_eq!(frame.to_geometry(corner, PhysicalSize::new(600, 400)), geometry);
    }

    #[test]
    fn media_keys_are_not_tracked() {
        assert_eq!(winit_key_to_key(VirtualKeyCode::Mail), None);
        assert_eq!(winit_key_to_key(VirtualKeyCode::VolumeUp), None);
    }

    #[test]
    fn mouse_buttons_share_the_key_space() {
        assert_eq!(winit_mouse_button_to_key(MouseButton::Left), Some(Key::MouseLeft));
        assert_eq!(winit_mouse_button_to_key(MouseButton::Middle), Some(Key::MouseMiddle));
        assert_eq!(winit_mouse_button_to_key(MouseButton::Other(8)), None);
        assert_eq!(
            key_event(ElementState::Released, Key::MouseRight),
            DeviceEvent::KeyReleased(Key::MouseRight)
        );
    }
}
