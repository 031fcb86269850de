use device_backend::geometry::{cursor_y, flip_y};
use device_backend::*;
pub use glfw;
use glfw::Action;
use glfw::ClientApiHint;
use glfw::Context;
use glfw::CursorMode;
use glfw::Glfw;
use glfw::SwapInterval;
use glfw::WindowEvent;
use glfw::WindowHint;
use glfw::WindowMode;
use std::sync::mpsc::Receiver;

pub type GlfwCallback = Box<dyn FnOnce(&mut Glfw)>;
pub type WindowCallback = Box<dyn FnOnce(&mut glfw::Window)>;

/// The configuration struct for Glfw Device
///
#[derive(Default)]
pub struct GlfwConfig {
    /// This callback is called with `&mut Glfw` just before creating a window
    pub glfw_callback: Option<GlfwCallback>,
    /// This will be called right after window creation. you can use this to set extra hints
    /// like icons or size limits that the device api doesn't cover.
    pub window_callback: Option<WindowCallback>,
}

pub struct GlfwDevice {
    pub glfw: glfw::Glfw,
    pub events_receiver: Receiver<(f64, WindowEvent)>,
    pub window: glfw::Window,
    pub recorder: InputRecorder,
    pub scroll: ScrollAccumulator,
    /// height of the primary monitor, to flip window rows to bottom left origin.
    pub screen_height: u32,
    /// placement to restore when leaving full screen. `Some` while full screen.
    pub windowed: Option<Geometry>,
    /// our own geometry changes, reported as resized on the next poll
    pub resize_pending: bool,
    pub should_close: bool,
    pub device_config: DeviceConfig,
}

impl Device for GlfwDevice {
    type Configuration = GlfwConfig;
    type WindowType = glfw::Window;

    fn init(config: Self::Configuration, device_config: DeviceConfig) -> Result<Self, DeviceError> {
        let mut glfw_context = glfw::init(glfw::LOG_ERRORS)
            .map_err(|err| DeviceError::Platform(format!("glfw: {err:?}")))?;

        // set hints based on gfx api config
        match device_config.gfx_api_type {
            GfxApiType::GL => {
                glfw_context.window_hint(WindowHint::ClientApi(ClientApiHint::OpenGl));
            }
            GfxApiType::NoApi => {
                glfw_context.window_hint(WindowHint::ClientApi(ClientApiHint::NoApi));
            }
        }
        if let Some(glfw_callback) = config.glfw_callback {
            glfw_callback(&mut glfw_context);
        }
        let [width, height] = device_config.size;
        // create a window
        let (mut window, events_receiver) = glfw_context
            .create_window(width, height, &device_config.title, WindowMode::Windowed)
            .ok_or_else(|| DeviceError::WindowCreation("glfw could not create a window".to_string()))?;
        if let GfxApiType::GL = device_config.gfx_api_type {
            window.make_current();
            glfw_context.set_swap_interval(SwapInterval::Sync(1));
        }
        // set which events you care about
        window.set_all_polling(true);
        if let Some(window_callback) = config.window_callback {
            window_callback(&mut window);
        }
        let screen_height = primary_screen_height(&mut glfw_context).unwrap_or(height);
        tracing::info!(width, height, screen_height, "created glfw window");

        let mut device = Self {
            glfw: glfw_context,
            events_receiver,
            window,
            recorder: InputRecorder::new(),
            scroll: ScrollAccumulator::default(),
            screen_height,
            windowed: None,
            resize_pending: false,
            should_close: false,
            device_config,
        };
        if let Some(geometry) = device.device_config.initial_geometry() {
            device.set_size(geometry);
        }
        if device.device_config.fullscreen {
            device.toggle_full_screen();
        }
        Ok(device)
    }

    fn dispose(self) {
        tracing::info!("disposing glfw device");
        // the window must go before the glfw context.
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
        self.glfw.poll_events();
        let (_, client_height) = self.window.get_size();
        for (_, event) in glfw::flush_messages(&self.events_receiver) {
            if let Some(device_event) = match event {
                WindowEvent::Close => {
                    self.should_close = true;
                    None
                }
                WindowEvent::Focus(focus) => Some(DeviceEvent::Focus(focus)),
                WindowEvent::Pos(..) | WindowEvent::Size(..) => Some(DeviceEvent::Resized),
                WindowEvent::Key(key, _, action, _) => match glfw_to_key(key) {
                    Some(key) => Some(action_event(action, key)),
                    None => {
                        tracing::trace!(?key, "ignoring unmapped key");
                        None
                    }
                },
                WindowEvent::MouseButton(button, action, _) => {
                    glfw_mouse_button_to_key(button).map(|key| action_event(action, key))
                }
                // glfw is positive when rolling away from the user.
                WindowEvent::Scroll(_, y) => match self.scroll.lines(-y) {
                    0 => None,
                    lines => Some(DeviceEvent::Scroll(lines)),
                },
                _rest => None,
            } {
                self.recorder.record(device_event);
            }
        }
        if self.should_close || self.window.should_close() {
            self.should_close = true;
            tracing::info!("glfw window closed");
            return None;
        }
        // glfw cursor events are not sent while the cursor is outside, so always ask.
        let (x, y) = self.window.get_cursor_pos();
        self.recorder.record(DeviceEvent::CursorMoved {
            x: x.round() as i32,
            y: cursor_y(y, client_height.max(0) as u32),
        });
        Some(self.recorder.snapshot())
    }

    fn size(&self) -> Geometry {
        let (x, top) = self.window.get_pos();
        let (w, h) = self.window.get_size();
        let (w, h) = (w.max(0) as u32, h.max(0) as u32);
        Geometry {
            x,
            y: flip_y(top, h, self.screen_height),
            w,
            h,
        }
    }

    fn set_size(&mut self, geometry: Geometry) {
        if self.windowed.is_some() {
            self.windowed = Some(geometry);
            return;
        }
        self.window
            .set_pos(geometry.x, flip_y(geometry.y, geometry.h, self.screen_height));
        self.window.set_size(geometry.w as i32, geometry.h as i32);
        self.resize_pending = true;
        tracing::debug!(?geometry, "window placement changed");
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn is_full_screen(&self) -> bool {
        self.windowed.is_some()
    }

    fn toggle_full_screen(&mut self) {
        match self.windowed.take() {
            Some(geometry) => {
                tracing::debug!(?geometry, "leaving full screen");
                let top = flip_y(geometry.y, geometry.h, self.screen_height);
                self.window.set_monitor(
                    WindowMode::Windowed,
                    geometry.x,
                    top,
                    geometry.w,
                    geometry.h,
                    None,
                );
            }
            None => {
                let windowed = self.size();
                let (x, y) = self.window.get_pos();
                let (w, h) = self.window.get_size();
                let center = (x + w / 2, y + h / 2);
                let window = &mut self.window;
                let entered = self.glfw.with_connected_monitors(|_, monitors| {
                    // glfw lists the primary monitor first.
                    let Some(monitor) = monitors
                        .iter()
                        .find(|monitor| monitor_contains(monitor, center))
                        .or_else(|| monitors.first())
                    else {
                        return false;
                    };
                    let Some(mode) = monitor.get_video_mode() else {
                        return false;
                    };
                    // the monitor's current mode keeps it from switching resolution.
                    window.set_monitor(
                        WindowMode::FullScreen(monitor),
                        0,
                        0,
                        mode.width,
                        mode.height,
                        Some(mode.refresh_rate),
                    );
                    true
                });
                if !entered {
                    tracing::warn!("no monitor to go full screen on");
                    return;
                }
                tracing::debug!("entered full screen");
                self.windowed = Some(windowed);
            }
        }
        self.resize_pending = true;
    }

    fn show_cursor(&mut self, show: bool) {
        // a disabled cursor is hidden and locked to the window.
        self.window.set_cursor_mode(if show {
            CursorMode::Normal
        } else {
            CursorMode::Disabled
        });
    }

    fn set_cursor_at(&mut self, x: i32, y: i32) {
        let (_, height) = self.window.get_size();
        self.window.set_cursor_pos(x as f64, (height - y) as f64);
    }

    fn get_window(&mut self) -> Option<&mut Self::WindowType> {
        Some(&mut self.window)
    }

    fn get_config(&self) -> &DeviceConfig {
        &self.device_config
    }

    fn swap_buffers(&mut self) {
        self.window.swap_buffers()
    }

    fn get_proc_address(&mut self, symbol: &str) -> *const core::ffi::c_void {
        self.window.get_proc_address(symbol)
    }
}

fn primary_screen_height(glfw: &mut Glfw) -> Option<u32> {
    glfw.with_primary_monitor(|_, monitor| {
        monitor
            .and_then(|monitor| monitor.get_video_mode())
            .map(|mode| mode.height)
    })
}

fn monitor_contains(monitor: &glfw::Monitor, point: (i32, i32)) -> bool {
    let Some(mode) = monitor.get_video_mode() else {
        return false;
    };
    let (left, top) = monitor.get_pos();
    rect_contains((left, top, mode.width, mode.height), point)
}

fn rect_contains((left, top, width, height): (i32, i32, u32, u32), (x, y): (i32, i32)) -> bool {
    x >= left && y >= top && x < left + width as i32 && y < top + height as i32
}

fn action_event(action: Action, key: Key) -> DeviceEvent {
    match action {
        Action::Release => DeviceEvent::KeyReleased(key),
        // repeats are dropped by the recorder.
        Action::Press | Action::Repeat => DeviceEvent::KeyPressed(key),
    }
}

fn glfw_mouse_button_to_key(mb: glfw::MouseButton) -> Option<Key> {
    match mb {
        glfw::MouseButton::Button1 => Some(Key::MouseLeft),
        glfw::MouseButton::Button2 => Some(Key::MouseRight),
        glfw::MouseButton::Button3 => Some(Key::MouseMiddle),
        _ => None,
    }
}

/// a function to get the matching device key for a given glfw key. keys without a match are not tracked.
fn glfw_to_key(key: glfw::Key) -> Option<Key> {
    let key = match key {
        glfw::Key::Num0 => Key::Key0,
        glfw::Key::Num1 => Key::Key1,
        glfw::Key::Num2 => Key::Key2,
        glfw::Key::Num3 => Key::Key3,
        glfw::Key::Num4 => Key::Key4,
        glfw::Key::Num5 => Key::Key5,
        glfw::Key::Num6 => Key::Key6,
        glfw::Key::Num7 => Key::Key7,
        glfw::Key::Num8 => Key::Key8,
        glfw::Key::Num9 => Key::Key9,
        glfw::Key::A => Key::A,
        glfw::Key::B => Key::B,
        glfw::Key::C => Key::C,
        glfw::Key::D => Key::D,
        glfw::Key::E => Key::E,
        glfw::Key::F => Key::F,
        glfw::Key::G => Key::G,
        glfw::Key::H => Key::H,
        glfw::Key::I => Key::I,
        glfw::Key::J => Key::J,
        glfw::Key::K => Key::K,
        glfw::Key::L => Key::L,
        glfw::Key::M => Key::M,
        glfw::Key::N => Key::N,
        glfw::Key::O => Key::O,
        glfw::Key::P => Key::P,
        glfw::Key::Q => Key::Q,
        glfw::Key::R => Key::R,
        glfw::Key::S => Key::S,
        glfw::Key::T => Key::T,
        glfw::Key::U => Key::U,
        glfw::Key::V => Key::V,
        glfw::Key::W => Key::W,
        glfw::Key::X => Key::X,
        glfw::Key::Y => Key::Y,
        glfw::Key::Z => Key::Z,
        glfw::Key::Kp0 => Key::Keypad0,
        glfw::Key::Kp1 => Key::Keypad1,
        glfw::Key::Kp2 => Key::Keypad2,
        glfw::Key::Kp3 => Key::Keypad3,
        glfw::Key::Kp4 => Key::Keypad4,
        glfw::Key::Kp5 => Key::Keypad5,
        glfw::Key::Kp6 => Key::Keypad6,
        glfw::Key::Kp7 => Key::Keypad7,
        glfw::Key::Kp8 => Key::Keypad8,
        glfw::Key::Kp9 => Key::Keypad9,
        glfw::Key::KpAdd => Key::KeypadAdd,
        glfw::Key::KpSubtract => Key::KeypadSubtract,
        glfw::Key::KpMultiply => Key::KeypadMultiply,
        glfw::Key::KpDivide => Key::KeypadDivide,
        glfw::Key::KpDecimal => Key::KeypadDecimal,
        glfw::Key::KpEnter => Key::KeypadEnter,
        glfw::Key::KpEqual => Key::KeypadEquals,
        glfw::Key::Equal => Key::Equals,
        glfw::Key::Comma => Key::Comma,
        glfw::Key::Minus => Key::Minus,
        glfw::Key::Period => Key::Period,
        glfw::Key::Semicolon => Key::Semicolon,
        glfw::Key::Slash => Key::Slash,
        glfw::Key::GraveAccent => Key::Grave,
        glfw::Key::LeftBracket => Key::LBracket,
        glfw::Key::Backslash => Key::Backslash,
        glfw::Key::RightBracket => Key::RBracket,
        glfw::Key::Apostrophe => Key::Apostrophe,
        glfw::Key::Tab => Key::Tab,
        glfw::Key::Space => Key::Space,
        glfw::Key::Insert => Key::Insert,
        glfw::Key::Delete => Key::Delete,
        glfw::Key::Backspace => Key::Backspace,
        glfw::Key::Enter => Key::Enter,
        glfw::Key::Escape => Key::Escape,
        glfw::Key::Pause => Key::Pause,
        glfw::Key::CapsLock => Key::CapsLock,
        glfw::Key::NumLock => Key::NumLock,
        glfw::Key::ScrollLock => Key::ScrollLock,
        glfw::Key::PrintScreen => Key::Snapshot,
        glfw::Key::PageUp => Key::PageUp,
        glfw::Key::PageDown => Key::PageDown,
        glfw::Key::Home => Key::Home,
        glfw::Key::End => Key::End,
        glfw::Key::Left => Key::Left,
        glfw::Key::Right => Key::Right,
        glfw::Key::Up => Key::Up,
        glfw::Key::Down => Key::Down,
        glfw::Key::LeftShift => Key::LShift,
        glfw::Key::RightShift => Key::RShift,
        glfw::Key::LeftControl => Key::LControl,
        glfw::Key::RightControl => Key::RControl,
        glfw::Key::LeftAlt => Key::LAlt,
        glfw::Key::RightAlt => Key::RAlt,
        glfw::Key::LeftSuper => Key::LSuper,
        glfw::Key::RightSuper => Key::RSuper,
        glfw::Key::F1 => Key::F1,
        glfw::Key::F2 => Key::F2,
        glfw::Key::F3 => Key::F3,
        glfw::Key::F4 => Key::F4,
        glfw::Key::F5 => Key::F5,
        glfw::Key::F6 => Key::F6,
        glfw::Key::F7 => Key::F7,
        glfw::Key::F8 => Key::F8,
        glfw::Key::F9 => Key::F9,
        glfw::Key::F10 => Key::F10,
        glfw::Key::F11 => Key::F11,
        glfw::Key::F12 => Key::F12,
        glfw::Key::F13 => Key::F13,
        glfw::Key::F14 => Key::F14,
        glfw::Key::F15 => Key::F15,
        glfw::Key::F16 => Key::F16,
        glfw::Key::F17 => Key::F17,
        glfw::Key::F18 => Key::F18,
        glfw::Key::F19 => Key::F19,
        glfw::Key::F20 => Key::F20,
        glfw::Key::F21 => Key::F21,
        glfw::Key::F22 => Key::F22,
        glfw::Key::F23 => Key::F23,
        glfw::Key::F24 => Key::F24,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_digits_and_keypad_apart() {
        assert_eq!(glfw_to_key(glfw::Key::Num5), Some(Key::Key5));
        assert_eq!(glfw_to_key(glfw::Key::Kp5), Some(Key::Keypad5));
        assert_eq!(glfw_to_key(glfw::Key::World1), None);
    }

    #[test]
    fn window_center_picks_the_monitor() {
        let primary = (0, 0, 1920, 1080);
        let right = (1920, 0, 2560, 1440);
        assert!(rect_contains(primary, (960, 540)));
        assert!(!rect_contains(primary, (1920, 540)));
        assert!(rect_contains(right, (1920, 540)));
        assert!(!rect_contains(right, (2000, 1440)));
    }

    #[test]
    fn repeats_map_to_presses() {
        assert_eq!(action_event(Action::Repeat, Key::W), DeviceEvent::KeyPressed(Key::W));
        assert_eq!(action_event(Action::Release, Key::W), DeviceEvent::KeyReleased(Key::W));
    }

    #[test]
    fn mouse_buttons_follow_glfw_numbering() {
        assert_eq!(glfw_mouse_button_to_key(glfw::MouseButton::Button1), Some(Key::MouseLeft));
        assert_eq!(glfw_mouse_button_to_key(glfw::MouseButton::Button2), Some(Key::MouseRight));
        assert_eq!(glfw_mouse_button_to_key(glfw::MouseButton::Button3), Some(Key::MouseMiddle));
        assert_eq!(glfw_mouse_button_to_key(glfw::MouseButton::Button8), None);
    }
}
