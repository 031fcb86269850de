use std::collections::VecDeque;

use crate::{Device, DeviceConfig, DeviceError, DeviceEvent, GfxApiType, Geometry, Input, InputRecorder};

/// config that you provide to the headless device
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// size of the virtual screen the window lives on.
    pub screen_size: [u32; 2],
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            screen_size: [1920, 1080],
        }
    }
}

/// A device without a native window.
///
/// It keeps the same bookkeeping as a real window on a virtual screen: placement, title,
/// full screen toggling and the cursor. Input is whatever was scripted with `push_event`.
/// Useful for servers, CI and for testing code written against `Device`.
#[derive(Debug)]
pub struct HeadlessDevice {
    config: DeviceConfig,
    screen_size: [u32; 2],
    geometry: Geometry,
    /// placement to restore when leaving full screen.
    windowed: Option<Geometry>,
    title: String,
    cursor_visible: bool,
    recorder: InputRecorder,
    /// events delivered on the next poll.
    pending: VecDeque<DeviceEvent>,
    close_requested: bool,
    closed: bool,
}

impl Device for HeadlessDevice {
    type Configuration = HeadlessConfig;
    type WindowType = ();

    fn init(config: Self::Configuration, device_config: DeviceConfig) -> Result<Self, DeviceError> {
        if device_config.gfx_api_type == GfxApiType::GL {
            return Err(DeviceError::UnsupportedGfxApi {
                backend: "headless",
                api: GfxApiType::GL,
            });
        }
        let [screen_w, screen_h] = config.screen_size;
        let [w, h] = device_config.size;
        // centered unless asked otherwise, like most window managers do.
        let geometry = device_config.initial_geometry().unwrap_or(Geometry {
            x: (screen_w as i32 - w as i32) / 2,
            y: (screen_h as i32 - h as i32) / 2,
            w,
            h,
        });
        let mut device = Self {
            title: device_config.title.clone(),
            config: device_config,
            screen_size: config.screen_size,
            geometry,
            windowed: None,
            cursor_visible: true,
            recorder: InputRecorder::new(),
            pending: VecDeque::new(),
            close_requested: false,
            closed: false,
        };
        if device.config.fullscreen {
            device.toggle_full_screen();
        }
        tracing::info!(?geometry, "headless device initialized");
        Ok(device)
    }

    fn dispose(self) {
        tracing::info!(title = %self.title, "headless device disposed");
    }

    fn poll_input(&mut self) -> Option<Input> {
        if self.closed {
            return None;
        }
        if self.close_requested && self.pending.is_empty() {
            self.closed = true;
            tracing::debug!("headless window closed");
            return None;
        }
        self.recorder.begin_poll();
        while let Some(event) = self.pending.pop_front() {
            self.recorder.record(event);
        }
        Some(self.recorder.snapshot())
    }

    fn size(&self) -> Geometry {
        self.geometry
    }

    fn set_size(&mut self, geometry: Geometry) {
        if self.windowed.is_some() {
            self.windowed = Some(geometry);
            return;
        }
        if self.geometry != geometry {
            self.geometry = geometry;
            self.pending.push_back(DeviceEvent::Resized);
        }
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn is_full_screen(&self) -> bool {
        self.windowed.is_some()
    }

    fn toggle_full_screen(&mut self) {
        match self.windowed.take() {
            Some(windowed) => self.geometry = windowed,
            None => {
                self.windowed = Some(self.geometry);
                let [w, h] = self.screen_size;
                self.geometry = Geometry { x: 0, y: 0, w, h };
            }
        }
        self.pending.push_back(DeviceEvent::Resized);
    }

    fn show_cursor(&mut self, show: bool) {
        self.cursor_visible = show;
    }

    fn set_cursor_at(&mut self, x: i32, y: i32) {
        self.pending.push_back(DeviceEvent::CursorMoved { x, y });
    }

    fn get_window(&mut self) -> Option<&mut Self::WindowType> {
        None
    }

    fn get_config(&self) -> &DeviceConfig {
        &self.config
    }
}

impl HeadlessDevice {
    /// queue an event for the next poll.
    pub fn push_event(&mut self, event: DeviceEvent) {
        self.pending.push_back(event);
    }

    /// behave as if the user closed the window. the first poll after every queued event
    /// has been delivered returns `None`.
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn screen_size(&self) -> [u32; 2] {
        self.screen_size
    }
}
