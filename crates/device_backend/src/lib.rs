//! `device_backend` crate primarily provides the `Device` trait to abstract away the window and input parts of a 3d engine.
//! this allows the engine to use any compatible window backend without caring which os api does the real work.
//!
//! The lifecycle of a device goes like this:
//! 1. the app initializes the device once at startup. this creates the native window (or surface).
//! 2. every tick, the app polls the device. the device pumps the native event queue and hands back an `Input` snapshot.
//! 3. once the user (or the os) closes the window, polling returns `None`. the app stops and disposes the device.
//!
//! ```rust
//! use device_backend::{Device, HeadlessDevice, Key};
//! let mut device = HeadlessDevice::init(Default::default(), Default::default()).unwrap();
//! device.request_close();
//! while let Some(input) = device.poll_input() {
//!     if input.pressed(Key::X) {
//!         break;
//!     }
//! }
//! device.dispose();
//! ```
//!
//! widgets like buttons, panels, dialogs etc.. are the application's business. this crate only deals with
//! the window itself and keyboard / mouse / touch polling.
//!
//! this crate provides:
//! 1. `Device`: implemented by window backends like winit, glfw or the `HeadlessDevice` in this crate.
//! 2. `Input`: the per-poll snapshot. look at its docs for the pressed duration encoding.
//! 3. `InputRecorder`: the bookkeeping shared by all backends to turn native events into `Input` snapshots.

mod error;
pub mod geometry;
mod headless;
mod input;

pub use error::*;
pub use geometry::Geometry;
pub use headless::*;
pub use input::*;

/// Intended to provide a common struct which all window backends accept as their configuration.
/// backend specific options live in `Device::Configuration` instead.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// window title. can be changed later with `Device::set_title`
    pub title: String,
    /// initial drawable area size in pixels
    pub size: [u32; 2],
    /// initial position of the drawable area, relative to the bottom left of the screen.
    /// `None` lets the os decide.
    pub position: Option<[i32; 2]>,
    /// start in full screen mode
    pub fullscreen: bool,
    /// The kind of graphics api that we plan to use the window with
    pub gfx_api_type: GfxApiType,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            title: "dtk window".to_string(),
            size: [600, 400],
            position: None,
            fullscreen: false,
            gfx_api_type: GfxApiType::default(),
        }
    }
}

impl DeviceConfig {
    /// the initial geometry if a position was requested.
    pub fn initial_geometry(&self) -> Option<Geometry> {
        self.position.map(|[x, y]| Geometry {
            x,
            y,
            w: self.size[0],
            h: self.size[1],
        })
    }
}

/// Gfx Apis like Opengl require some special config while creating a window.
/// OTOH, modern APIs like metal/vk/dx deal with configuration themselves after creating a window.
/// So, we need to tell the device whether we want a Gl or Non-GL kinda window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GfxApiType {
    /// the renderer will choose the api (vk/dx/mtl etc..) and create its own surface from the window.
    #[default]
    NoApi,
    /// This means that we require a GL context.
    /// on glfw, it means the device will create the context and make it current.
    /// the renderer will use the functions `get_proc_address` and `swap_buffers`.
    GL,
}

/// Implement this trait for your windowing backend. the main responsibility of a
/// Device is to
/// 1. own exactly one native window (or full screen surface) and release it on `dispose`
/// 2. poll native events and turn them into an `Input` snapshot every tick
/// 3. answer geometry queries and apply geometry / title / full screen / cursor changes
///
/// All coordinates use pixels with the origin at the bottom left, x to the right and y up.
/// Mobile-like devices are always full screen at x = y = 0.
///
/// A device is owned by a single control thread for its whole lifetime.
pub trait Device: Sized {
    /// This will be the device's backend specific configuration. if necessary, just add Boxed closures as its
    /// fields and run them before window creation, after window creation etc.. to provide maximum
    /// configurability to users
    type Configuration: Default + Sized;
    /// the native window of this backend. renderers can use it to create surfaces or contexts.
    type WindowType;

    /// Initialize the device and allocate os resources.
    /// An error here means the platform could not give us a window. most apps can't do anything useful after that.
    fn init(config: Self::Configuration, device_config: DeviceConfig) -> Result<Self, DeviceError>;

    /// Stop the device and release the os resources. consumes the device, so it can only happen once.
    fn dispose(self);

    /// Fetches the user input since the last call. Expected to be called once per tick.
    /// Never blocks waiting for events.
    ///
    /// Returns `None` once the window has been closed by the user or the os.
    /// Every call after that returns `None` as well and the app is expected to dispose the device.
    fn poll_input(&mut self) -> Option<Input>;

    /// Returns the position and size of the drawable area.
    fn size(&self) -> Geometry;

    /// Moves and resizes the drawable area. Used to restore placement from preferences.
    /// While full screen, this only updates the placement restored on leaving full screen.
    fn set_size(&mut self, geometry: Geometry);

    /// Expected to be called once on startup.
    fn set_title(&mut self, title: &str);

    /// Returns true if the window is full screen.
    fn is_full_screen(&self) -> bool;

    /// Flips between full screen and windowed. The next snapshot reports `resized`.
    fn toggle_full_screen(&mut self);

    /// Displays or hides the cursor. a hidden cursor is also kept inside the window.
    fn show_cursor(&mut self, show: bool);

    /// Places the cursor at the given window location.
    fn set_cursor_at(&mut self, x: i32, y: i32);

    /// This gives us the native window of this particular backend.
    /// if this is None, the backend has no window (eg: headless).
    fn get_window(&mut self) -> Option<&mut Self::WindowType>;

    /// the shared config this device was created with.
    fn get_config(&self) -> &DeviceConfig;

    /// optional. only implemented by gl windowing libraries like glfw which hold the gl context with the window.
    /// panic! if your Device doesn't implement this functionality (eg: winit)
    fn swap_buffers(&mut self) {
        unimplemented!("swap buffers is not implemented for this device");
    }

    /// get openGL function addresses. optional, just like `Self::swap_buffers`.
    /// panic! if it doesn't apply to your Device. eg: winit.
    fn get_proc_address(&mut self, symbol: &str) -> *const core::ffi::c_void {
        unimplemented!("get_proc_address is not implemented for this device. called with {symbol}");
    }
}
