//! `dtk` bundles the device crates together with a small interactive showcase.
//!
//! pick a device (`WinitDevice`, `GlfwDevice` with the `glfw` feature, or `HeadlessDevice`),
//! initialize it and hand it to `showcase::run`.
pub use device_backend;
pub use device_backend::*;
#[cfg(feature = "glfw")]
pub use device_window_glfw;
pub use device_window_winit;

pub mod showcase;
