use crate::GfxApiType;

/// Reasons a device could not be initialized.
///
/// Once a device is running, there are only two outcomes for a poll: a snapshot, or the window is gone.
/// So, this is only returned from `Device::init`.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// the windowing library itself failed to start (no display server, missing drivers..)
    #[error("failed to initialize the windowing platform: {0}")]
    Platform(String),
    /// the platform is fine, but refused to give us a window.
    #[error("failed to create a window: {0}")]
    WindowCreation(String),
    /// eg: asking winit for an opengl context.
    #[error("{backend} device does not support the {api:?} graphics api")]
    UnsupportedGfxApi {
        backend: &'static str,
        api: GfxApiType,
    },
}
