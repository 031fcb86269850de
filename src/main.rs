use device_backend::Device;
use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt};

#[cfg(not(feature = "glfw"))]
type DB = device_window_winit::WinitDevice;
#[cfg(feature = "glfw")]
type DB = device_window_glfw::GlfwDevice;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let device = DB::init(Default::default(), Default::default())?;
    tracing::info!(config = ?device.get_config(), "device ready");
    let mut out = std::io::stdout().lock();
    dtk::showcase::run(device, &mut out)
}
