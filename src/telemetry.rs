use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn init_subscriber() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();
}
