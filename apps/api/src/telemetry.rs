use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. A `RUST_LOG` filter directive in the
/// environment wins; otherwise `level` applies to this library, the calling
/// binary (`bin_crate`, pass `env!("CARGO_CRATE_NAME")`) and the HTTP trace layer.
pub fn init_tracing(level: &str, bin_crate: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{lib}={level},{bin_crate}={level},tower_http={level}",
                lib = env!("CARGO_CRATE_NAME")
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
