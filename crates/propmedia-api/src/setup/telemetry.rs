use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize tracing with an env-driven filter. `RUST_LOG` wins; the default
/// keeps the subsystem and tower-http chatty in development.
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "propmedia=debug,propmedia_api=debug,tower_http=debug,axum=info".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
