//! API binary: property photo pipeline and secure share links.

use mimalloc::MiMalloc;
use propmedia_core::Config;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod error;
mod handlers;
mod setup;
mod state;
mod utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup::telemetry::init_telemetry();

    let config = Config::from_env()?;
    let port = config.server_port();

    let app = setup::initialize_app(config).await?;
    setup::server::start_server(app, port).await
}
