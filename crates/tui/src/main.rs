mod app;
mod backend;
mod client;
mod config;
mod error;
mod logging;
mod quick_add;
mod ui;

use crate::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    logging::init(&config)?;
    tracing::info!(demo = config.demo, base_url = %config.base_url, "starting moneta");

    let today = chrono::Utc::now().with_timezone(&config.tz()?).date_naive();
    let backend = backend::Backend::from_config(&config, today)?;
    let mut app = app::App::new(config, backend, today).await?;
    app.run().await?;
    Ok(())
}
