mod backend;
mod cache;
mod config;
mod context;
mod coordinator;
mod error;
mod janitor;
mod providers;
mod resolver;
mod story;

use anyhow::Result;

use crate::config::AppConfig;
use crate::context::ServiceContext;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::load()?;
    let ctx = ServiceContext::new(config)?;
    let (janitor_handle, janitor_shutdown) = ctx.spawn_janitor();

    backend::serve(ctx).await?;

    let _ = janitor_shutdown.send(true);
    let _ = janitor_handle.await;
    Ok(())
}
