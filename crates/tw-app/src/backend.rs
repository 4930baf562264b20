use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::context::ServiceContext;

pub mod routes;
pub mod schemas;

pub async fn serve(ctx: Arc<ServiceContext>) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], ctx.config.port));
    let app = Router::new().merge(routes::api_routes()).with_state(ctx);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .context("server error")
}
