//! Accept loop: binds one `TcpListener` and spawns a task per accepted
//! connection, shutting down cleanly on Ctrl-C (spec §5 "Concurrency model").

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::server_info::ServerInfo;
use crate::store::Store;

use super::connection;

/// State shared across every connection task.
pub struct Shared {
    pub store: Store,
    pub config: ServerConfig,
    pub info: ServerInfo,
}

pub async fn run(shared: Arc<Shared>) -> anyhow::Result<()> {
    let bind_addr = if shared.config.bind_addr.is_empty() { "0.0.0.0" } else { &shared.config.bind_addr };
    let addr = format!("{bind_addr}:{}", shared.config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "redikv listening");

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                let shared = Arc::clone(&shared);
                tokio::spawn(async move {
                    connection::serve(stream, peer, shared).await;
                });
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received shutdown signal");
                return Ok(());
            }
        }
    }
}
