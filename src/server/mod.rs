//! Server Module
//!
//! TCP server answering WVP lookups against a loaded vector table.

mod config;
mod handler;

pub use config::Config;
pub use handler::Handler;

use crate::metrics::Metrics;
use crate::protocol::WvpCodec;
use crate::table::VectorTable;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::codec::Framed;
use tracing::{debug, error, info};

/// Word vector lookup server.
///
/// The table is loaded before the server is built and is shared read-only
/// with every connection task.
pub struct Server {
    config: Config,
    table: Arc<VectorTable>,
    metrics: Arc<Metrics>,
}

impl Server {
    /// Create a new server for an already loaded table
    pub fn new(config: Config, table: Arc<VectorTable>) -> Self {
        Self {
            config,
            table,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Bind the configured address and serve until Ctrl-C
    pub async fn run(self) -> std::io::Result<()> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr).await?;

        info!("Word vector server listening on {}", addr);

        self.serve_with_shutdown(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Serve connections from an existing listener forever
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        self.serve_with_shutdown(listener, std::future::pending()).await
    }

    /// Serve connections until `shutdown` resolves
    pub async fn serve_with_shutdown(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()>,
    ) -> std::io::Result<()> {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down. {}", self.metrics.summary());
                    return Ok(());
                }

                accepted = listener.accept() => match accepted {
                    Ok((socket, peer_addr)) => {
                        info!("New connection from {}", peer_addr);

                        let table = self.table.clone();
                        let metrics = self.metrics.clone();

                        tokio::spawn(async move {
                            let framed = Framed::new(socket, WvpCodec::new());
                            let handler = Handler::new(table, metrics.clone());

                            if let Err(e) = handler.run(framed).await {
                                error!("Connection error from {}: {}", peer_addr, e);
                            }

                            info!("Connection closed: {}", peer_addr);
                            debug!("{}", metrics.summary());
                        });
                    }
                    Err(e) => {
                        error!("Accept error: {}", e);
                    }
                },
            }
        }
    }

    /// Get a reference to the table
    pub fn table(&self) -> &Arc<VectorTable> {
        &self.table
    }

    /// Get metrics reference
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }
}
