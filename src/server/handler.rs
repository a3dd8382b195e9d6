//! Connection Handler
//!
//! Processes WVP frames and answers lookups from the shared table.

use crate::metrics::Metrics;
use crate::protocol::{Command, Response, VectorReply, WvpCodec};
use crate::table::VectorTable;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tracing::debug;

/// Connection handler
pub struct Handler {
    table: Arc<VectorTable>,
    metrics: Arc<Metrics>,
}

impl Handler {
    /// Create a new handler
    pub fn new(table: Arc<VectorTable>, metrics: Arc<Metrics>) -> Self {
        Self { table, metrics }
    }

    /// Run the handler for a connection until the peer closes it
    pub async fn run<T>(self, mut framed: Framed<T, WvpCodec>) -> std::io::Result<()>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        while let Some(result) = framed.next().await {
            let frame = result?;
            let start = Instant::now();
            let request_id = frame.header.request_id;

            let (name, response) = match Command::from_frame(&frame) {
                Ok(cmd) => (cmd.name(), self.execute(cmd)),
                Err(e) => ("INVALID", Response::Error(e.to_string())),
            };

            let elapsed = start.elapsed();
            self.metrics.record_operation(name, elapsed);
            debug!(cmd = name, request_id, latency = ?elapsed, "Command executed");

            framed.send(response.to_frame(request_id)).await?;
        }

        Ok(())
    }

    /// Execute a command and return response
    fn execute(&self, cmd: Command) -> Response {
        match cmd {
            Command::Ping => Response::Pong,

            Command::GetVector { word } => {
                let result = self.table.lookup(&word);
                self.metrics.record_lookup(result.found);
                Response::Vector(VectorReply::from_lookup(&word, &result))
            }
        }
    }
}
