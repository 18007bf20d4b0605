use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::http::connection::{Connection, DEFAULT_READ_BUFFER_SIZE};
use crate::server::handler::Handler;

/// Creates a server that passes every request to `handler`.
///
/// Each call returns an independent server; nothing is shared between them.
pub fn create_server(handler: impl Handler) -> Server {
    Server::new(Arc::new(handler))
}

pub struct Server {
    handler: Arc<dyn Handler>,
    read_buffer_size: usize,
}

impl Server {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        Self {
            handler,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Binds `addr` and serves connections until an accept error occurs.
    pub async fn listen(&self, addr: &str) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        info!("Listening on {}", listener.local_addr()?);

        self.serve(listener).await
    }

    pub async fn serve(&self, listener: TcpListener) -> anyhow::Result<()> {
        loop {
            let (socket, peer) = listener.accept().await?;
            info!("Accepted connection from {}", peer);

            let mut conn = Connection::new(socket, Arc::clone(&self.handler))
                .with_read_buffer_size(self.read_buffer_size);
            tokio::spawn(async move {
                if let Err(e) = conn.run().await {
                    error!("Connection error from {}: {:#}", peer, e);
                }
            });
        }
    }

    /// Drives one already-accepted stream to completion on the current task.
    pub async fn serve_connection<S>(&self, stream: S) -> anyhow::Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut conn = Connection::new(stream, Arc::clone(&self.handler))
            .with_read_buffer_size(self.read_buffer_size);
        conn.run().await
    }
}
