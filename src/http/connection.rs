use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, trace, warn};

use crate::http::parser::{Progress, RawRequest, RequestParser};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::server::handler::Handler;

pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// One accepted connection: reads a single request, dispatches it, writes the
/// reply and closes.
pub struct Connection<S> {
    stream: S,
    parser: RequestParser,
    handler: Arc<dyn Handler>,
    read_buffer_size: usize,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Box<RawRequest>),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, handler: Arc<dyn Handler>) -> Self {
        Self {
            stream,
            parser: RequestParser::new(),
            handler,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            state: ConnectionState::Reading,
        }
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    self.state = match self.read_request().await? {
                        Some(raw) => ConnectionState::Processing(raw),
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::Processing(_) => {
                    let ConnectionState::Processing(raw) =
                        std::mem::replace(&mut self.state, ConnectionState::Closed)
                    else {
                        continue;
                    };
                    if let Some(writer) = self.dispatch(*raw) {
                        self.state = ConnectionState::Writing(writer);
                    }
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        self.stream
            .shutdown()
            .await
            .context("failed to close connection")?;
        Ok(())
    }

    /// Reads until the parser yields a request or the peer closes.
    ///
    /// Malformed chunked framing is logged once; the connection then keeps
    /// draining the socket without ever dispatching.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Box<RawRequest>>> {
        let mut temp = vec![0u8; self.read_buffer_size];

        loop {
            let n = self
                .stream
                .read(&mut temp)
                .await
                .context("failed to read from socket")?;

            if n == 0 {
                // Client closed connection
                if !self.parser.is_dispatched() && self.parser.buffered() > 0 {
                    debug!(
                        buffered = self.parser.buffered(),
                        headers_parsed = self.parser.headers_parsed(),
                        "peer closed before request completed"
                    );
                }
                return Ok(None);
            }

            trace!(bytes = n, "read from socket");

            match self.parser.feed(&temp[..n]) {
                Progress::Ready(raw) => return Ok(Some(raw)),
                Progress::Pending | Progress::Ignored => {}
                Progress::Malformed(err) => {
                    warn!(error = %err, "malformed chunked body, request will not be dispatched");
                }
            }
        }
    }

    fn dispatch(&self, raw: RawRequest) -> Option<ResponseWriter> {
        let req = Request::from_raw(raw);
        let mut res = Response::new();

        if let Some(err) = &req.parse_error {
            debug!(error = %err, "request body is not valid JSON");
        }

        self.handler.handle(&req, &mut res);

        match res.take_outgoing() {
            Some(bytes) => {
                info!(
                    method = %req.method,
                    path = %req.path,
                    status = res.status_code().as_u16(),
                    "request handled"
                );
                Some(ResponseWriter::new(bytes))
            }
            None => {
                warn!(
                    method = %req.method,
                    path = %req.path,
                    "handler returned without sending a response"
                );
                None
            }
        }
    }
}
