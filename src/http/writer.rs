use std::time::SystemTime;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::Headers;
use crate::http::response::StatusCode;

/// Serializes a status line, headers and body.
///
/// `Date`, `Content-Type: text/html` and `Content-Length` are written first
/// unless `headers` sets the same name, in which case the explicit value
/// takes the default's place.
pub fn serialize_response(
    version: &str,
    status: StatusCode,
    reason: &str,
    headers: &Headers,
    body: &[u8],
    now: SystemTime,
) -> Vec<u8> {
    let mut all = Headers::new();
    all.insert("Date", httpdate::fmt_http_date(now));
    all.insert("Content-Type", "text/html");
    all.insert("Content-Length", body.len().to_string());
    for (name, value) in headers.iter() {
        all.insert(name, value);
    }

    let mut buf = Vec::with_capacity(128 + body.len());

    // Status line
    let status_line = format!("HTTP/{} {} {}\r\n", version, status.as_u16(), reason);
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in all.iter() {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(body);

    buf
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(buffer: Vec<u8>) -> Self {
        Self { buffer, written: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.written
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
