use bytes::Bytes;
use tracing::{debug, trace};

use crate::http::buffer::ByteAccumulator;
use crate::http::framer::{BodyFramer, Framing};
use crate::http::headers::Headers;

const HEADERS_END: &[u8; 4] = b"\r\n\r\n";

/// Framing errors that stop a request from ever completing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid chunk size line {0:?}")]
    InvalidChunkSize(String),
    #[error("chunk size {0:?} does not fit in memory")]
    ChunkTooLarge(String),
    #[error("chunk of {0} bytes is not followed by CRLF")]
    MissingChunkTerminator(usize),
}

/// How the end of the body is determined, decided once from the headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingMode {
    FixedLength(usize),
    Chunked,
}

/// Request line and headers, parsed once the header terminator is seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    /// The first line exactly as received (lossily decoded)
    pub request_line: String,
    pub method: String,
    /// Raw request target, query string included
    pub target: String,
    pub version: String,
    pub headers: Headers,
    pub framing: FramingMode,
    /// Offset of the CRLFCRLF that terminates the header section
    pub header_end: usize,
}

impl RequestHead {
    /// Offset of the first body byte.
    pub fn body_start(&self) -> usize {
        self.header_end + HEADERS_END.len()
    }
}

/// A fully framed request, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    pub head: RequestHead,
    pub body: Bytes,
}

/// Outcome of feeding one delivery into a [`RequestParser`].
#[derive(Debug)]
pub enum Progress {
    /// More bytes are needed.
    Pending,
    /// The request is complete. Returned exactly once per parser.
    Ready(Box<RawRequest>),
    /// The body framing is broken; the request will never complete.
    /// Returned once, on the delivery that exposed the problem.
    Malformed(ParseError),
    /// The parser already finished (or failed); the bytes were discarded.
    Ignored,
}

#[derive(Debug)]
enum Stage {
    Head,
    Body { head: RequestHead, framer: BodyFramer },
    Dispatched,
    Failed,
}

/// Per-connection parse state.
///
/// Accumulates deliveries, scans the header section exactly once and then
/// advances the body framer on every delivery until the request completes.
#[derive(Debug)]
pub struct RequestParser {
    buffer: ByteAccumulator,
    stage: Stage,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            buffer: ByteAccumulator::new(),
            stage: Stage::Head,
        }
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Progress {
        if matches!(self.stage, Stage::Dispatched | Stage::Failed) {
            trace!(bytes = chunk.len(), "discarding bytes after request completion");
            return Progress::Ignored;
        }

        self.buffer.append(chunk);

        if let Stage::Head = self.stage {
            let Some(head) = scan_head(self.buffer.as_bytes()) else {
                return Progress::Pending;
            };
            debug!(
                method = %head.method,
                target = %head.target,
                framing = ?head.framing,
                "request head parsed"
            );
            let framer = BodyFramer::new(head.framing);
            self.stage = Stage::Body { head, framer };
        }

        let outcome = match &mut self.stage {
            Stage::Body { head, framer } => {
                framer.advance(&self.buffer.as_bytes()[head.body_start()..])
            }
            _ => return Progress::Pending,
        };

        match outcome {
            Framing::Incomplete => Progress::Pending,
            Framing::Complete(body) => match std::mem::replace(&mut self.stage, Stage::Dispatched) {
                Stage::Body { head, .. } => {
                    debug!(body_len = body.len(), "request body complete");
                    Progress::Ready(Box::new(RawRequest { head, body }))
                }
                _ => Progress::Ignored,
            },
            Framing::Malformed(err) => {
                self.stage = Stage::Failed;
                Progress::Malformed(err)
            }
        }
    }

    pub fn headers_parsed(&self) -> bool {
        !matches!(self.stage, Stage::Head)
    }

    /// Offset of the header terminator, once it has been found.
    pub fn header_end(&self) -> Option<usize> {
        match &self.stage {
            Stage::Body { head, .. } => Some(head.header_end),
            _ => None,
        }
    }

    pub fn is_dispatched(&self) -> bool {
        matches!(self.stage, Stage::Dispatched)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.stage, Stage::Failed)
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADERS_END.len()).position(|w| w == HEADERS_END)
}

/// Parses the request line and headers if the header terminator is present.
///
/// Missing request line parts become empty strings and header lines without
/// a colon are skipped; nothing in the head is treated as an error.
pub fn scan_head(buf: &[u8]) -> Option<RequestHead> {
    let header_end = find_headers_end(buf)?;
    let section = String::from_utf8_lossy(&buf[..header_end]);

    let mut lines = section.split("\r\n");
    let request_line = lines.next().unwrap_or_default();

    let mut parts = request_line.split(' ');
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();
    let version = parts.next().unwrap_or_default().to_string();

    let headers: Headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name, value.trim()))
        .collect();

    let framing = framing_mode(&headers);

    Some(RequestHead {
        request_line: request_line.to_string(),
        method,
        target,
        version,
        headers,
        framing,
        header_end,
    })
}

pub fn framing_mode(headers: &Headers) -> FramingMode {
    let chunked = headers
        .get("Transfer-Encoding")
        .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"));

    if chunked {
        FramingMode::Chunked
    } else {
        FramingMode::FixedLength(
            headers
                .get("Content-Length")
                .map(parse_content_length)
                .unwrap_or(0),
        )
    }
}

/// Reads the leading decimal digits of a Content-Length value.
///
/// No digits yields 0. A value too large for `usize` saturates, which leaves
/// the request waiting for bytes that will not arrive.
pub(crate) fn parse_content_length(value: &str) -> usize {
    value
        .trim_start()
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0usize, |acc, digit| {
            acc.saturating_mul(10).saturating_add(usize::from(digit - b'0'))
        })
}
