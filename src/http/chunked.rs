//! Chunked transfer-encoding body decoder.
//!
//! Wire format:
//!
//! ```text
//! <size in hex>[;extension]\r\n
//! <size bytes>\r\n
//! ...
//! 0\r\n
//! \r\n
//! ```
//!
//! The decoder is handed the whole body region on every delivery and resumes
//! from the end of the last chunk it fully consumed. Nothing is committed for
//! a chunk until its size line, payload and trailing CRLF are all present, so
//! the result only depends on the bytes received and never on how they were
//! split across deliveries.

use bytes::BytesMut;

use crate::http::framer::Framing;
use crate::http::parser::ParseError;

const CRLF: &[u8; 2] = b"\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
enum DecodeState {
    Open,
    Finished,
    Failed(ParseError),
}

#[derive(Debug, Clone)]
pub struct ChunkedDecoder {
    /// Offset in the body region of the next size line
    pos: usize,
    body: BytesMut,
    state: DecodeState,
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self {
            pos: 0,
            body: BytesMut::new(),
            state: DecodeState::Open,
        }
    }

    /// Decodes as far as the region allows.
    ///
    /// Once finished or failed the decoder keeps returning the same result.
    pub fn decode(&mut self, region: &[u8]) -> Framing {
        loop {
            match &self.state {
                DecodeState::Finished => return Framing::Complete(self.body.clone().freeze()),
                DecodeState::Failed(err) => return Framing::Malformed(err.clone()),
                DecodeState::Open => {}
            }

            let Some(rest) = region.get(self.pos..) else {
                return Framing::Incomplete;
            };
            let Some(line_end) = find_crlf(rest) else {
                return Framing::Incomplete;
            };

            let size = match parse_chunk_size(&rest[..line_end]) {
                Ok(size) => size,
                Err(err) => {
                    self.state = DecodeState::Failed(err);
                    continue;
                }
            };

            if size == 0 {
                // The trailer section after the last chunk is not inspected.
                self.state = DecodeState::Finished;
                continue;
            }

            let data_start = line_end + CRLF.len();
            let data_end = match data_start.checked_add(size) {
                Some(end) => end,
                None => {
                    self.state =
                        DecodeState::Failed(ParseError::ChunkTooLarge(format!("{size:x}")));
                    continue;
                }
            };

            if rest.len() < data_end.saturating_add(CRLF.len()) {
                return Framing::Incomplete;
            }

            if &rest[data_end..data_end + CRLF.len()] != CRLF {
                self.state = DecodeState::Failed(ParseError::MissingChunkTerminator(size));
                continue;
            }

            self.body.extend_from_slice(&rest[data_start..data_end]);
            self.pos += data_end + CRLF.len();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == DecodeState::Finished
    }

    /// Payload bytes assembled from the chunks consumed so far.
    pub fn decoded_len(&self) -> usize {
        self.body.len()
    }
}

/// Decodes a complete chunked body region from scratch.
pub fn decode_chunked(region: &[u8]) -> Framing {
    ChunkedDecoder::new().decode(region)
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|w| w == CRLF)
}

/// Parses a size line, ignoring any `;extension` suffix and surrounding whitespace.
fn parse_chunk_size(line: &[u8]) -> Result<usize, ParseError> {
    let invalid = || ParseError::InvalidChunkSize(String::from_utf8_lossy(line).into_owned());

    let text = std::str::from_utf8(line).map_err(|_| invalid())?;
    let digits = text.split(';').next().unwrap_or_default().trim();

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    usize::from_str_radix(digits, 16).map_err(|_| ParseError::ChunkTooLarge(digits.to_string()))
}
