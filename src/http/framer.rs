use bytes::Bytes;

use crate::http::chunked::ChunkedDecoder;
use crate::http::parser::{FramingMode, ParseError};

/// Result of looking at the body region received so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Framing {
    Incomplete,
    Complete(Bytes),
    Malformed(ParseError),
}

/// Decides when the body is complete and extracts it.
///
/// `advance` is called with the whole body region (everything after the
/// header terminator) on every delivery. The region only ever grows.
#[derive(Debug, Clone)]
pub enum BodyFramer {
    FixedLength(usize),
    Chunked(ChunkedDecoder),
}

impl BodyFramer {
    pub fn new(mode: FramingMode) -> Self {
        match mode {
            FramingMode::FixedLength(len) => BodyFramer::FixedLength(len),
            FramingMode::Chunked => BodyFramer::Chunked(ChunkedDecoder::new()),
        }
    }

    pub fn advance(&mut self, region: &[u8]) -> Framing {
        match self {
            // Bytes past the declared length are dropped; there is no pipelining.
            BodyFramer::FixedLength(len) if region.len() >= *len => {
                Framing::Complete(Bytes::copy_from_slice(&region[..*len]))
            }
            BodyFramer::FixedLength(_) => Framing::Incomplete,
            BodyFramer::Chunked(decoder) => decoder.decode(region),
        }
    }
}
