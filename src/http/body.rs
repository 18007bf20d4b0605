//! Content-type aware request body decoding.

use bytes::Bytes;

/// A request body after content-type decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// JSON content type with no body bytes
    Empty,
    Json(serde_json::Value),
    Text(String),
    Binary(Bytes),
}

impl Body {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Body::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Body::Empty => true,
            Body::Json(_) => false,
            Body::Text(text) => text.is_empty(),
            Body::Binary(bytes) => bytes.is_empty(),
        }
    }
}

/// Decoded body plus the JSON error, if the body claimed to be JSON and was not.
#[derive(Debug)]
pub struct DecodedBody {
    pub body: Body,
    pub parse_error: Option<serde_json::Error>,
}

fn is_json(content_type: &str) -> bool {
    content_type.contains("application/json")
}

/// Returns true when a body of this content type should be handed out as text.
///
/// A missing or empty content type counts as text.
pub fn is_text_content(content_type: Option<&str>) -> bool {
    let Some(ct) = content_type.filter(|ct| !ct.is_empty()) else {
        return true;
    };
    let ct = ct.to_ascii_lowercase();

    ct.starts_with("text/")
        || is_json(&ct)
        || ct.contains("application/xml")
        || ct.contains("application/javascript")
        || ct.contains("application/x-www-form-urlencoded")
}

/// Decodes raw body bytes according to the declared content type.
///
/// Invalid JSON is not an error for the caller: the original text is kept as
/// the body and the syntax error is returned next to it. Text is decoded as
/// UTF-8 with invalid sequences replaced.
pub fn decode_body(raw: &[u8], content_type: Option<&str>) -> DecodedBody {
    let ct = content_type.unwrap_or_default().to_ascii_lowercase();

    if is_json(&ct) {
        if raw.is_empty() {
            return DecodedBody {
                body: Body::Empty,
                parse_error: None,
            };
        }
        let text = String::from_utf8_lossy(raw);
        return match serde_json::from_str(&text) {
            Ok(value) => DecodedBody {
                body: Body::Json(value),
                parse_error: None,
            },
            Err(err) => DecodedBody {
                body: Body::Text(text.into_owned()),
                parse_error: Some(err),
            },
        };
    }

    let body = if is_text_content(Some(ct.as_str())) {
        Body::Text(String::from_utf8_lossy(raw).into_owned())
    } else {
        Body::Binary(Bytes::copy_from_slice(raw))
    };

    DecodedBody {
        body,
        parse_error: None,
    }
}
