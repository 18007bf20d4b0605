use bytes::Bytes;

use crate::http::headers::Headers;
use crate::http::writer::serialize_response;

/// Numeric HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    pub const fn from_u16(code: u16) -> Self {
        StatusCode(code)
    }

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use webwire::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// assert_eq!(StatusCode::NOT_FOUND.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the standard reason phrase, or "Unknown" for unlisted codes.
    ///
    /// # Example
    ///
    /// ```
    /// # use webwire::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::from_u16(418).reason_phrase(), "I'm a teapot");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            100 => "Continue",
            101 => "Switching Protocols",
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            206 => "Partial Content",
            301 => "Moved Permanently",
            302 => "Found",
            303 => "See Other",
            304 => "Not Modified",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            408 => "Request Timeout",
            409 => "Conflict",
            411 => "Length Required",
            413 => "Payload Too Large",
            415 => "Unsupported Media Type",
            418 => "I'm a teapot",
            422 => "Unprocessable Entity",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "Unknown",
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("response has already been sent")]
    AlreadySent,
}

/// Response handle given to a request handler.
///
/// Status, reason and headers can be changed freely until [`Response::send`]
/// is called. `send` serializes the response once; the connection writes
/// those bytes and closes as soon as the handler returns.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    status_text: Option<String>,
    version: String,
    headers: Headers,
    outgoing: Option<Vec<u8>>,
    sent: bool,
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl Response {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            status_text: None,
            version: "1.0".to_string(),
            headers: Headers::new(),
            outgoing: None,
            sent: false,
        }
    }

    pub fn status(&mut self, status: impl Into<StatusCode>) -> &mut Self {
        self.status = status.into();
        self
    }

    /// Overrides the reason phrase derived from the status code.
    pub fn status_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.status_text = Some(text.into());
        self
    }

    /// Sets the protocol version written in the status line (without `HTTP/`).
    pub fn version(&mut self, version: impl Into<String>) -> &mut Self {
        self.version = version.into();
        self
    }

    /// Adds or replaces a reply header. Replaces a default of the same name.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the status and replaces all reply headers set so far.
    pub fn write_head<I, K, V>(&mut self, status: impl Into<StatusCode>, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.status = status.into();
        self.headers = headers.into_iter().collect();
        self
    }

    /// Commits the response with the given body.
    ///
    /// Only the first call has an effect; later calls return
    /// [`SendError::AlreadySent`] and leave the committed bytes untouched.
    pub fn send(&mut self, body: impl Into<Bytes>) -> Result<(), SendError> {
        if self.is_sent() {
            return Err(SendError::AlreadySent);
        }
        self.sent = true;

        let body = body.into();
        self.outgoing = Some(serialize_response(
            &self.version,
            self.status,
            self.reason(),
            &self.headers,
            &body,
            std::time::SystemTime::now(),
        ));
        Ok(())
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn reason(&self) -> &str {
        self.status_text
            .as_deref()
            .unwrap_or_else(|| self.status.reason_phrase())
    }

    pub fn reply_headers(&self) -> &Headers {
        &self.headers
    }

    /// Serialized response bytes, available once after `send`.
    pub fn take_outgoing(&mut self) -> Option<Vec<u8>> {
        self.outgoing.take()
    }
}
