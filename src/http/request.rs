use std::collections::HashMap;

use bytes::Bytes;

use crate::http::body::{decode_body, Body};
use crate::http::headers::Headers;
use crate::http::parser::{framing_mode, parse_content_length, RawRequest, RequestHead};
use crate::http::query::{get_path, parse_query};

/// HTTP request methods known to the router.
///
/// Requests carry their method as the raw string from the request line; this
/// enum is what routes are registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// # Example
    ///
    /// ```
    /// # use webwire::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "HEAD" => Some(Method::HEAD),
            "OPTIONS" => Some(Method::OPTIONS),
            "PATCH" => Some(Method::PATCH),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
        }
    }
}

/// A fully received and decoded request.
///
/// Request line fields are passed through as received, so any of them may be
/// empty for a garbled request line.
#[derive(Debug)]
pub struct Request {
    pub method: String,
    /// Request target as received, query string included
    pub url: String,
    /// Request target without the query string
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: Headers,
    /// Protocol token from the request line (e.g. "HTTP/1.1")
    pub version: String,
    pub request_line: String,
    pub body: Body,
    /// Body bytes as framed on the wire, before content-type decoding
    pub raw_body: Bytes,
    /// Set when a JSON body failed to parse; `body` then holds the raw text
    pub parse_error: Option<serde_json::Error>,
}

impl Request {
    /// Decodes the body of a framed request and derives path and query.
    pub fn from_raw(raw: RawRequest) -> Self {
        let RawRequest { head, body } = raw;
        let RequestHead {
            request_line,
            method,
            target,
            version,
            headers,
            ..
        } = head;

        let decoded = decode_body(&body, headers.get("Content-Type"));

        Self {
            path: get_path(&target).to_string(),
            query: parse_query(&target),
            method,
            url: target,
            headers,
            version,
            request_line,
            body: decoded.body,
            raw_body: body,
            parse_error: decoded.parse_error,
        }
    }

    /// Retrieves a header value by name, ignoring case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// The Content-Length value the body was framed with.
    ///
    /// Only the leading digits count; a missing header or one with no digits
    /// gives 0.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .map(parse_content_length)
            .unwrap_or(0)
    }

    /// The method as a known [`Method`], if it is one.
    pub fn known_method(&self) -> Option<Method> {
        Method::from_str(&self.method)
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

/// Builder for constructing Request objects without going through a socket.
///
/// The built request runs through the same body decoding as a parsed one.
pub struct RequestBuilder {
    method: Option<String>,
    url: Option<String>,
    version: Option<String>,
    headers: Headers,
    body: Bytes,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            url: None,
            version: None,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method.as_str().to_string());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let method = self.method.ok_or("method missing")?;
        let target = self.url.ok_or("url missing")?;
        let version = self.version.unwrap_or_else(|| "HTTP/1.1".to_string());
        let framing = framing_mode(&self.headers);

        let head = RequestHead {
            request_line: format!("{method} {target} {version}"),
            method,
            target,
            version,
            headers: self.headers,
            framing,
            header_end: 0,
        };

        Ok(Request::from_raw(RawRequest {
            head,
            body: self.body,
        }))
    }
}
