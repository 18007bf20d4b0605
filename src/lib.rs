//! webwire - incremental HTTP/1.x request parsing on raw sockets
//!
//! Accepts raw byte connections, assembles one request per connection
//! (fixed-length or chunked bodies, content-type aware decoding) and hands it
//! to a handler, with a small path-template router on the side.

pub mod config;
pub mod http;
pub mod router;
pub mod server;

pub use http::body::{decode_body, is_text_content, Body, DecodedBody};
pub use http::headers::Headers;
pub use http::query::{get_path, parse_query};
pub use http::request::{Method, Request};
pub use http::response::{Response, SendError, StatusCode};
pub use router::{match_path, RouteMatch, Router};
pub use server::{create_server, Handler, Server};
