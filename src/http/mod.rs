//! HTTP/1.x request parsing on raw byte streams.
//!
//! This module turns socket deliveries into one complete request per
//! connection and writes a single response back.
//!
//! # Architecture
//!
//! - **`buffer`**: append-only byte accumulator fed by socket reads
//! - **`parser`**: header scanner and the per-connection parse state machine
//! - **`framer`**: fixed-length / chunked body completion
//! - **`chunked`**: resumable chunked transfer-encoding decoder
//! - **`body`**: content-type aware body decoding (JSON, text, binary)
//! - **`headers`**: case-preserving, case-insensitive header map
//! - **`query`**: path and query string helpers
//! - **`request`**: the parsed request handed to handlers
//! - **`response`**: status codes and the one-shot response handle
//! - **`writer`**: response serialization and socket writes
//! - **`connection`**: per-socket read / dispatch / write loop
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← accumulate bytes, scan head once, frame body
//!        └──────┬──────┘
//!               │ body complete (exactly once)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← decode body, call handler
//!        └──────┬───────────┘
//!               │ handler called send()
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← write status line, headers, body
//!        └──────┬───────────┘
//!               │
//!               ▼
//!            Closed
//! ```
//!
//! Malformed chunked framing keeps the connection in `Reading` with the parser
//! discarding further bytes, so the request is never dispatched.
//!
//! # Example
//!
//! ```no_run
//! use webwire::create_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let server = create_server(|req: &webwire::Request, res: &mut webwire::Response| {
//!         let _ = res.send(format!("you asked for {}", req.path));
//!     });
//!     server.listen("127.0.0.1:8080").await
//! }
//! ```

pub mod body;
pub mod buffer;
pub mod chunked;
pub mod connection;
pub mod framer;
pub mod headers;
pub mod parser;
pub mod query;
pub mod request;
pub mod response;
pub mod writer;
