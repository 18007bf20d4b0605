//! End-to-end tests driving a connection over an in-memory duplex stream.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use webwire::{create_server, Body, Request, Response, Router, Server};

#[derive(Debug, Clone, PartialEq)]
struct Seen {
    method: String,
    url: String,
    path: String,
    version: String,
    body: Body,
    parse_error: bool,
}

impl Seen {
    fn from(req: &Request) -> Self {
        Self {
            method: req.method.clone(),
            url: req.url.clone(),
            path: req.path.clone(),
            version: req.version.clone(),
            body: req.body.clone(),
            parse_error: req.parse_error.is_some(),
        }
    }
}

/// Server whose handler records every request it sees and echoes the raw body.
fn recording_server(read_buffer_size: usize) -> (Server, Arc<Mutex<Vec<Seen>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    let server = create_server(move |req: &Request, res: &mut Response| {
        log.lock().unwrap().push(Seen::from(req));
        let _ = res.header("Content-Type", "text/plain").send(req.raw_body.clone());
    })
    .with_read_buffer_size(read_buffer_size);

    (server, seen)
}

/// Writes `parts` one at a time with a pause between them, closes the write
/// side and reads the reply until the server closes.
async fn exchange(server: &Server, parts: &[&[u8]]) -> String {
    let (mut client, conn) = tokio::io::duplex(64);

    let parts: Vec<Vec<u8>> = parts.iter().map(|p| p.to_vec()).collect();
    let client_task = tokio::spawn(async move {
        for part in parts {
            // The server may already have answered and hung up.
            if client.write_all(&part).await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let _ = client.shutdown().await;

        let mut reply = Vec::new();
        client.read_to_end(&mut reply).await.unwrap();
        reply
    });

    server.serve_connection(conn).await.unwrap();
    String::from_utf8(client_task.await.unwrap()).unwrap()
}

fn reply_body(reply: &str) -> &str {
    reply.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or_default()
}

#[tokio::test]
async fn test_get_request_round_trip() {
    let (server, seen) = recording_server(1024);
    let reply = exchange(&server, &[b"GET /hello?x=1 HTTP/1.1\r\nHost: test\r\n\r\n"]).await;

    assert!(reply.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(reply.contains("\r\nContent-Type: text/plain\r\n"));
    assert!(reply.contains("\r\nContent-Length: 0\r\n"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].url, "/hello?x=1");
    assert_eq!(seen[0].path, "/hello");
    assert_eq!(seen[0].version, "HTTP/1.1");
}

#[tokio::test]
async fn test_request_split_across_three_deliveries() {
    let request: &[u8] = b"POST /upload HTTP/1.1\r\nContent-Type: text/plain\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nHello\r\n6\r\n World\r\n0\r\n\r\n";

    let (server, seen_whole) = recording_server(1024);
    let whole = exchange(&server, &[request]).await;

    // Header split mid-line, body split mid-chunk.
    let (server, seen_split) = recording_server(1024);
    let split = exchange(&server, &[&request[..20], &request[20..95], &request[95..]]).await;

    assert_eq!(reply_body(&whole), "Hello World");
    assert_eq!(reply_body(&split), "Hello World");
    assert_eq!(*seen_whole.lock().unwrap(), *seen_split.lock().unwrap());
    assert_eq!(
        seen_split.lock().unwrap()[0].body,
        Body::Text("Hello World".to_string())
    );
}

#[tokio::test]
async fn test_small_reads_produce_same_request() {
    let request: &[u8] =
        b"PUT /data HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 15\r\n\r\n{\"ok\":[1,2,3]}\n";

    let (server, seen) = recording_server(3);
    let reply = exchange(&server, &[request]).await;

    assert_eq!(reply_body(&reply), "{\"ok\":[1,2,3]}\n");
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].body, Body::Json(serde_json::json!({ "ok": [1, 2, 3] })));
    assert!(!seen[0].parse_error);
}

#[tokio::test]
async fn test_invalid_json_reaches_handler_with_error() {
    let (server, seen) = recording_server(1024);
    exchange(
        &server,
        &[b"POST / HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 4\r\n\r\n{bad"],
    )
    .await;

    let seen = seen.lock().unwrap();
    assert!(seen[0].parse_error);
    assert_eq!(seen[0].body, Body::Text("{bad".to_string()));
}

#[tokio::test]
async fn test_trailing_bytes_do_not_dispatch_again() {
    let (server, seen) = recording_server(1024);
    let reply = exchange(
        &server,
        &[
            b"POST / HTTP/1.1\r\nContent-Length: 2\r\n\r\nokEXTRA",
            b"GET /second HTTP/1.1\r\n\r\n",
        ],
    )
    .await;

    assert_eq!(reply_body(&reply), "ok");
    assert_eq!(reply.matches("HTTP/1.0").count(), 1);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_chunked_body_is_never_dispatched() {
    let (server, seen) = recording_server(1024);
    let reply = exchange(
        &server,
        &[
            b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n",
            b"nothex\r\ndata\r\n0\r\n\r\n",
        ],
    )
    .await;

    assert!(reply.is_empty());
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_peer_closing_early_gets_no_reply() {
    let (server, seen) = recording_server(1024);
    let reply = exchange(&server, &[b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nshort"]).await;

    assert!(reply.is_empty());
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_handler_without_send_closes_silently() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let server = create_server(move |_req: &Request, _res: &mut Response| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let reply = exchange(&server, &[b"GET / HTTP/1.1\r\n\r\n"]).await;

    assert!(reply.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_double_send_writes_once() {
    let server = create_server(|_req: &Request, res: &mut Response| {
        res.send("one").unwrap();
        assert!(res.send("two").is_err());
    });

    let reply = exchange(&server, &[b"GET / HTTP/1.1\r\n\r\n"]).await;

    assert_eq!(reply.matches("HTTP/1.0 200 OK").count(), 1);
    assert_eq!(reply_body(&reply), "one");
}

#[tokio::test]
async fn test_servers_are_independent() {
    let (first, first_seen) = recording_server(1024);
    let (second, second_seen) = recording_server(1024);

    exchange(&first, &[b"GET /a HTTP/1.1\r\n\r\n"]).await;
    exchange(&second, &[b"GET /b HTTP/1.1\r\n\r\n"]).await;
    exchange(&second, &[b"GET /c HTTP/1.1\r\n\r\n"]).await;

    assert_eq!(first_seen.lock().unwrap().len(), 1);
    assert_eq!(second_seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_router_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let router = Router::new().get("/hello/{name}", |_req, m, res| {
        let _ = res.send(format!("Hello, {}!", m.param("name").unwrap_or_default()));
    });
    let server = create_server(router);
    let serve = tokio::spawn(async move { server.serve(listener).await });

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET /hello/wor").await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    stream.write_all(b"ld%21 HTTP/1.1\r\nHost: x\r\n\r\n").await.unwrap();

    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.unwrap();
    let reply = String::from_utf8(reply).unwrap();

    assert!(reply.starts_with("HTTP/1.0 200 OK\r\n"));
    assert_eq!(reply_body(&reply), "Hello, world!!");

    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET /missing HTTP/1.1\r\n\r\n").await.unwrap();
    let mut reply = Vec::new();
    stream.read_to_end(&mut reply).await.unwrap();
    assert!(String::from_utf8(reply).unwrap().starts_with("HTTP/1.0 404 Not Found\r\n"));

    serve.abort();
}
