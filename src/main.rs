use tracing_subscriber::EnvFilter;

use webwire::config::Config;
use webwire::{create_server, Body, Router, StatusCode};

fn router() -> Router {
    Router::new()
        .get("/", |_req, _m, res| {
            let _ = res.send("<h1>webwire</h1>");
        })
        .get("/hello/{name}", |req, m, res| {
            let greeting = req.query_param("greeting").unwrap_or("Hello");
            let _ = res.send(format!("{greeting}, {}!", m.param("name").unwrap_or("stranger")));
        })
        .post("/echo", |req, _m, res| {
            if let Some(err) = &req.parse_error {
                let _ = res
                    .status(StatusCode::BAD_REQUEST)
                    .header("Content-Type", "text/plain")
                    .send(format!("invalid JSON: {err}"));
                return;
            }
            let _ = match &req.body {
                Body::Json(value) => res
                    .header("Content-Type", "application/json")
                    .send(value.to_string()),
                Body::Text(text) => res
                    .header("Content-Type", req.content_type().unwrap_or("text/plain"))
                    .send(text.clone()),
                Body::Binary(bytes) => res
                    .header(
                        "Content-Type",
                        req.content_type().unwrap_or("application/octet-stream"),
                    )
                    .send(bytes.clone()),
                Body::Empty => res.status(StatusCode::NO_CONTENT).send(""),
            };
        })
        .get("/static/*", |_req, m, res| {
            let _ = res
                .header("Content-Type", "text/plain")
                .send(format!("static asset {}", m.rest.as_deref().unwrap_or("/")));
        })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match std::env::var("WEBWIRE_CONFIG") {
        Ok(path) => Config::from_file(path)?,
        Err(_) => Config::load(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level)),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let server = create_server(router()).with_read_buffer_size(cfg.read_buffer_size);

    tokio::select! {
        res = server.listen(&cfg.listen_addr) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
