//! Path templates and a small method + path route table.
//!
//! Templates are made of `/`-separated segments:
//!
//! - literal segments, compared case-sensitively
//! - `{name}` segments, capturing one percent-decoded path segment
//! - a `*` segment, capturing every remaining segment as `rest`
//!
//! Empty segments are dropped on both sides, so `/users/` and `/users` are
//! the same template and the same path.

use std::collections::HashMap;

use tracing::debug;

use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::server::handler::Handler;

/// Parameters extracted by a successful [`match_path`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMatch {
    pub params: HashMap<String, String>,
    /// Remainder captured by a `*` segment, always starting with `/`
    pub rest: Option<String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Matches `path` (query string ignored) against `template`.
///
/// # Example
///
/// ```
/// # use webwire::router::match_path;
/// let m = match_path("/users/{id}/*", "/users/7/posts/1?x=y").unwrap();
/// assert_eq!(m.param("id"), Some("7"));
/// assert_eq!(m.rest.as_deref(), Some("/posts/1"));
///
/// assert!(match_path("/users", "/posts").is_none());
/// ```
pub fn match_path(template: &str, path: &str) -> Option<RouteMatch> {
    let path = path.split_once('?').map_or(path, |(p, _)| p);

    let template_parts = segments(template);
    let path_parts = segments(path);

    let mut params = HashMap::new();

    for (i, part) in template_parts.iter().enumerate() {
        if *part == "*" {
            let rest = format!("/{}", path_parts.get(i..).unwrap_or_default().join("/"));
            return Some(RouteMatch {
                params,
                rest: Some(rest),
            });
        }

        let segment = path_parts.get(i)?;

        match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
            Some(name) => {
                params.insert(name.to_string(), percent_decode(segment));
            }
            None if part != segment => return None,
            None => {}
        }
    }

    if path_parts.len() > template_parts.len() {
        return None;
    }

    Some(RouteMatch { params, rest: None })
}

/// Percent-decodes a path segment, leaving it untouched when the escapes do
/// not form valid UTF-8.
fn percent_decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

type RouteFn = Box<dyn Fn(&Request, &RouteMatch, &mut Response) + Send + Sync>;

struct Route {
    /// `None` accepts any method
    method: Option<Method>,
    template: String,
    handler: RouteFn,
}

/// Ordered route table. The first route whose method and template match wins.
///
/// # Example
///
/// ```
/// # use webwire::router::Router;
/// # use webwire::create_server;
/// let router = Router::new()
///     .get("/hello/{name}", |_req, m, res| {
///         let _ = res.send(format!("Hello, {}!", m.param("name").unwrap_or("")));
///     });
/// let _server = create_server(router);
/// ```
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    fallback: Option<Box<dyn Fn(&Request, &mut Response) + Send + Sync>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route<F>(mut self, method: Method, template: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Request, &RouteMatch, &mut Response) + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method: Some(method),
            template: template.into(),
            handler: Box::new(handler),
        });
        self
    }

    /// Registers a route that accepts every method, known or not.
    pub fn any<F>(mut self, template: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Request, &RouteMatch, &mut Response) + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method: None,
            template: template.into(),
            handler: Box::new(handler),
        });
        self
    }

    pub fn get<F>(self, template: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Request, &RouteMatch, &mut Response) + Send + Sync + 'static,
    {
        self.route(Method::GET, template, handler)
    }

    pub fn post<F>(self, template: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Request, &RouteMatch, &mut Response) + Send + Sync + 'static,
    {
        self.route(Method::POST, template, handler)
    }

    /// Replaces the default 404 reply for unmatched requests.
    pub fn fallback<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Request, &mut Response) + Send + Sync + 'static,
    {
        self.fallback = Some(Box::new(handler));
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Handler for Router {
    fn handle(&self, req: &Request, res: &mut Response) {
        let method = req.known_method();

        for route in &self.routes {
            if route.method.is_some() && route.method != method {
                continue;
            }
            if let Some(matched) = match_path(&route.template, &req.url) {
                debug!(template = %route.template, path = %req.path, "route matched");
                (route.handler)(req, &matched, res);
                return;
            }
        }

        match &self.fallback {
            Some(fallback) => fallback(req, res),
            None => {
                let _ = res.status(StatusCode::NOT_FOUND).send("404 Not Found");
            }
        }
    }
}
