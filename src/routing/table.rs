//! Route table implementation
//!
//! Routes are registered once at startup and never mutated afterwards.
//! Matching walks the registered routes in order and returns the first
//! structural match, so overlapping patterns resolve by registration order.

use axum::http::Method;
use std::collections::HashMap;
use thiserror::Error;

/// How a matched connection is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Long-lived connection handed to a `MessageHandler` after the upgrade.
    WebSocket,
    /// Request/response exchange handed to a controller.
    Http,
}

/// Identifies the handler or controller behind a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Echo/heartbeat socket at `/`.
    EchoSocket,
    /// Application-scoped channel socket at `/app/{appKey}`.
    AppSocket,
    /// `POST /apps/{appId}/events`
    TriggerEvent,
    /// `GET /apps/{appId}/channels`
    FetchChannels,
    /// `GET /apps/{appId}/channels/{channelName}`
    FetchChannel,
    /// `GET /apps/{appId}/channels/{channelName}/users`
    FetchUsers,
    /// `GET /health`
    Health,
}

/// Errors raised during route registration.
///
/// These are configuration errors: they can only occur at startup and are
/// fatal there, never at runtime.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("duplicate route: {method} {pattern}")]
    Duplicate { method: Method, pattern: String },
}

/// A single path segment of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A registered route.
#[derive(Debug, Clone)]
pub struct Route {
    pub method: Method,
    pub pattern: String,
    pub kind: RouteKind,
    pub endpoint: Endpoint,
    segments: Vec<Segment>,
}

impl Route {
    fn new(method: Method, pattern: &str, kind: RouteKind, endpoint: Endpoint) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s.starts_with('{') && s.ends_with('}') && s.len() > 2 {
                    Segment::Param(s[1..s.len() - 1].to_string())
                } else {
                    Segment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            method,
            pattern: pattern.to_string(),
            kind,
            endpoint,
            segments,
        }
    }

    /// Match a path against this route's pattern.
    ///
    /// A path matches iff it has the same segment count, every literal
    /// segment is byte-equal, and every placeholder binds a non-empty
    /// segment. Returns the extracted placeholder values on success.
    fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(&parts) {
            match segment {
                Segment::Literal(lit) => {
                    if lit != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), (*part).to_string());
                }
            }
        }

        Some(params)
    }
}

/// Result of a successful route lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub kind: RouteKind,
    pub endpoint: Endpoint,
    /// Placeholder name → bound path segment.
    pub params: HashMap<String, String>,
}

/// Ordered collection of routes; first structural match wins.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Build the standard beacon route set.
    pub fn with_default_routes() -> Result<Self, RouteError> {
        let mut table = Self::new();

        table.websocket("/", Endpoint::EchoSocket)?;
        table.websocket("/app/{appKey}", Endpoint::AppSocket)?;

        table.post("/apps/{appId}/events", Endpoint::TriggerEvent)?;
        table.get("/apps/{appId}/channels", Endpoint::FetchChannels)?;
        table.get("/apps/{appId}/channels/{channelName}", Endpoint::FetchChannel)?;
        table.get(
            "/apps/{appId}/channels/{channelName}/users",
            Endpoint::FetchUsers,
        )?;
        table.get("/health", Endpoint::Health)?;

        Ok(table)
    }

    /// Register a route.
    ///
    /// Fails if the (method, pattern) pair is already registered.
    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        kind: RouteKind,
        endpoint: Endpoint,
    ) -> Result<(), RouteError> {
        if self
            .routes
            .iter()
            .any(|r| r.method == method && r.pattern == pattern)
        {
            return Err(RouteError::Duplicate {
                method,
                pattern: pattern.to_string(),
            });
        }

        self.routes.push(Route::new(method, pattern, kind, endpoint));
        Ok(())
    }

    /// Register an HTTP GET route.
    pub fn get(&mut self, pattern: &str, endpoint: Endpoint) -> Result<(), RouteError> {
        self.register(Method::GET, pattern, RouteKind::Http, endpoint)
    }

    /// Register an HTTP POST route.
    pub fn post(&mut self, pattern: &str, endpoint: Endpoint) -> Result<(), RouteError> {
        self.register(Method::POST, pattern, RouteKind::Http, endpoint)
    }

    /// Register a WebSocket route (upgrades are negotiated over GET).
    pub fn websocket(&mut self, pattern: &str, endpoint: Endpoint) -> Result<(), RouteError> {
        self.register(Method::GET, pattern, RouteKind::WebSocket, endpoint)
    }

    /// Find the first registered route matching (method, path).
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        self.routes
            .iter()
            .filter(|r| &r.method == method)
            .find_map(|r| {
                r.match_path(path).map(|params| RouteMatch {
                    kind: r.kind,
                    endpoint: r.endpoint,
                    params,
                })
            })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
