//! Route Registration and Matching
//!
//! The route table is the single source of routing truth: every inbound
//! request is matched against it to decide whether the connection is a
//! plain HTTP request or a WebSocket upgrade, and which endpoint serves it.
//!
//! Patterns use `{name}` placeholders that bind any non-empty path segment:
//!
//! ```rust
//! use beacon::routing::{Endpoint, RouteTable};
//! use axum::http::Method;
//!
//! let table = RouteTable::with_default_routes().unwrap();
//! let m = table.match_route(&Method::GET, "/app/demo-key").unwrap();
//! assert_eq!(m.endpoint, Endpoint::AppSocket);
//! assert_eq!(m.params["appKey"], "demo-key");
//! ```

mod table;

pub use table::{Endpoint, Route, RouteError, RouteKind, RouteMatch, RouteTable};
