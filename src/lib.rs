//! nanoroute: a segment-trie HTTP router with grouped middleware.
//!
//! Routes live in named groups; each group owns a path trie and a route
//! table. A request is matched to a group by mount path, to a pattern by the
//! group's trie, and to a handler by method (ANY first), then runs through
//! group and route middleware.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::AppConfig;
pub use http::{Context, HttpServer, ServerHandle};
pub use lifecycle::Shutdown;
pub use routing::{
    GroupMatch, Handler, HandlerError, HandlerResult, Middleware, RouteError, RouteGroup,
    RouteMethod, Router,
};
