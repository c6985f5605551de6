//! Routing error types.

use crate::routing::method::RouteMethod;

/// Configuration error raised while registering routes.
///
/// These surface at startup; a caller decides whether to abort or log and continue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("duplicate route: [{method}] {pattern}")]
    Duplicate { pattern: String, method: RouteMethod },

    #[error("invalid route pattern {0:?}: must start with '/'")]
    InvalidPattern(String),

    #[error("invalid route pattern {0:?}: '**' must be the final segment")]
    CatchAllNotLast(String),
}

/// Why a request could not be routed to a handler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// No group matched, or the path ended on a non-terminal node.
    #[error("not found")]
    NotFound,

    /// The path matched but no entry exists for the method (nor ANY).
    #[error("method not allowed")]
    MethodNotAllowed { allowed: Vec<RouteMethod> },
}

impl DispatchError {
    /// HTTP status the miss is answered with.
    pub fn status_code(&self) -> u16 {
        match self {
            DispatchError::NotFound => 404,
            DispatchError::MethodNotAllowed { .. } => 405,
        }
    }

    /// `Allow` header value listing the registered methods; empty for 404.
    pub fn allow_header(&self) -> String {
        match self {
            DispatchError::NotFound => String::new(),
            DispatchError::MethodNotAllowed { allowed } => allowed
                .iter()
                .map(RouteMethod::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}
