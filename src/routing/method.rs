//! Route methods.
//!
//! # Design Decisions
//! - `Any` is a variant, not a magic string, so the ANY-before-concrete
//!   precedence is checked by the compiler
//! - Request methods outside the closed set map to `None` and can only be
//!   served by an `Any` route

use std::fmt;
use std::str::FromStr;

use axum::http::Method;

/// HTTP method a route is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    /// Matches every request method and wins over concrete entries.
    Any,
}

impl RouteMethod {
    /// Concrete methods, in the order they are reported in `Allow` headers.
    pub const CONCRETE: [RouteMethod; 7] = [
        RouteMethod::Get,
        RouteMethod::Post,
        RouteMethod::Put,
        RouteMethod::Patch,
        RouteMethod::Delete,
        RouteMethod::Head,
        RouteMethod::Options,
    ];

    /// Map a request method onto a concrete route method.
    pub fn from_http(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(RouteMethod::Get),
            Method::POST => Some(RouteMethod::Post),
            Method::PUT => Some(RouteMethod::Put),
            Method::PATCH => Some(RouteMethod::Patch),
            Method::DELETE => Some(RouteMethod::Delete),
            Method::HEAD => Some(RouteMethod::Head),
            Method::OPTIONS => Some(RouteMethod::Options),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
            RouteMethod::Put => "PUT",
            RouteMethod::Patch => "PATCH",
            RouteMethod::Delete => "DELETE",
            RouteMethod::Head => "HEAD",
            RouteMethod::Options => "OPTIONS",
            RouteMethod::Any => "ANY",
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown method name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown route method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for RouteMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(RouteMethod::Get),
            "POST" => Ok(RouteMethod::Post),
            "PUT" => Ok(RouteMethod::Put),
            "PATCH" => Ok(RouteMethod::Patch),
            "DELETE" => Ok(RouteMethod::Delete),
            "HEAD" => Ok(RouteMethod::Head),
            "OPTIONS" => Ok(RouteMethod::Options),
            "ANY" => Ok(RouteMethod::Any),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http() {
        assert_eq!(RouteMethod::from_http(&Method::GET), Some(RouteMethod::Get));
        assert_eq!(RouteMethod::from_http(&Method::OPTIONS), Some(RouteMethod::Options));
        assert_eq!(RouteMethod::from_http(&Method::TRACE), None);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("any".parse::<RouteMethod>(), Ok(RouteMethod::Any));
        assert_eq!("Patch".parse::<RouteMethod>(), Ok(RouteMethod::Patch));
        assert!("TRACE".parse::<RouteMethod>().is_err());
        assert_eq!(RouteMethod::Delete.to_string(), "DELETE");
    }
}
