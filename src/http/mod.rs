//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower layers)
//!     → request.rs (request ID, trace span)
//!     → body buffered, context.rs built
//!     → routing::Router::serve (404/405 or handler chain)
//!     → context.rs converted into the response
//!     → Send to client
//! ```

pub mod context;
pub mod request;
pub mod server;

pub use context::Context;
pub use request::X_REQUEST_ID;
pub use server::{HttpServer, ServerError, ServerHandle};
