//! Handlers and middleware composition.
//!
//! # Design Decisions
//! - Handlers run synchronously inside the dispatch call
//! - Middleware is a handler transformer, so it can run logic both before
//!   and after the handler it wraps
//! - Handler errors are returned untouched; recovery belongs to the server

use std::fmt;
use std::sync::Arc;

use crate::http::Context;

/// Error raised by a handler or middleware.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

pub type HandlerResult = Result<(), HandlerError>;

/// A request handler.
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(&mut Context) -> HandlerResult + Send + Sync>);

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Context) -> HandlerResult + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, ctx: &mut Context) -> HandlerResult {
        (self.0)(ctx)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

/// Wraps a handler into another handler.
#[derive(Clone)]
pub struct Middleware(Arc<dyn Fn(Handler) -> Handler + Send + Sync>);

impl Middleware {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Build middleware from a function that receives the wrapped handler as `next`.
    ///
    /// ```ignore
    /// let timing = Middleware::from_fn(|ctx, next| {
    ///     let start = Instant::now();
    ///     let result = next.call(ctx);
    ///     tracing::debug!(elapsed = ?start.elapsed(), "handled");
    ///     result
    /// });
    /// ```
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&mut Context, &Handler) -> HandlerResult + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Self::new(move |next| {
            let f = Arc::clone(&f);
            Handler::new(move |ctx| f(ctx, &next))
        })
    }

    pub fn wrap(&self, handler: Handler) -> Handler {
        (self.0)(handler)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Middleware")
    }
}

/// Build the effective handler for one request.
///
/// Route middleware wraps the handler, group middleware wraps the result.
/// Within each list the first declared ends up outermost, so group `[A]`
/// and route `[B, C]` run as `A → B → C → H → C → B → A`.
pub fn compose(handler: &Handler, route: &[Middleware], group: &[Middleware]) -> Handler {
    let inner = route
        .iter()
        .rev()
        .fold(handler.clone(), |next, mw| mw.wrap(next));
    group.iter().rev().fold(inner, |next, mw| mw.wrap(next))
}
