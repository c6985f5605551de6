//! Route groups.
//!
//! # Responsibilities
//! - Own one path trie and one route table under a URL prefix
//! - Register routes per method, rejecting duplicates
//! - Hold group-wide middleware applied around every route of the group
//!
//! # Design Decisions
//! - Duplicates are checked against the table before the trie is touched, so
//!   a failed registration changes nothing
//! - Group middleware is composed at dispatch time, so `use_middleware` may
//!   be called before or after routes are added

use axum::http::Method;

use crate::http::Context;
use crate::routing::error::RouteError;
use crate::routing::handler::{compose, Handler, HandlerResult, Middleware};
use crate::routing::method::RouteMethod;
use crate::routing::table::{RouteEntry, RouteTable};
use crate::routing::trie::{PathTrie, RouteMatch};

#[derive(Debug)]
pub struct RouteGroup {
    name: String,
    trie: PathTrie,
    table: RouteTable,
    middleware: Vec<Middleware>,
}

impl RouteGroup {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.trim_matches('/').to_string(),
            trie: PathTrie::new(),
            table: RouteTable::new(),
            middleware: Vec::new(),
        }
    }

    /// Group name without surrounding slashes; empty for the root group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URL prefix the group is mounted at (`/` + name).
    pub fn mount_path(&self) -> String {
        format!("/{}", self.name)
    }

    /// Path trie holding every pattern registered in the group.
    pub fn trie(&self) -> &PathTrie {
        &self.trie
    }

    /// Append group middleware. The first declared runs outermost.
    pub fn use_middleware(&mut self, middleware: impl IntoIterator<Item = Middleware>) -> &mut Self {
        self.middleware.extend(middleware);
        self
    }

    /// Group middleware in declaration order.
    pub fn middleware(&self) -> &[Middleware] {
        &self.middleware
    }

    /// Register `handler` for `method` on `pattern`.
    pub fn handle<F>(
        &mut self,
        method: RouteMethod,
        pattern: &str,
        handler: F,
        middleware: impl IntoIterator<Item = Middleware>,
    ) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) -> HandlerResult + Send + Sync + 'static,
    {
        self.handle_with(method, pattern, Handler::new(handler), middleware)
    }

    /// Same as [`RouteGroup::handle`] for an already wrapped [`Handler`].
    pub fn handle_with(
        &mut self,
        method: RouteMethod,
        pattern: &str,
        handler: Handler,
        middleware: impl IntoIterator<Item = Middleware>,
    ) -> Result<&mut Self, RouteError> {
        PathTrie::validate(pattern)?;
        if self.table.contains(pattern, method) {
            return Err(RouteError::Duplicate {
                pattern: pattern.to_string(),
                method,
            });
        }

        let entry = RouteEntry {
            handler,
            middleware: middleware.into_iter().collect(),
        };
        self.table.insert(pattern, method, entry)?;
        self.trie.insert(pattern)?;

        tracing::debug!(
            group = %self.name,
            method = %method,
            pattern = %pattern,
            "Route registered"
        );
        Ok(self)
    }

    pub fn get<F>(
        &mut self,
        pattern: &str,
        handler: F,
        middleware: impl IntoIterator<Item = Middleware>,
    ) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) -> HandlerResult + Send + Sync + 'static,
    {
        self.handle(RouteMethod::Get, pattern, handler, middleware)
    }

    pub fn post<F>(
        &mut self,
        pattern: &str,
        handler: F,
        middleware: impl IntoIterator<Item = Middleware>,
    ) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) -> HandlerResult + Send + Sync + 'static,
    {
        self.handle(RouteMethod::Post, pattern, handler, middleware)
    }

    pub fn put<F>(
        &mut self,
        pattern: &str,
        handler: F,
        middleware: impl IntoIterator<Item = Middleware>,
    ) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) -> HandlerResult + Send + Sync + 'static,
    {
        self.handle(RouteMethod::Put, pattern, handler, middleware)
    }

    pub fn patch<F>(
        &mut self,
        pattern: &str,
        handler: F,
        middleware: impl IntoIterator<Item = Middleware>,
    ) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) -> HandlerResult + Send + Sync + 'static,
    {
        self.handle(RouteMethod::Patch, pattern, handler, middleware)
    }

    pub fn delete<F>(
        &mut self,
        pattern: &str,
        handler: F,
        middleware: impl IntoIterator<Item = Middleware>,
    ) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) -> HandlerResult + Send + Sync + 'static,
    {
        self.handle(RouteMethod::Delete, pattern, handler, middleware)
    }

    pub fn head<F>(
        &mut self,
        pattern: &str,
        handler: F,
        middleware: impl IntoIterator<Item = Middleware>,
    ) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) -> HandlerResult + Send + Sync + 'static,
    {
        self.handle(RouteMethod::Head, pattern, handler, middleware)
    }

    pub fn options<F>(
        &mut self,
        pattern: &str,
        handler: F,
        middleware: impl IntoIterator<Item = Middleware>,
    ) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) -> HandlerResult + Send + Sync + 'static,
    {
        self.handle(RouteMethod::Options, pattern, handler, middleware)
    }

    /// Register a handler for every method. It shadows concrete-method
    /// entries on the same pattern.
    pub fn any<F>(
        &mut self,
        pattern: &str,
        handler: F,
        middleware: impl IntoIterator<Item = Middleware>,
    ) -> Result<&mut Self, RouteError>
    where
        F: Fn(&mut Context) -> HandlerResult + Send + Sync + 'static,
    {
        self.handle(RouteMethod::Any, pattern, handler, middleware)
    }

    /// Registered `(pattern, method)` pairs in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&str, RouteMethod)> {
        self.table.routes()
    }

    pub(crate) fn lookup(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.trie.lookup(path)
    }

    /// Resolve the method on a matched pattern and compose its handler chain.
    ///
    /// On a miss, returns the concrete methods that are registered instead.
    pub(crate) fn resolve_method(
        &self,
        pattern: &str,
        method: &Method,
    ) -> Result<(RouteMethod, Handler), Vec<RouteMethod>> {
        match self.table.resolve(pattern, method) {
            Some((resolved, entry)) => Ok((
                resolved,
                compose(&entry.handler, &entry.middleware, &self.middleware),
            )),
            None => Err(self.table.methods(pattern)),
        }
    }
}
