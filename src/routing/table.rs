//! Route table: (pattern, method) → handler and route middleware.

use std::collections::HashMap;

use axum::http::Method;

use crate::routing::error::RouteError;
use crate::routing::handler::{Handler, Middleware};
use crate::routing::method::RouteMethod;

/// A registered handler together with its route-level middleware.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub handler: Handler,
    pub middleware: Vec<Middleware>,
}

#[derive(Debug, Default)]
pub struct RouteTable {
    entries: HashMap<String, HashMap<RouteMethod, RouteEntry>>,
    /// Registration order, for listings.
    order: Vec<(String, RouteMethod)>,
}

impl RouteTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `method` is registered on `pattern` exactly (ANY is not expanded).
    pub fn contains(&self, pattern: &str, method: RouteMethod) -> bool {
        self.entries
            .get(pattern)
            .is_some_and(|methods| methods.contains_key(&method))
    }

    /// Record an entry. Never overwrites: a second registration of the same
    /// pattern and method is an error.
    pub fn insert(
        &mut self,
        pattern: &str,
        method: RouteMethod,
        entry: RouteEntry,
    ) -> Result<(), RouteError> {
        if self.contains(pattern, method) {
            return Err(RouteError::Duplicate {
                pattern: pattern.to_string(),
                method,
            });
        }
        self.entries
            .entry(pattern.to_string())
            .or_default()
            .insert(method, entry);
        self.order.push((pattern.to_string(), method));
        Ok(())
    }

    /// Find the entry serving `method` on `pattern`. An `Any` entry wins.
    pub fn resolve(&self, pattern: &str, method: &Method) -> Option<(RouteMethod, &RouteEntry)> {
        let methods = self.entries.get(pattern)?;
        if let Some(entry) = methods.get(&RouteMethod::Any) {
            return Some((RouteMethod::Any, entry));
        }
        let concrete = RouteMethod::from_http(method)?;
        methods.get(&concrete).map(|entry| (concrete, entry))
    }

    /// Concrete methods registered for `pattern`, in canonical order.
    pub fn methods(&self, pattern: &str) -> Vec<RouteMethod> {
        match self.entries.get(pattern) {
            Some(methods) => RouteMethod::CONCRETE
                .into_iter()
                .filter(|m| methods.contains_key(m))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Registered `(pattern, method)` pairs in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (&str, RouteMethod)> {
        self.order.iter().map(|(pattern, method)| (pattern.as_str(), *method))
    }

    /// Number of registered `(pattern, method)` entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
