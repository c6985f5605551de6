//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Own route groups in registration order
//! - Select the group serving a request path
//! - Resolve path and method to a composed handler, or an explicit miss
//! - Write the synthetic 404/405 responses
//!
//! # Design Decisions
//! - Immutable after registration; shared via `Arc` without locks
//! - Groups are tried in order; a group whose trie has no terminal match is
//!   skipped, the first group with a path match decides 405 vs. success
//! - Handler errors are returned as-is to the caller

use axum::http::header::ALLOW;
use axum::http::Method;
use serde::{Deserialize, Serialize};

use crate::http::Context;
use crate::routing::error::DispatchError;
use crate::routing::group::RouteGroup;
use crate::routing::handler::{Handler, HandlerResult};
use crate::routing::method::RouteMethod;
use crate::routing::trie::Params;

/// How a request path is assigned to a route group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMatch {
    /// The path must start with the group's mount path on a segment boundary.
    #[default]
    Prefix,
    /// `/name` may occur anywhere; the remaining path follows its last occurrence.
    Substring,
}

impl GroupMatch {
    /// Path left for the group's trie, or `None` if the group does not apply.
    fn remaining<'p>(&self, path: &'p str, group: &str) -> Option<&'p str> {
        if group.is_empty() {
            return Some(path);
        }
        let rest = match self {
            GroupMatch::Prefix => {
                let rest = path.strip_prefix('/')?.strip_prefix(group)?;
                if !rest.is_empty() && !rest.starts_with('/') {
                    return None;
                }
                rest
            }
            GroupMatch::Substring => {
                let needle = format!("/{group}");
                let idx = path.rfind(&needle)?;
                &path[idx + needle.len()..]
            }
        };
        Some(if rest.is_empty() { "/" } else { rest })
    }
}

/// A request resolved to a handler chain.
#[derive(Debug)]
pub struct ResolvedRoute<'a> {
    pub group: &'a RouteGroup,
    /// Canonical pattern inside the group, e.g. `/get/:id`.
    pub pattern: String,
    /// Entry that was picked; `Any` when an ANY route shadowed the method.
    pub method: RouteMethod,
    pub params: Params,
    /// Handler wrapped in route and group middleware.
    pub handler: Handler,
}

#[derive(Debug, Default)]
pub struct Router {
    groups: Vec<RouteGroup>,
    group_match: GroupMatch,
}

impl Router {
    /// Create an empty router using prefix group matching.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty router with an explicit group matching mode.
    pub fn with_group_match(group_match: GroupMatch) -> Self {
        Self {
            groups: Vec::new(),
            group_match,
        }
    }

    /// Group matching mode in effect.
    pub fn group_match(&self) -> GroupMatch {
        self.group_match
    }

    /// Create a route group mounted at `/name`.
    pub fn group(&mut self, name: &str) -> &mut RouteGroup {
        let group = RouteGroup::new(name);
        if self.groups.iter().any(|g| g.name() == group.name()) {
            tracing::warn!(
                group = %group.name(),
                "Group name registered twice; the later group only serves paths the earlier trie does not match"
            );
        }
        self.groups.push(group);
        let idx = self.groups.len() - 1;
        &mut self.groups[idx]
    }

    /// Groups in registration order.
    pub fn groups(&self) -> &[RouteGroup] {
        &self.groups
    }

    /// All routes as `(mount path, pattern, method)`.
    pub fn routes(&self) -> impl Iterator<Item = (String, &str, RouteMethod)> {
        self.groups.iter().flat_map(|group| {
            let mount = group.mount_path();
            group
                .routes()
                .map(move |(pattern, method)| (mount.clone(), pattern, method))
        })
    }

    /// Resolve a request without running anything.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<ResolvedRoute<'_>, DispatchError> {
        for group in &self.groups {
            let Some(remaining) = self.group_match.remaining(path, group.name()) else {
                continue;
            };
            let Some(matched) = group.lookup(remaining) else {
                continue;
            };

            return match group.resolve_method(&matched.pattern, method) {
                Ok((resolved, handler)) => Ok(ResolvedRoute {
                    group,
                    pattern: matched.pattern,
                    method: resolved,
                    params: matched.params,
                    handler,
                }),
                Err(allowed) => Err(DispatchError::MethodNotAllowed { allowed }),
            };
        }
        Err(DispatchError::NotFound)
    }

    /// Dispatch one request.
    ///
    /// Misses are answered on the context and return `Ok`. Otherwise the
    /// composed handler runs and its result is returned unchanged.
    pub fn serve(&self, ctx: &mut Context) -> HandlerResult {
        let resolved = self.resolve(ctx.method(), ctx.path());
        match resolved {
            Ok(route) => {
                tracing::trace!(
                    group = %route.group.name(),
                    pattern = %route.pattern,
                    method = %route.method,
                    "Route matched"
                );
                let handler = route.handler;
                ctx.set_route(route.pattern, route.params);
                handler.call(ctx)
            }
            Err(miss @ DispatchError::NotFound) => {
                tracing::debug!(method = %ctx.method(), uri = %ctx.uri(), "No route matched");
                let body = format!("{} not found\n", ctx.uri());
                ctx.write_status(miss.status_code());
                ctx.write_body(body);
                Ok(())
            }
            Err(miss @ DispatchError::MethodNotAllowed { .. }) => {
                tracing::debug!(method = %ctx.method(), uri = %ctx.uri(), "Method not allowed");
                let allow = miss.allow_header();
                let body = format!("[{}] {} not allowed\n", ctx.method(), ctx.uri());
                ctx.write_status(miss.status_code());
                ctx.write_header(ALLOW.as_str(), &allow);
                ctx.write_body(body);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::Middleware;
    use std::sync::{Arc, Mutex};

    fn text(body: &'static str) -> impl Fn(&mut Context) -> HandlerResult + Send + Sync + 'static {
        move |ctx| {
            ctx.string(200, body);
            Ok(())
        }
    }

    fn serve(router: &Router, method: Method, uri: &str) -> Context {
        let mut ctx = Context::new(method, uri.parse().unwrap());
        router.serve(&mut ctx).unwrap();
        ctx
    }

    fn body(ctx: &Context) -> &str {
        std::str::from_utf8(ctx.response_body()).unwrap()
    }

    fn user_router() -> Router {
        let mut router = Router::new();
        let user = router.group("user");
        user.get("/get/:id", text("get by id"), []).unwrap();
        user.get("/get/admin", text("admin"), []).unwrap();
        user.post("/get/:id", text("post by id"), []).unwrap();
        user.any("/ping", text("pong"), []).unwrap();
        user.get("/files/**", text("files"), []).unwrap();
        router
    }

    #[test]
    fn test_dispatch_and_params() {
        let router = user_router();
        let ctx = serve(&router, Method::GET, "/user/get/42?x=1");
        assert_eq!(body(&ctx), "get by id");
        assert_eq!(ctx.pattern(), Some("/get/:id"));
        assert_eq!(ctx.param("id"), Some("42"));

        assert_eq!(body(&serve(&router, Method::GET, "/user/get/admin")), "admin");
        assert_eq!(body(&serve(&router, Method::POST, "/user/get/42")), "post by id");

        let ctx = serve(&router, Method::GET, "/user/files/a/b/c");
        assert_eq!(body(&ctx), "files");
        assert_eq!(ctx.param("**"), Some("a/b/c"));
    }

    #[test]
    fn test_any_route() {
        let router = user_router();
        for method in [Method::GET, Method::DELETE, Method::TRACE] {
            let resolved = router.resolve(&method, "/user/ping").unwrap();
            assert_eq!(resolved.method, RouteMethod::Any);
        }
        // ANY on /ping does not leak onto other patterns.
        assert!(matches!(
            router.resolve(&Method::DELETE, "/user/get/1"),
            Err(DispatchError::MethodNotAllowed { .. })
        ));
    }

    #[test]
    fn test_any_shadows_concrete_method() {
        let mut router = Router::new();
        router
            .group("api")
            .get("/thing", text("get"), [])
            .unwrap()
            .any("/thing", text("any"), [])
            .unwrap();
        assert_eq!(body(&serve(&router, Method::GET, "/api/thing")), "any");
    }

    #[test]
    fn test_not_found() {
        let router = user_router();

        let ctx = serve(&router, Method::GET, "/nobody/get/1");
        assert_eq!(ctx.status().as_u16(), 404);
        assert_eq!(body(&ctx), "/nobody/get/1 not found\n");

        // Non-terminal node.
        assert_eq!(serve(&router, Method::GET, "/user/get").status().as_u16(), 404);
        assert_eq!(serve(&router, Method::GET, "/user").status().as_u16(), 404);
    }

    #[test]
    fn test_method_not_allowed() {
        let router = user_router();
        let ctx = serve(&router, Method::DELETE, "/user/get/1");
        assert_eq!(ctx.status().as_u16(), 405);
        assert_eq!(body(&ctx), "[DELETE] /user/get/1 not allowed\n");
        assert_eq!(ctx.response_headers().get(ALLOW).unwrap(), "GET, POST");
    }

    #[test]
    fn test_prefix_requires_segment_boundary() {
        let router = user_router();
        assert!(router.resolve(&Method::GET, "/users/get/1").is_err());
        assert!(router.resolve(&Method::GET, "/api/user/get/1").is_err());
    }

    #[test]
    fn test_substring_group_match() {
        let mut router = Router::with_group_match(GroupMatch::Substring);
        router.group("user").get("/get/:id", text("ok"), []).unwrap();

        let resolved = router.resolve(&Method::GET, "/api/v1/user/get/1").unwrap();
        assert_eq!(resolved.pattern, "/get/:id");
        // The last occurrence wins, even inside a parameter value.
        assert!(router.resolve(&Method::GET, "/user/get/user").is_err());
    }

    #[test]
    fn test_falls_through_to_next_group() {
        let mut router = Router::new();
        router.group("").get("/health", text("root health"), []).unwrap();
        router.group("user").get("/me", text("me"), []).unwrap();

        assert_eq!(body(&serve(&router, Method::GET, "/health")), "root health");
        assert_eq!(body(&serve(&router, Method::GET, "/user/me")), "me");
    }

    #[test]
    fn test_same_group_name_falls_through() {
        let mut router = Router::new();
        router.group("user").get("/me", text("first"), []).unwrap();
        router.group("user").get("/me", text("second"), []).unwrap();
        router.group("user").get("/other", text("later"), []).unwrap();

        assert_eq!(router.groups().len(), 3);
        assert_eq!(body(&serve(&router, Method::GET, "/user/me")), "first");
        assert_eq!(body(&serve(&router, Method::GET, "/user/other")), "later");
    }

    #[test]
    fn test_group_match_mode() {
        assert_eq!(Router::new().group_match(), GroupMatch::Prefix);
        assert_eq!(
            Router::with_group_match(GroupMatch::Substring).group_match(),
            GroupMatch::Substring
        );
    }

    #[test]
    fn test_root_pattern_in_group() {
        let mut router = Router::new();
        router.group("user").get("/", text("index"), []).unwrap();
        assert_eq!(body(&serve(&router, Method::GET, "/user")), "index");
        assert_eq!(body(&serve(&router, Method::GET, "/user/")), "index");
    }

    #[test]
    fn test_group_and_route_middleware_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let tracer = |name: &'static str| {
            let log = Arc::clone(&log);
            Middleware::from_fn(move |ctx, next| {
                log.lock().unwrap().push(format!("{name}>"));
                let result = next.call(ctx);
                log.lock().unwrap().push(format!("<{name}"));
                result
            })
        };

        let mut router = Router::new();
        let group = router.group("user");
        group.use_middleware([tracer("A")]);
        let handler_log = Arc::clone(&log);
        group
            .get(
                "/info",
                move |_ctx: &mut Context| {
                    handler_log.lock().unwrap().push("H".to_string());
                    Ok(())
                },
                [tracer("B"), tracer("C")],
            )
            .unwrap();

        serve(&router, Method::GET, "/user/info");
        assert_eq!(
            *log.lock().unwrap(),
            ["A>", "B>", "C>", "H", "<C", "<B", "<A"]
        );
    }

    #[test]
    fn test_handler_error_is_propagated() {
        let mut router = Router::new();
        router
            .group("user")
            .get("/fail", |_ctx: &mut Context| Err("database down".into()), [])
            .unwrap();

        let mut ctx = Context::new(Method::GET, "/user/fail".parse().unwrap());
        let err = router.serve(&mut ctx).unwrap_err();
        assert_eq!(err.to_string(), "database down");
    }

    #[test]
    fn test_router_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Router>();
    }
}
