//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum app that hands every request to the route tree
//! - Wire up middleware (request ID, tracing, timeout, panic guard)
//! - Buffer request bodies up to the configured limit
//! - Act as the error boundary for handler failures and panics
//! - Run the synchronous handler chain on the blocking pool
//! - Record per-request metrics
//!
//! # Design Decisions
//! - One explicit server object per router; no global registration, so
//!   several servers can run side by side
//! - Start/stop lifecycle via `spawn` + `ServerHandle::stop`

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::http::context::Context;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::shutdown::{self, Shutdown};
use crate::observability::metrics;
use crate::routing::Router;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid bind address {address:?}: {source}")]
    Address {
        address: String,
        source: std::net::AddrParseError,
    },

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        source: std::io::Error,
    },

    #[error("server IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Application state injected into the dispatch handler.
#[derive(Clone)]
struct AppState {
    router: Arc<Router>,
    max_body_size: usize,
}

/// HTTP server driving a [`Router`].
pub struct HttpServer {
    app: axum::Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a server. The router is frozen from here on.
    pub fn new(config: AppConfig, router: Router) -> Self {
        tracing::info!(
            groups = router.groups().len(),
            group_match = ?router.group_match(),
            "Router frozen"
        );
        for (mount, pattern, method) in router.routes() {
            tracing::info!(group = %mount, method = %method, pattern = %pattern, "Route");
        }

        let state = AppState {
            router: Arc::new(router),
            max_body_size: config.limits.max_body_size,
        };
        let app = Self::build_app(&config, state);
        Self { app, config }
    }

    /// Build the Axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &AppConfig, state: AppState) -> axum::Router {
        axum::Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(CatchPanicLayer::new()),
            )
    }

    /// The Axum app, for embedding or in-process testing.
    pub fn app(&self) -> axum::Router {
        self.app.clone()
    }

    /// Configuration the server was built with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Bind the configured listener address.
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        let address: SocketAddr = self
            .config
            .listener
            .bind_address
            .parse()
            .map_err(|source| ServerError::Address {
                address: self.config.listener.bind_address.clone(),
                source,
            })?;

        let listener = TcpListener::bind(address)
            .await
            .map_err(|source| ServerError::Bind { address, source })?;
        Ok(listener)
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!(address = %addr, "HTTP server stopped");
        Ok(())
    }

    /// Serve on a background task; stop it through the returned handle.
    pub fn spawn(self, listener: TcpListener) -> Result<ServerHandle, ServerError> {
        let local_addr = listener.local_addr()?;
        let shutdown = Shutdown::new();
        let task = tokio::spawn(self.run(listener, shutdown.subscribe()));
        Ok(ServerHandle {
            local_addr,
            shutdown,
            task,
        })
    }
}

/// A running server started with [`HttpServer::spawn`].
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    task: JoinHandle<Result<(), ServerError>>,
}

impl ServerHandle {
    /// Address the server is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting, drain in-flight requests and wait for the server to exit.
    pub async fn stop(self) -> Result<(), ServerError> {
        self.shutdown.trigger();
        self.task.await?
    }
}

/// Hand one request to the route tree.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let (parts, body) = request.into_parts();

    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, limit = state.max_body_size, "Rejecting request body");
            metrics::record_request(&method, 413, "none", start_time);
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large\n").into_response();
        }
    };

    // Handlers are synchronous; run them off the async workers so the
    // timeout layer can answer while a slow handler is still busy.
    let router = Arc::clone(&state.router);
    let mut ctx = Context::from_parts(parts, body);
    let dispatched = tokio::task::spawn_blocking(move || {
        let result = router.serve(&mut ctx);
        (ctx, result)
    })
    .await;

    let (response, pattern) = match dispatched {
        Ok((ctx, Ok(()))) => {
            let pattern = ctx.pattern().unwrap_or("none").to_string();
            (ctx.into_response(), pattern)
        }
        Ok((ctx, Err(e))) => {
            let pattern = ctx.pattern().unwrap_or("none").to_string();
            tracing::error!(error = %e, pattern = %pattern, "Handler failed");
            (internal_error(), pattern)
        }
        Err(e) => {
            tracing::error!(error = %e, "Handler panicked");
            (internal_error(), "none".to_string())
        }
    };

    metrics::record_request(&method, response.status().as_u16(), &pattern, start_time);
    response
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error\n").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let mut router = Router::new();
        router
            .group("user")
            .get(
                "/get/:id",
                |ctx: &mut Context| {
                    let id = ctx.param("id").unwrap_or_default().to_string();
                    ctx.string(200, format!("user {id}"));
                    Ok(())
                },
                [],
            )
            .unwrap()
            .post(
                "/echo",
                |ctx: &mut Context| {
                    let body = ctx.body().clone();
                    ctx.write_body(body);
                    Ok(())
                },
                [],
            )
            .unwrap()
            .get("/fail", |_ctx: &mut Context| Err("broken".into()), [])
            .unwrap()
            .get("/panic", |_ctx: &mut Context| panic!("handler bug"), [])
            .unwrap()
            .get(
                "/slow",
                |ctx: &mut Context| {
                    std::thread::sleep(Duration::from_secs(2));
                    ctx.string(200, "late");
                    Ok(())
                },
                [],
            )
            .unwrap();

        let mut config = AppConfig::default();
        config.limits.max_body_size = 16;
        config.timeouts.request_secs = 1;
        HttpServer::new(config, router)
    }

    async fn call(server: &HttpServer, request: Request<Body>) -> (StatusCode, String, Response) {
        let response = server.app().oneshot(request).await.unwrap();
        let status = response.status();
        let (parts, body) = response.into_parts();
        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        (status, text, Response::from_parts(parts, Body::empty()))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_through_app() {
        let server = server();
        let (status, text, response) = call(&server, get("/user/get/9")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text, "user 9");
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_synthetic_responses() {
        let server = server();
        let (status, text, _) = call(&server, get("/nobody")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(text, "/nobody not found\n");

        let (status, _, response) = call(&server, get("/user/echo")).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get("allow").unwrap(), "POST");
    }

    #[tokio::test]
    async fn test_handler_error_becomes_500() {
        let server = server();
        let (status, _, _) = call(&server, get("/user/fail")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_500() {
        let server = server();
        let (status, text, _) = call(&server, get("/user/panic")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(text, "internal server error\n");

        // The server keeps serving afterwards.
        let (status, _, _) = call(&server, get("/user/get/1")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_slow_handler_times_out() {
        let server = server();
        let start = Instant::now();
        let (status, _, _) = call(&server, get("/user/slow")).await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_body_limit() {
        let server = server();
        let small = Request::builder()
            .method("POST")
            .uri("/user/echo")
            .body(Body::from("hello"))
            .unwrap();
        let (status, text, _) = call(&server, small).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text, "hello");

        let large = Request::builder()
            .method("POST")
            .uri("/user/echo")
            .body(Body::from("x".repeat(64)))
            .unwrap();
        let (status, _, _) = call(&server, large).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_invalid_bind_address() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "nowhere".into();
        let server = HttpServer::new(config, Router::new());
        assert!(matches!(server.bind().await, Err(ServerError::Address { .. })));
    }
}
