//! Shared utilities for integration tests.

use nanoroute::{AppConfig, HttpServer, Router, ServerHandle};
use tokio::net::TcpListener;

/// Start `router` on an ephemeral local port.
pub async fn start_server(router: Router) -> ServerHandle {
    start_server_with(AppConfig::default(), router).await
}

#[allow(dead_code)]
pub async fn start_server_with(config: AppConfig, router: Router) -> ServerHandle {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    HttpServer::new(config, router).spawn(listener).unwrap()
}

/// Client that never pools or proxies, so each test sees fresh connections.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

pub fn url(server: &ServerHandle, path: &str) -> String {
    format!("http://{}{}", server.local_addr(), path)
}
