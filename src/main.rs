//! nanoroute demo server.
//!
//! ```text
//! nanoroute [--config nanoroute.toml] [--bind 127.0.0.1:9421] [--log-level debug]
//! ```
//!
//! Serves a small `user` group showing parameter, literal, catch-all and ANY
//! routes behind group and route middleware.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use serde_json::json;

use nanoroute::config::{load_config, AppConfig};
use nanoroute::lifecycle::{signals, Shutdown};
use nanoroute::observability::{logging, metrics};
use nanoroute::{Context, HttpServer, Middleware, RouteError, Router};

#[derive(Parser, Debug)]
#[command(name = "nanoroute")]
#[command(about = "Demo server for the nanoroute path router", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override `observability.log_level`.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("nanoroute v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        group_match = ?config.routing.group_match,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let router = build_router(&config)?;
    let server = HttpServer::new(config, router);
    let listener = server.bind().await?;

    let shutdown = Shutdown::new();
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::wait_for_signal().await;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(config: &AppConfig) -> Result<Router, RouteError> {
    let mut router = Router::with_group_match(config.routing.group_match);

    let access_log = Middleware::from_fn(|ctx, next| {
        let start = Instant::now();
        let result = next.call(ctx);
        tracing::info!(
            method = %ctx.method(),
            path = %ctx.path(),
            pattern = ctx.pattern().unwrap_or("-"),
            status = ctx.status().as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Handled"
        );
        result
    });

    let require_token = Middleware::from_fn(|ctx, next| {
        if ctx.header("x-admin-token").is_none() {
            ctx.string(401, "missing x-admin-token\n");
            return Ok(());
        }
        next.call(ctx)
    });

    let user = router.group("user");
    user.use_middleware([access_log]);
    user.get("/get/:id", get_user, [])?
        .get("/get/admin", get_admin, [require_token.clone()])?
        .put("/get/:id", update_user, [require_token])?
        .get("/files/**", get_file, [])?
        .any("/ping", ping, [])?;

    Ok(router)
}

fn get_user(ctx: &mut Context) -> nanoroute::HandlerResult {
    let id = ctx.param("id").unwrap_or_default().to_string();
    ctx.json(200, &json!({ "id": id }))?;
    Ok(())
}

fn get_admin(ctx: &mut Context) -> nanoroute::HandlerResult {
    ctx.json(200, &json!({ "id": "admin", "admin": true }))?;
    Ok(())
}

fn update_user(ctx: &mut Context) -> nanoroute::HandlerResult {
    let id = ctx.param("id").unwrap_or_default().to_string();
    let payload: serde_json::Value = serde_json::from_slice(ctx.body())?;
    ctx.json(200, &json!({ "id": id, "updated": payload }))?;
    Ok(())
}

fn get_file(ctx: &mut Context) -> nanoroute::HandlerResult {
    let path = ctx.param("**").unwrap_or_default().to_string();
    ctx.string(200, format!("file: {path}\n"));
    Ok(())
}

fn ping(ctx: &mut Context) -> nanoroute::HandlerResult {
    let method = ctx.method().to_string();
    ctx.string(200, format!("pong ({method})\n"));
    Ok(())
}
