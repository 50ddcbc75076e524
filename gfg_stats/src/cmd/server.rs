use crate::cmd::create_practice_api;
use crate::modules::{
    handlers::{self, SharedPracticeApi},
    rate_limit::{self, RateLimitPolicy, RateLimiter},
};
use anyhow::{Context, Result};
use axum::{extract::Extension, middleware, routing, Router, Server};
use clap::Args;
use std::{future::Future, net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;

const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[arg(long)]
    port: Option<u16>,
    /// Requests a client may send per minute
    #[arg(long, default_value_t = 10)]
    per_minute: usize,
    /// Requests a client may send per hour
    #[arg(long, default_value_t = 50)]
    per_hour: usize,
    /// Requests a client may send per day
    #[arg(long, default_value_t = 200)]
    per_day: usize,
}

pub async fn run(args: ServerArgs) -> Result<()> {
    let api = create_practice_api()?;
    let limiter = RateLimiter::new(RateLimitPolicy {
        per_minute: args.per_minute,
        per_hour: args.per_hour,
        per_day: args.per_day,
    });
    tracing::info!(
        "rate limits: {}/minute, {}/hour, {}/day",
        args.per_minute,
        args.per_hour,
        args.per_day
    );

    let app = create_router(Arc::new(api), limiter);
    let port = match args.port {
        Some(port) => port,
        None => {
            tracing::warn!(
                "API server will be launched at default port number {}",
                DEFAULT_PORT
            );
            DEFAULT_PORT
        }
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server start at port {}", port);
    Server::try_bind(&addr)
        .with_context(|| {
            let message = format!("failed to bind server to {}", addr);
            tracing::error!(message);
            message
        })?
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server stopped unexpectedly")?;

    Ok(())
}

fn create_router(api: SharedPracticeApi, limiter: RateLimiter) -> Router {
    Router::new()
        .route("/:username", routing::get(handlers::profile))
        .route("/:username/calendar", routing::get(handlers::calendar))
        .route("/:username/contest", routing::get(handlers::contest))
        .route_layer(middleware::from_fn_with_state(
            Arc::new(limiter),
            rate_limit::enforce,
        ))
        .fallback(handlers::fallback)
        .layer(Extension(api))
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    let signal = first_signal(ctrl_c, terminate).await;
    tracing::info!("{} received, starting graceful shutdown.", signal);
}

/// Name of whichever signal resolves first.
async fn first_signal(
    ctrl_c: impl Future<Output = ()>,
    terminate: impl Future<Output = ()>,
) -> &'static str {
    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
