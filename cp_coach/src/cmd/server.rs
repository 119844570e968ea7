use crate::modules::{
    context::Context,
    handlers::{
        health, liveness, practice_summary, rating_history, recommended, training_plan,
        update_data, weak_strong_tags,
    },
    settings::Settings,
};
use anyhow::{Context as _, Result};
use axum::{extract::Extension, routing, Router, Server};
use clap::Args;
use cp_coach_libs::store::HistoryStore;
use std::{net::SocketAddr, sync::Arc};

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[arg(long)]
    port: Option<u16>,
}

pub async fn run(args: ServerArgs) -> Result<()> {
    let context = Context::connect(&Settings::from_env()).await?;
    context.history.ping().await.with_context(|| {
        let message = "database is not available";
        tracing::error!(message);
        message
    })?;

    let app = create_router(Arc::new(context));
    let port = match args.port {
        Some(port) => port,
        None => {
            tracing::warn!("API server will be launched at default port number 8000");
            8000u16
        }
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server start at port {}", port);
    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .with_context(|| {
            let message = format!("API server on port {} stopped with error", port);
            tracing::error!(message);
            message
        })?;

    Ok(())
}

pub fn create_router(context: Arc<Context>) -> Router {
    Router::new()
        .route("/api/health", routing::get(health))
        .route("/api/liveness", routing::get(liveness))
        .route("/api/analytics/weak-strong-tags", routing::get(weak_strong_tags))
        .route("/api/analytics/training-plan", routing::get(training_plan))
        .route("/api/practice/recommended", routing::get(recommended))
        .route("/api/practice/summary", routing::get(practice_summary))
        .route("/api/rating-history", routing::get(rating_history))
        .route("/api/update-data", routing::post(update_data))
        .layer(Extension(context))
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

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, starting graceful shutdown.");
}
