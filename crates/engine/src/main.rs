//! Minebot Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use minebot_engine::api::{self, websocket::ws_handler};
use minebot_engine::app::{App, AppPorts};
use minebot_engine::config::{self, BotConfig};
use minebot_engine::infrastructure::{
    catalog::MinecraftDataCatalog,
    clock::SystemClock,
    game_bridge::{GameBridge, DEFAULT_REQUEST_TIMEOUT},
    openai::OpenAiCompatClient,
};
use minebot_engine::use_cases::{CommandNormalizer, TextClassifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from the working directory.
    if let Ok(dir) = std::env::current_dir() {
        config::load_dotenv_from(&dir);
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "minebot_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Minebot Engine");

    let config = BotConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        username = %config.username,
        normalizer = %config.normalizer_mode,
        bridge = %config.game_bridge_url,
        "Configuration loaded"
    );

    let cancel = CancellationToken::new();
    setup_shutdown_signal(cancel.clone());

    let catalog = Arc::new(MinecraftDataCatalog::new(&config.minecraft_data_dir));

    tracing::info!("Connecting to game bridge at {}", config.game_bridge_url);
    let (game, events) = GameBridge::connect(&config.game_bridge_url, DEFAULT_REQUEST_TIMEOUT)
        .await
        .context("failed to connect to game bridge")?;

    let normalizer = if config.normalizer_mode.uses_classifier() {
        tracing::info!(
            base_url = %config.llm.base_url,
            model = %config.llm.model,
            "Classifier configured"
        );
        let llm = Arc::new(OpenAiCompatClient::new(&config.llm));
        CommandNormalizer::new(config.normalizer_mode, TextClassifier::new(llm))
    } else {
        CommandNormalizer::literal()
    };

    let app = Arc::new(App::new(
        config.username.clone(),
        config.relay_speaker.clone(),
        normalizer,
        AppPorts {
            game: Arc::new(game),
            catalog,
            clock: Arc::new(SystemClock),
        },
    ));

    tokio::spawn(api::run_stats_broadcaster(
        app.clone(),
        config.stats_interval,
        cancel.clone(),
    ));

    let mut router = api::http::routes()
        .route("/ws", get(ws_handler))
        .with_state(app.clone())
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(config.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    tracing::info!("Observer relay listening on {}", config.relay_addr);
    let listener = tokio::net::TcpListener::bind(config.relay_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.relay_addr))?;

    let server_cancel = cancel.clone();
    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { server_cancel.cancelled().await });

    let session = api::run_game_events(app, events, cancel.clone());

    let (server_result, session_result) = tokio::join!(
        async {
            let result = server.await;
            cancel.cancel();
            result
        },
        async {
            let result = session.await;
            cancel.cancel();
            result
        }
    );

    server_result.context("observer relay failed")?;
    session_result?;

    tracing::info!("Minebot Engine stopped");
    Ok(())
}

/// Cancel `cancel` on Ctrl+C or SIGTERM.
fn setup_shutdown_signal(cancel: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
            _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
        }

        cancel.cancel();
    });
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
