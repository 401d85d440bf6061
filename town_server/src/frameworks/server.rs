// Framework bootstrap for the town server runtime.

use crate::frameworks::config;
use crate::interface_adapters::clients::ScoresClient;
use crate::interface_adapters::net::{list_areas_handler, spawn_update_serializer, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::{SystemClock, ThreadRandom};
use crate::use_cases::{TownServices, TownSettings, spawn_town};

use axum::{Router, extract::ws::Utf8Bytes, routing::get};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};
use tokio::sync::broadcast;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/areas", get(list_areas_handler))
        .with_state(state)
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state()?;
    let app = router(state);

    tracing::info!(%address, "listening");

    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

fn build_state() -> Result<Arc<AppState>> {
    let scores_base_url = config::scores_service_url();
    let scores_timeout = config::scores_timeout();
    let scores = ScoresClient::new(scores_base_url.clone(), scores_timeout)
        .map_err(|e| std::io::Error::other(format!("failed to initialize scores client: {e}")))?;
    tracing::debug!(
        scores_base_url = %scores_base_url,
        scores_timeout_ms = scores_timeout.as_millis(),
        "scores client configured"
    );

    let settings = TownSettings {
        input_channel_capacity: config::INPUT_CHANNEL_CAPACITY,
        update_broadcast_capacity: config::UPDATE_BROADCAST_CAPACITY,
        word_list_path: config::word_list_path(),
        trick_area_ids: config::trick_area_ids(),
        rack_area_ids: config::rack_area_ids(),
    };
    tracing::info!(
        word_list_path = %settings.word_list_path.display(),
        trick_areas = settings.trick_area_ids.len(),
        rack_areas = settings.rack_area_ids.len(),
        "town configured"
    );

    // The town task owns every area; adapters only hold its channels.
    let town = spawn_town(
        &settings,
        TownServices {
            clock: Arc::new(SystemClock),
            random: Arc::new(ThreadRandom),
            scores: Arc::new(scores),
        },
    );

    let (update_bytes_tx, _update_bytes_rx) =
        broadcast::channel::<Utf8Bytes>(config::UPDATE_BROADCAST_CAPACITY);
    spawn_update_serializer(&town, update_bytes_tx.clone());

    Ok(Arc::new(AppState {
        town,
        update_bytes_tx,
    }))
}
