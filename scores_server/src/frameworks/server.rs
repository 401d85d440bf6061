use crate::frameworks::config;
use crate::interface_adapters::routes;
use crate::interface_adapters::state::AppState;
use std::net::SocketAddr;

fn init_tracing() {
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

pub async fn run() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let store_path = config::store_path();
    let state = AppState::new(store_path.clone());
    match state.store().ensure_exists().await {
        Ok(true) => tracing::info!(path = %store_path.display(), "created empty score store"),
        Ok(false) => tracing::debug!(path = %store_path.display(), "using existing score store"),
        Err(error) => {
            tracing::error!(path = %store_path.display(), %error, "failed to prepare score store");
            return;
        }
    }

    let app = routes::app(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config::http_port()));
    tracing::info!(%addr, "listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%addr, %error, "failed to bind");
            return;
        }
    };

    if let Err(error) = axum::serve(listener, app).await {
        tracing::error!(%error, "server error");
    }
}
