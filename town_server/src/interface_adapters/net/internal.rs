use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::AreaDto;
use crate::interface_adapters::state::AppState;
use crate::use_cases::TownEvent;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::warn;

/// Lists the current area models, in the same shape clients receive them.
pub async fn list_areas_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (reply, reply_rx) = oneshot::channel();
    if state
        .town
        .input_tx
        .send(TownEvent::Snapshot { reply })
        .await
        .is_err()
    {
        warn!("town task unavailable for area listing");
        return unavailable();
    }

    match reply_rx.await {
        Ok(snapshot) => {
            let areas: Vec<AreaDto> = snapshot.areas.iter().map(AreaDto::from).collect();
            (StatusCode::OK, Json(areas)).into_response()
        }
        Err(_) => unavailable(),
    }
}

fn unavailable() -> axum::response::Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: "town unavailable".to_string(),
        }),
    )
        .into_response()
}
