use crate::domain::errors::{ScoresError, StoreError};
use crate::interface_adapters::protocol::{ErrorResponse, ScoreEntryResponse, SubmitScoreRequest};
use crate::interface_adapters::state::AppState;
use crate::use_cases::submit_score::SubmitScoreUseCase;
use crate::use_cases::top_scores::TopScoresUseCase;
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use tracing::{error, info, warn};

type HandlerError = (StatusCode, Json<ErrorResponse>);

// Handler for reading the leaderboard.
pub async fn top_scores(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScoreEntryResponse>>, HandlerError> {
    let use_case = TopScoresUseCase {
        store: state.store(),
    };

    let entries = use_case.execute().await.map_err(map_scores_error)?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

// Handler for submitting a score; responds with the resulting leaderboard.
pub async fn submit_score(
    State(state): State<AppState>,
    payload: Result<Json<SubmitScoreRequest>, JsonRejection>,
) -> Result<Json<Vec<ScoreEntryResponse>>, HandlerError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(error = %rejection, "rejected score submission body");
        error_response(StatusCode::BAD_REQUEST, "body must be {initials, score}")
    })?;

    let use_case = SubmitScoreUseCase {
        store: state.store(),
    };
    let entries = {
        let _guard = state.write_lock.lock().await;
        use_case
            .execute(&payload.initials, payload.score)
            .await
            .map_err(map_scores_error)?
    };

    info!(initials = %payload.initials.trim(), score = payload.score, "score submitted");
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

fn error_response(status: StatusCode, message: &str) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
}

fn map_scores_error(err: ScoresError) -> HandlerError {
    match err {
        ScoresError::InvalidInitials => {
            error_response(StatusCode::BAD_REQUEST, "initials are required")
        }
        ScoresError::Store(StoreError::Missing) => {
            error_response(StatusCode::NOT_FOUND, "score store not found")
        }
        ScoresError::Store(StoreError::Malformed(detail)) => {
            error!(%detail, "score store is malformed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "score store is malformed")
        }
        ScoresError::Store(StoreError::Io(detail)) => {
            error!(%detail, "score store io failure");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "storage error")
        }
    }
}
