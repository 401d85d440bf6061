use crate::interface_adapters::handlers::{submit_score, top_scores};
use crate::interface_adapters::state::AppState;
use axum::{Router, routing::get};

// Build the HTTP router for the leaderboard endpoints.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/topScores", get(top_scores).post(submit_score))
        .with_state(state)
}
