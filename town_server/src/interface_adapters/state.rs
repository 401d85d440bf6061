use crate::use_cases::TownHandle;
use axum::extract::ws::Utf8Bytes;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    // Events into the town task plus the domain-level update broadcast.
    pub town: TownHandle,
    // Serialized town updates, shared across all connections.
    pub update_bytes_tx: broadcast::Sender<Utf8Bytes>,
}
