use std::{env, path::PathBuf};

pub fn http_port() -> u16 {
    env::var("SCORES_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3004)
}

pub fn store_path() -> PathBuf {
    env::var("SCORES_STORE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/top_scores.json"))
}
