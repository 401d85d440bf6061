use std::{env, path::PathBuf, time::Duration};

// Runtime/server constants and environment-backed settings.

pub fn http_port() -> u16 {
    env::var("TOWN_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3001)
}

pub fn scores_service_url() -> String {
    env::var("SCORES_SERVICE_URL").unwrap_or_else(|_| "http://127.0.0.1:3004".to_string())
}

pub fn scores_timeout() -> Duration {
    let millis = env::var("SCORES_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(1500);
    Duration::from_millis(millis)
}

// Resolved against the crate, not the working directory.
const DEFAULT_WORD_LIST_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/words.txt");

pub fn word_list_path() -> PathBuf {
    env::var("WORD_LIST_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_WORD_LIST_PATH))
}

pub fn trick_area_ids() -> Vec<String> {
    area_ids("TRICK_AREA_IDS", "VehicleTrickArea1")
}

pub fn rack_area_ids() -> Vec<String> {
    area_ids("RACK_AREA_IDS", "VehicleRack1")
}

// Comma-separated list; blanks are skipped.
fn area_ids(key: &str, default: &str) -> Vec<String> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    parse_area_ids(&raw)
}

fn parse_area_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const UPDATE_BROADCAST_CAPACITY: usize = 128;
