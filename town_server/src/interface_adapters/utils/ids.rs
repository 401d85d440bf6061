use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

// Seed from wall-clock millis so ids from a restarted process do not repeat recent ones.
fn seed() -> u64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    millis << 12
}

/// Process-unique id used for players and connections.
pub fn rand_id() -> u64 {
    static NEXT: OnceLock<AtomicU64> = OnceLock::new();
    NEXT.get_or_init(|| AtomicU64::new(seed()))
        .fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_never_repeat_within_a_process() {
        let ids: HashSet<u64> = (0..1_000).map(|_| rand_id()).collect();
        assert_eq!(ids.len(), 1_000);
    }
}
