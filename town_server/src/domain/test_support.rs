use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::domain::ports::{Clock, RandomSource};

// Random source that replays a fixed list of indices, wrapping around.
pub(crate) struct ScriptedRandom {
    picks: Vec<usize>,
    cursor: AtomicUsize,
}

impl ScriptedRandom {
    pub(crate) fn new(picks: Vec<usize>) -> Self {
        Self {
            picks,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn index(&self, len: usize) -> usize {
        let at = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.picks[at % self.picks.len()] % len
    }
}

// Clock that only moves when a test advances it.
pub(crate) struct ManualClock(AtomicU64);

impl ManualClock {
    pub(crate) fn new(start_millis: u64) -> Self {
        Self(AtomicU64::new(start_millis))
    }

    pub(crate) fn advance_millis(&self, millis: u64) {
        self.0.fetch_add(millis, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

// Writes a throwaway corpus file and returns its path.
pub(crate) fn write_word_list(words: &[&str]) -> PathBuf {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    let file_name = format!(
        "town-words-{}-{}.txt",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    );
    let path = std::env::temp_dir().join(file_name);
    std::fs::write(&path, words.join("\n")).expect("write word list");
    path
}
