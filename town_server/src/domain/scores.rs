// Leaderboard entry exchanged with the remote score service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub initials: String,
    pub score: u32,
}
