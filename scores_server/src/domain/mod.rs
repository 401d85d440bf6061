pub mod errors;
pub mod leaderboard;
pub mod ports;
