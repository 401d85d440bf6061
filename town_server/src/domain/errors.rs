use std::fmt;

// Domain-level errors for game and area commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    GameNotInProgress,
    GameFull,
    PlayerNotInGame,
    GameIdMismatch,
    InvalidCommand(String),
    WordListNotLoaded,
    WordListLoad(String),
    MoveTimeExpired,
    PlayerNotInArea,
    AreaNotFound,
    PlayerNotFound,
}

impl GameError {
    /// Stable machine-readable code sent to clients alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::GameNotInProgress => "game_not_in_progress",
            GameError::GameFull => "game_full",
            GameError::PlayerNotInGame => "player_not_in_game",
            GameError::GameIdMismatch => "game_id_mismatch",
            GameError::InvalidCommand(_) => "invalid_command",
            GameError::WordListNotLoaded => "word_list_not_loaded",
            GameError::WordListLoad(_) => "word_list_load",
            GameError::MoveTimeExpired => "move_time_expired",
            GameError::PlayerNotInArea => "player_not_in_area",
            GameError::AreaNotFound => "area_not_found",
            GameError::PlayerNotFound => "player_not_found",
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::GameNotInProgress => write!(f, "game not in progress"),
            GameError::GameFull => write!(f, "game is full"),
            GameError::PlayerNotInGame => write!(f, "player is not in this game"),
            GameError::GameIdMismatch => write!(f, "game id does not match the current game"),
            GameError::InvalidCommand(kind) => write!(f, "unrecognized command: {kind}"),
            GameError::WordListNotLoaded => write!(f, "word list not loaded"),
            GameError::WordListLoad(reason) => write!(f, "failed to load word list: {reason}"),
            GameError::MoveTimeExpired => write!(f, "move submitted after the time limit"),
            GameError::PlayerNotInArea => write!(f, "player is not inside this area"),
            GameError::AreaNotFound => write!(f, "area not found"),
            GameError::PlayerNotFound => write!(f, "player not found"),
        }
    }
}

impl std::error::Error for GameError {}
