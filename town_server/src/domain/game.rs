// Game contract shared by every game type an area can host.

use crate::domain::errors::GameError;
use crate::domain::player::{Player, PlayerId};
use uuid::Uuid;

pub type GameInstanceId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    WaitingToStart,
    InProgress,
    Over,
}

/// Read access to the lifecycle status of a game-specific state snapshot.
pub trait GameStatusView {
    fn status(&self) -> GameStatus;
}

/// A move submitted by a player against a specific game instance.
#[derive(Debug, Clone)]
pub struct GameMove<M> {
    pub game_id: GameInstanceId,
    pub player_id: PlayerId,
    pub payload: M,
}

/// Fixed state machine every game type implements:
/// `WaitingToStart --join--> InProgress --leave/end--> Over`.
///
/// Implementations replace their state snapshot wholesale on every successful
/// mutation and leave it untouched when returning an error.
pub trait Game: Send {
    type State: Clone + GameStatusView;
    type Move;

    fn id(&self) -> GameInstanceId;
    fn state(&self) -> &Self::State;
    fn players(&self) -> &[Player];

    fn join(&mut self, player: &Player, now_millis: u64) -> Result<(), GameError>;
    fn leave(&mut self, player: &Player) -> Result<(), GameError>;
    fn apply_move(&mut self, mv: GameMove<Self::Move>, now_millis: u64) -> Result<(), GameError>;

    /// Forces an in-progress game to `Over`. No-op otherwise.
    fn end(&mut self);

    /// Label to score rows describing the outcome of the game.
    fn result_scores(&self) -> Vec<(String, u32)>;

    fn status(&self) -> GameStatus {
        self.state().status()
    }

    fn has_player(&self, player_id: PlayerId) -> bool {
        self.players().iter().any(|p| p.id == player_id)
    }
}

/// Builds fresh game instances for an area. Construction may fail (e.g. missing assets).
pub trait GameFactory: Send + Sync {
    type Game: Game;

    fn create(&self) -> Result<Self::Game, GameError>;
}
