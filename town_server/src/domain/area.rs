// Generic game area: occupants, the current game instance, and the result history.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::errors::GameError;
use crate::domain::game::{Game, GameFactory, GameInstanceId, GameMove, GameStatus};
use crate::domain::player::{Player, PlayerId};

/// One concluded game: label to score, appended once per game instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub game_id: GameInstanceId,
    pub scores: BTreeMap<String, u32>,
}

/// Zone on the map hosting at most one live game of type `G`.
///
/// Every mutating operation either applies fully or returns an error with the
/// area unchanged.
#[derive(Debug)]
pub struct GameArea<G: Game> {
    id: String,
    occupants: Vec<PlayerId>,
    game: Option<G>,
    history: Vec<GameResult>,
}

impl<G: Game> GameArea<G> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            occupants: Vec::new(),
            game: None,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn occupants(&self) -> &[PlayerId] {
        &self.occupants
    }

    pub fn game(&self) -> Option<&G> {
        self.game.as_ref()
    }

    pub fn game_mut(&mut self) -> Option<&mut G> {
        self.game.as_mut()
    }

    pub fn history(&self) -> &[GameResult] {
        &self.history
    }

    pub fn is_occupant(&self, player_id: PlayerId) -> bool {
        self.occupants.contains(&player_id)
    }

    /// Returns false when the player was already inside.
    pub fn add_occupant(&mut self, player_id: PlayerId) -> bool {
        if self.is_occupant(player_id) {
            return false;
        }
        self.occupants.push(player_id);
        true
    }

    /// Returns false when the player was not inside.
    pub fn remove_occupant(&mut self, player_id: PlayerId) -> bool {
        let before = self.occupants.len();
        self.occupants.retain(|id| *id != player_id);
        self.occupants.len() != before
    }

    /// Seats the player, creating a new game first if none is live.
    pub fn join_game<F>(
        &mut self,
        factory: &F,
        player: &Player,
        now_millis: u64,
    ) -> Result<GameInstanceId, GameError>
    where
        F: GameFactory<Game = G>,
    {
        let live = self.game.as_mut().filter(|g| g.status() != GameStatus::Over);
        if let Some(game) = live {
            game.join(player, now_millis)?;
        } else {
            // Only store the new instance once the join went through.
            let mut game = factory.create()?;
            game.join(player, now_millis)?;
            debug!(area_id = %self.id, game_id = %game.id(), "created game instance");
            self.game = Some(game);
        }

        self.record_result_if_over();
        self.current_game_id().ok_or(GameError::GameNotInProgress)
    }

    pub fn apply_move(
        &mut self,
        game_id: GameInstanceId,
        player_id: PlayerId,
        payload: G::Move,
        now_millis: u64,
    ) -> Result<(), GameError> {
        let game = self.checked_game(game_id)?;
        game.apply_move(
            GameMove {
                game_id,
                player_id,
                payload,
            },
            now_millis,
        )?;
        self.record_result_if_over();
        Ok(())
    }

    pub fn leave_game(&mut self, game_id: GameInstanceId, player: &Player) -> Result<(), GameError> {
        let game = self.checked_game(game_id)?;
        game.leave(player)?;
        self.record_result_if_over();
        Ok(())
    }

    /// Leaves the live game on behalf of a player who walked away. Returns true if seated.
    pub fn withdraw_player(&mut self, player: &Player) -> bool {
        let Some(game) = self.game.as_mut() else {
            return false;
        };
        if game.status() == GameStatus::Over || !game.has_player(player.id) {
            return false;
        }
        if game.leave(player).is_err() {
            return false;
        }
        self.record_result_if_over();
        true
    }

    pub fn has_result(&self, game_id: GameInstanceId) -> bool {
        self.history.iter().any(|row| row.game_id == game_id)
    }

    /// Appends a history row unless the game already has one. Returns whether a row was added.
    pub fn record_result(
        &mut self,
        game_id: GameInstanceId,
        scores: impl IntoIterator<Item = (String, u32)>,
    ) -> bool {
        if self.has_result(game_id) {
            return false;
        }
        self.history.push(GameResult {
            game_id,
            scores: scores.into_iter().collect(),
        });
        true
    }

    fn current_game_id(&self) -> Option<GameInstanceId> {
        self.game.as_ref().map(Game::id)
    }

    fn checked_game(&mut self, game_id: GameInstanceId) -> Result<&mut G, GameError> {
        let game = self.game.as_mut().ok_or(GameError::GameNotInProgress)?;
        if game.id() != game_id {
            return Err(GameError::GameIdMismatch);
        }
        Ok(game)
    }

    // Post-update hook: a concluded game contributes exactly one history row.
    fn record_result_if_over(&mut self) {
        let Some(game) = self.game.as_ref() else {
            return;
        };
        if game.status() != GameStatus::Over {
            return;
        }
        let (game_id, scores) = (game.id(), game.result_scores());
        self.record_result(game_id, scores);
    }
}
