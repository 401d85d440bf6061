// Vehicle trick minigame: a single-player timed word-typing session.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::domain::errors::GameError;
use crate::domain::game::{Game, GameFactory, GameInstanceId, GameMove, GameStatus, GameStatusView};
use crate::domain::player::{Player, PlayerId};
use crate::domain::ports::RandomSource;
use crate::domain::word_generator::WordGenerator;

/// How long a session accepts moves after the player joined.
pub const TRICK_TIME_LIMIT: Duration = Duration::from_secs(15);
/// Points awarded for each correctly typed word.
pub const POINTS_PER_WORD: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleTrickState {
    pub status: GameStatus,
    pub player: Option<PlayerId>,
    pub target_word: String,
    pub current_score: u32,
}

impl Default for VehicleTrickState {
    fn default() -> Self {
        Self {
            status: GameStatus::WaitingToStart,
            player: None,
            target_word: String::new(),
            current_score: 0,
        }
    }
}

impl GameStatusView for VehicleTrickState {
    fn status(&self) -> GameStatus {
        self.status
    }
}

#[derive(Debug, Clone)]
pub struct TrickMove {
    pub word: String,
}

#[derive(Debug)]
pub struct VehicleTrickGame {
    id: GameInstanceId,
    state: VehicleTrickState,
    players: Vec<Player>,
    // Kept after leave so the final score can still be labelled.
    seated: Option<Player>,
    words: WordGenerator,
    started_at_millis: u64,
}

impl VehicleTrickGame {
    /// Creates a game around a generator. The generator must already be loaded.
    pub fn new(words: WordGenerator) -> Result<Self, GameError> {
        if !words.is_loaded() {
            return Err(GameError::WordListNotLoaded);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            state: VehicleTrickState::default(),
            players: Vec::new(),
            seated: None,
            words,
            started_at_millis: 0,
        })
    }

    fn replace_state(&mut self, next: VehicleTrickState) {
        self.state = next;
    }

    fn move_time_valid(&self, now_millis: u64) -> bool {
        let elapsed = now_millis.saturating_sub(self.started_at_millis);
        u128::from(elapsed) < TRICK_TIME_LIMIT.as_millis()
    }
}

impl Game for VehicleTrickGame {
    type State = VehicleTrickState;
    type Move = TrickMove;

    fn id(&self) -> GameInstanceId {
        self.id
    }

    fn state(&self) -> &VehicleTrickState {
        &self.state
    }

    fn players(&self) -> &[Player] {
        &self.players
    }

    fn join(&mut self, player: &Player, now_millis: u64) -> Result<(), GameError> {
        if self.state.player.is_some() {
            return Err(GameError::GameFull);
        }

        // Draw before touching anything so a failure leaves the game untouched.
        let target_word = self.words.next_word()?;

        self.replace_state(VehicleTrickState {
            status: GameStatus::InProgress,
            player: Some(player.id),
            target_word,
            current_score: 0,
        });
        self.started_at_millis = now_millis;
        self.players.push(player.clone());
        self.seated = Some(player.clone());
        Ok(())
    }

    fn leave(&mut self, player: &Player) -> Result<(), GameError> {
        if !self.has_player(player.id) {
            return Err(GameError::PlayerNotInGame);
        }

        self.replace_state(VehicleTrickState {
            status: GameStatus::Over,
            ..self.state.clone()
        });
        self.players.retain(|p| p.id != player.id);
        Ok(())
    }

    fn apply_move(&mut self, mv: GameMove<TrickMove>, now_millis: u64) -> Result<(), GameError> {
        if self.state.status != GameStatus::InProgress {
            return Err(GameError::GameNotInProgress);
        }
        if !self.has_player(mv.player_id) {
            return Err(GameError::PlayerNotInGame);
        }
        if !self.move_time_valid(now_millis) {
            return Err(GameError::MoveTimeExpired);
        }

        let reward = if mv.payload.word == self.state.target_word {
            POINTS_PER_WORD
        } else {
            0
        };
        let target_word = self.words.next_word()?;

        self.replace_state(VehicleTrickState {
            target_word,
            current_score: self.state.current_score + reward,
            ..self.state.clone()
        });
        Ok(())
    }

    fn end(&mut self) {
        if self.state.status == GameStatus::InProgress {
            self.replace_state(VehicleTrickState {
                status: GameStatus::Over,
                ..self.state.clone()
            });
        }
    }

    fn result_scores(&self) -> Vec<(String, u32)> {
        self.seated
            .iter()
            .map(|p| (p.display_name.clone(), self.state.current_score))
            .collect()
    }
}

/// Builds trick games, loading the word corpus fresh for every instance.
pub struct VehicleTrickGameFactory {
    word_list: PathBuf,
    random: Arc<dyn RandomSource>,
}

impl VehicleTrickGameFactory {
    pub fn new(word_list: impl Into<PathBuf>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            word_list: word_list.into(),
            random,
        }
    }
}

impl GameFactory for VehicleTrickGameFactory {
    type Game = VehicleTrickGame;

    fn create(&self) -> Result<VehicleTrickGame, GameError> {
        let mut words = WordGenerator::new(self.random.clone());
        words.load_words(&self.word_list)?;
        VehicleTrickGame::new(words)
    }
}
