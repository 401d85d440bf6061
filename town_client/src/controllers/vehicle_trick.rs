use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use crate::controllers::base::{GameAreaCache, GameAreaView, emit};
use crate::controllers::{AreaEvent, CommandAck, CommandSender, EVENT_CHANNEL_CAPACITY};
use crate::errors::ClientError;
use crate::protocol::{
    AreaCommandDto, GameResultDto, GameStatusDto, MoveDto, PlayerDto, ScoreEntryDto,
    VehicleTrickAreaDto,
};

/// Mirrors one vehicle trick area and turns model changes into [`AreaEvent`]s.
///
/// `update_from` is idempotent: applying the same model twice emits nothing the
/// second time. Subscriptions are plain broadcast receivers and end when dropped.
pub struct VehicleTrickAreaController {
    id: String,
    local_player_id: String,
    sender: Arc<dyn CommandSender>,
    model: Option<VehicleTrickAreaDto>,
    base: GameAreaCache,
    local_player: Option<PlayerDto>,
    score: u32,
    target_word: String,
    events: broadcast::Sender<AreaEvent>,
}

impl VehicleTrickAreaController {
    pub fn new(
        id: impl Into<String>,
        local_player_id: impl Into<String>,
        sender: Arc<dyn CommandSender>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            id: id.into(),
            local_player_id: local_player_id.into(),
            sender,
            model: None,
            base: GameAreaCache::default(),
            local_player: None,
            score: 0,
            target_word: String::new(),
            events,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AreaEvent> {
        self.events.subscribe()
    }

    /// Last applied model, as received.
    pub fn model(&self) -> Option<&VehicleTrickAreaDto> {
        self.model.as_ref()
    }

    pub fn occupants(&self) -> &[PlayerDto] {
        &self.base.occupants
    }

    pub fn game_id(&self) -> Option<&str> {
        self.base.game_id.as_deref()
    }

    pub fn status(&self) -> GameStatusDto {
        self.base.status
    }

    pub fn players(&self) -> &[PlayerDto] {
        &self.base.players
    }

    pub fn history(&self) -> &[GameResultDto] {
        &self.base.history
    }

    pub fn persistent_history(&self) -> &[ScoreEntryDto] {
        &self.base.persistent_history
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn target_word(&self) -> &str {
        &self.target_word
    }

    pub fn update_from(&mut self, model: &VehicleTrickAreaDto, current_players: &[PlayerDto]) {
        self.model = Some(model.clone());
        self.local_player = current_players
            .iter()
            .find(|p| p.id == self.local_player_id)
            .cloned();

        let game = model.game.as_ref();
        let view = GameAreaView {
            occupants: &model.occupants,
            game_id: game.map(|g| g.id.as_str()),
            status: game.map(|g| g.state.status).unwrap_or_default(),
            players: game.map(|g| g.players.as_slice()).unwrap_or(&[]),
            history: &model.history,
            persistent_history: &model.persistent_history,
        };
        self.base.reconcile(&view, current_players, &self.events);

        let score = game.map(|g| g.state.current_score).unwrap_or(0);
        if score != self.score {
            let previous = self.score;
            self.score = score;
            emit(&self.events, AreaEvent::ScoreChanged(score));
            if score > previous {
                emit(&self.events, AreaEvent::TrickPerformed(score));
            }
        }

        let target_word = game.map(|g| g.state.target_word.as_str()).unwrap_or("");
        if target_word != self.target_word {
            self.target_word = target_word.to_string();
            emit(&self.events, AreaEvent::TargetWordChanged(self.target_word.clone()));
        }
    }

    pub fn refresh_players(&mut self, current_players: &[PlayerDto]) {
        if let Some(model) = self.model.clone() {
            self.update_from(&model, current_players);
        }
    }

    /// Whether the local player is seated in the current game.
    ///
    /// Reads the game's id list, so it holds even before the roster knows the player.
    pub fn is_player(&self) -> bool {
        self.model
            .as_ref()
            .and_then(|model| model.game.as_ref())
            .is_some_and(|game| game.players.contains(&self.local_player_id))
    }

    /// Tricks need a vehicle.
    pub fn can_play(&self) -> bool {
        self.local_player
            .as_ref()
            .is_some_and(|p| p.vehicle.is_some())
    }

    pub fn is_active(&self) -> bool {
        self.base.status == GameStatusDto::InProgress
    }

    pub async fn enter_word(&self, word: &str) -> Result<CommandAck, ClientError> {
        let game_id = match self.game_id() {
            Some(game_id) if self.is_active() => game_id.to_string(),
            _ => {
                debug!(area_id = %self.id, "word entered without a game in progress");
                return Err(ClientError::NoGameInProgress);
            }
        };
        self.sender
            .send_command(
                &self.id,
                AreaCommandDto::GameMove {
                    game_id,
                    mv: MoveDto {
                        word: word.to_string(),
                    },
                },
            )
            .await
    }

    pub async fn game_ended(&self, player_initials: &str) -> Result<CommandAck, ClientError> {
        self.sender
            .send_command(
                &self.id,
                AreaCommandDto::GameEnded {
                    player_initials: player_initials.to_string(),
                },
            )
            .await
    }

    /// Returns the id of the joined game instance.
    pub async fn join_game(&self) -> Result<String, ClientError> {
        let ack = self
            .sender
            .send_command(&self.id, AreaCommandDto::JoinGame)
            .await?;
        ack.game_id
            .ok_or_else(|| ClientError::Protocol("join acknowledged without a game id".into()))
    }

    pub async fn leave_game(&self) -> Result<CommandAck, ClientError> {
        let game_id = self
            .game_id()
            .ok_or(ClientError::NoGameInProgress)?
            .to_string();
        self.sender
            .send_command(&self.id, AreaCommandDto::LeaveGame { game_id })
            .await
    }
}
