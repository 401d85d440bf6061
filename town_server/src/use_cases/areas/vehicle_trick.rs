// Vehicle trick area: hosts the typing minigame and keeps both leaderboards.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::domain::{
    Clock, Game, GameArea, GameError, Player, PlayerId, ScoreBoard, ScoreEntry, TrickMove,
    VehicleTrickGame, VehicleTrickGameFactory,
};
use crate::use_cases::types::{
    AreaCommand, AreaModel, CommandResponse, GameModel, TownEvent, TownUpdate,
    VehicleTrickAreaModel,
};

/// Collaborators shared by every area in a town.
#[derive(Clone)]
pub struct AreaServices {
    pub clock: Arc<dyn Clock>,
    pub scores: Arc<dyn ScoreBoard>,
    // Area-changed notifications for connected clients.
    pub updates_tx: broadcast::Sender<TownUpdate>,
    // Loop-back into the town task for results of background score calls.
    pub events_tx: mpsc::Sender<TownEvent>,
}

pub struct VehicleTrickArea {
    area: GameArea<VehicleTrickGame>,
    persistent_history: Vec<ScoreEntry>,
    // Issue order of remote leaderboard requests.
    next_seq: u64,
    applied_seq: Option<u64>,
    factory: VehicleTrickGameFactory,
    services: AreaServices,
}

impl VehicleTrickArea {
    /// Creates the area and starts fetching the remote leaderboard in the background.
    pub fn new(id: impl Into<String>, factory: VehicleTrickGameFactory, services: AreaServices) -> Self {
        let mut area = Self {
            area: GameArea::new(id),
            persistent_history: Vec::new(),
            next_seq: 0,
            applied_seq: None,
            factory,
            services,
        };
        area.spawn_top_scores_fetch();
        area
    }

    pub fn id(&self) -> &str {
        self.area.id()
    }

    pub fn game_area(&self) -> &GameArea<VehicleTrickGame> {
        &self.area
    }

    pub fn persistent_history(&self) -> &[ScoreEntry] {
        &self.persistent_history
    }

    pub fn handle_command(
        &mut self,
        command: AreaCommand,
        player: &Player,
    ) -> Result<CommandResponse, GameError> {
        let now = self.services.clock.now_millis();
        let response = match command {
            AreaCommand::JoinGame => {
                let game_id = self.area.join_game(&self.factory, player, now)?;
                info!(area_id = %self.id(), %game_id, player_id = player.id, "player joined trick game");
                CommandResponse::Joined { game_id }
            }
            AreaCommand::GameMove { game_id, word } => {
                self.area
                    .apply_move(game_id, player.id, TrickMove { word }, now)?;
                CommandResponse::Done
            }
            AreaCommand::LeaveGame { game_id } => {
                self.area.leave_game(game_id, player)?;
                info!(area_id = %self.id(), %game_id, player_id = player.id, "player left trick game");
                CommandResponse::Done
            }
            AreaCommand::GameEnded { player_initials } => {
                self.end_game(player_initials.trim())?;
                CommandResponse::Done
            }
            other => return Err(GameError::InvalidCommand(other.kind().to_string())),
        };

        self.emit_changed();
        Ok(response)
    }

    pub fn add_occupant(&mut self, player_id: PlayerId) {
        if self.area.add_occupant(player_id) {
            self.emit_changed();
        }
    }

    /// Removes the player, leaving the live game on their behalf if seated.
    pub fn remove_occupant(&mut self, player: &Player) {
        let withdrew = self.area.withdraw_player(player);
        let removed = self.area.remove_occupant(player.id);
        if withdrew || removed {
            self.emit_changed();
        }
    }

    /// Applies a leaderboard returned for request `seq`.
    ///
    /// Results issued before the last applied one are stale and dropped, so a
    /// slow startup fetch never replaces the list returned by a later submission.
    /// Returns whether the result was accepted.
    pub fn apply_persistent_history(&mut self, seq: u64, entries: Vec<ScoreEntry>) -> bool {
        if self.applied_seq.is_some_and(|applied| seq <= applied) {
            debug!(area_id = %self.id(), seq, "dropping stale leaderboard");
            return false;
        }
        self.applied_seq = Some(seq);
        if self.persistent_history != entries {
            self.persistent_history = entries;
            self.emit_changed();
        }
        true
    }

    pub fn to_model(&self) -> AreaModel {
        AreaModel::VehicleTrick(VehicleTrickAreaModel {
            id: self.id().to_string(),
            occupants: self.area.occupants().to_vec(),
            game: self.area.game().map(|game| GameModel {
                id: game.id(),
                players: game.players().iter().map(|p| p.id).collect(),
                state: game.state().clone(),
            }),
            history: self.area.history().to_vec(),
            persistent_history: self.persistent_history.clone(),
        })
    }

    fn end_game(&mut self, player_initials: &str) -> Result<(), GameError> {
        let game = self.area.game_mut().ok_or(GameError::GameNotInProgress)?;
        game.end();
        let (game_id, score) = (game.id(), game.state().current_score);

        // A repeated GameEnded for the same instance neither adds a row nor resubmits.
        if self
            .area
            .record_result(game_id, [(player_initials.to_string(), score)])
        {
            info!(area_id = %self.id(), %game_id, score, "trick game ended");
            self.spawn_score_submission(ScoreEntry {
                initials: player_initials.to_string(),
                score,
            });
        }
        Ok(())
    }

    fn emit_changed(&self) {
        // No receivers simply means nobody is connected.
        let _ = self
            .services
            .updates_tx
            .send(TownUpdate::AreaChanged(self.to_model()));
    }

    fn issue_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn spawn_top_scores_fetch(&mut self) {
        let seq = self.issue_seq();
        let scores = self.services.scores.clone();
        let events_tx = self.services.events_tx.clone();
        let area_id = self.id().to_string();
        tokio::spawn(async move {
            match scores.top_scores().await {
                Ok(entries) => {
                    debug!(%area_id, count = entries.len(), "fetched top scores");
                    let _ = events_tx
                        .send(TownEvent::PersistentHistory {
                            area_id,
                            seq,
                            entries,
                        })
                        .await;
                }
                Err(error) => {
                    warn!(%area_id, %error, "failed to fetch top scores");
                }
            }
        });
    }

    fn spawn_score_submission(&mut self, entry: ScoreEntry) {
        let seq = self.issue_seq();
        let scores = self.services.scores.clone();
        let events_tx = self.services.events_tx.clone();
        let area_id = self.id().to_string();
        tokio::spawn(async move {
            match scores.add_score(entry).await {
                Ok(entries) => {
                    let _ = events_tx
                        .send(TownEvent::PersistentHistory {
                            area_id,
                            seq,
                            entries,
                        })
                        .await;
                }
                Err(error) => {
                    // Dropped submissions are accepted; there is no retry.
                    warn!(%area_id, %error, "failed to submit score");
                }
            }
        });
    }
}
