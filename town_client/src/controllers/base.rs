// Reconciliation shared by every game area controller.

use tokio::sync::broadcast;

use crate::controllers::{AreaEvent, resolve_players};
use crate::protocol::{GameResultDto, GameStatusDto, PlayerDto, ScoreEntryDto};

/// Game-level view of an area model, independent of the game type.
pub struct GameAreaView<'a> {
    pub occupants: &'a [String],
    pub game_id: Option<&'a str>,
    pub status: GameStatusDto,
    pub players: &'a [String],
    pub history: &'a [GameResultDto],
    pub persistent_history: &'a [ScoreEntryDto],
}

/// Last values seen for the fields every game area shares.
#[derive(Debug, Clone, Default)]
pub struct GameAreaCache {
    pub occupants: Vec<PlayerDto>,
    pub game_id: Option<String>,
    pub status: GameStatusDto,
    pub players: Vec<PlayerDto>,
    pub history: Vec<GameResultDto>,
    pub persistent_history: Vec<ScoreEntryDto>,
}

impl GameAreaCache {
    /// Updates changed fields and emits one event per change.
    pub fn reconcile(
        &mut self,
        view: &GameAreaView<'_>,
        current_players: &[PlayerDto],
        events: &broadcast::Sender<AreaEvent>,
    ) {
        let occupants = resolve_players(view.occupants, current_players);
        if occupants != self.occupants {
            self.occupants = occupants.clone();
            emit(events, AreaEvent::OccupantsChanged(occupants));
        }

        let game_id = view.game_id.map(str::to_string);
        if game_id != self.game_id {
            self.game_id = game_id.clone();
            emit(events, AreaEvent::GameInstanceChanged(game_id));
        }

        if view.status != self.status {
            self.status = view.status;
            emit(events, AreaEvent::StatusChanged(view.status));
        }

        let players = resolve_players(view.players, current_players);
        if players != self.players {
            self.players = players.clone();
            emit(events, AreaEvent::PlayersChanged(players));
        }

        if view.history != self.history.as_slice() {
            self.history = view.history.to_vec();
            emit(events, AreaEvent::HistoryChanged(self.history.clone()));
        }

        if view.persistent_history != self.persistent_history.as_slice() {
            self.persistent_history = view.persistent_history.to_vec();
            emit(
                events,
                AreaEvent::PersistentHistoryChanged(self.persistent_history.clone()),
            );
        }
    }
}

// Nobody listening is fine.
pub(crate) fn emit(events: &broadcast::Sender<AreaEvent>, event: AreaEvent) {
    let _ = events.send(event);
}
