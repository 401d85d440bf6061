// Use-case level inputs/outputs for the town loop.

use tokio::sync::oneshot;

use crate::domain::{
    GameError, GameInstanceId, GameResult, Player, PlayerId, ScoreEntry, VehicleTrickState,
    VehicleType,
};

/// Commands a player can send to an area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AreaCommand {
    JoinGame,
    GameMove {
        game_id: GameInstanceId,
        word: String,
    },
    LeaveGame {
        game_id: GameInstanceId,
    },
    GameEnded {
        player_initials: String,
    },
    EquipVehicle {
        vehicle_type: Option<VehicleType>,
    },
}

impl AreaCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            AreaCommand::JoinGame => "JoinGame",
            AreaCommand::GameMove { .. } => "GameMove",
            AreaCommand::LeaveGame { .. } => "LeaveGame",
            AreaCommand::GameEnded { .. } => "GameEnded",
            AreaCommand::EquipVehicle { .. } => "EquipVehicle",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandResponse {
    Joined { game_id: GameInstanceId },
    Done,
    VehicleChanged(Player),
}

pub type CommandResult = Result<CommandResponse, GameError>;

#[derive(Debug, Clone, PartialEq)]
pub struct GameModel<S> {
    pub id: GameInstanceId,
    pub players: Vec<PlayerId>,
    pub state: S,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleTrickAreaModel {
    pub id: String,
    pub occupants: Vec<PlayerId>,
    pub game: Option<GameModel<VehicleTrickState>>,
    pub history: Vec<GameResult>,
    pub persistent_history: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRackAreaModel {
    pub id: String,
    pub occupants: Vec<PlayerId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AreaModel {
    VehicleTrick(VehicleTrickAreaModel),
    VehicleRack(VehicleRackAreaModel),
}

impl AreaModel {
    pub fn id(&self) -> &str {
        match self {
            AreaModel::VehicleTrick(model) => &model.id,
            AreaModel::VehicleRack(model) => &model.id,
        }
    }
}

/// Broadcast to every connected client after a fully applied change.
#[derive(Debug, Clone)]
pub enum TownUpdate {
    AreaChanged(AreaModel),
    PlayerJoined(Player),
    PlayerLeft { player_id: PlayerId },
    PlayerChanged(Player),
}

#[derive(Debug, Clone)]
pub struct TownSnapshot {
    pub players: Vec<Player>,
    pub areas: Vec<AreaModel>,
}

/// Everything the town loop consumes, in arrival order.
#[derive(Debug)]
pub enum TownEvent {
    Join {
        player: Player,
        reply: oneshot::Sender<TownSnapshot>,
    },
    Leave {
        player_id: PlayerId,
    },
    EnterArea {
        player_id: PlayerId,
        area_id: String,
    },
    ExitArea {
        player_id: PlayerId,
        area_id: String,
    },
    Command {
        player_id: PlayerId,
        area_id: String,
        command: AreaCommand,
        reply: oneshot::Sender<CommandResult>,
    },
    // Leaderboard fetched or returned by the remote score service. `seq` orders
    // results by when their request was issued, not when they arrived.
    PersistentHistory {
        area_id: String,
        seq: u64,
        entries: Vec<ScoreEntry>,
    },
    Snapshot {
        reply: oneshot::Sender<TownSnapshot>,
    },
}
