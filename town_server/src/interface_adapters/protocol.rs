// Wire protocol DTOs and conversions for the town WebSocket.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    GameError, GameResult, GameStatus, Player, ScoreEntry, Vehicle, VehicleTrickState,
    VehicleType,
};
use crate::use_cases::{
    AreaCommand, AreaModel, CommandResponse, GameModel, TownSnapshot, TownUpdate,
    VehicleRackAreaModel, VehicleTrickAreaModel,
};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Assigned identity for the connection after Join is accepted.
    Identity { player_id: String },
    // Full town state sent right after Identity.
    Snapshot(TownSnapshotDto),
    AreaChanged(AreaDto),
    PlayerJoined(PlayerDto),
    PlayerLeft { player_id: String },
    PlayerChanged(PlayerDto),
    // Reply to a single Command, correlated by command_id.
    CommandResult(CommandResultDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Initial handshake message with identity metadata.
    Join(JoinPayload),
    EnterArea { area_id: String },
    ExitArea { area_id: String },
    Command(CommandPayload),
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinPayload {
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandPayload {
    pub command_id: u64,
    pub area_id: String,
    pub command: AreaCommandDto,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveDto {
    pub word: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum AreaCommandDto {
    JoinGame,
    GameMove {
        game_id: String,
        #[serde(rename = "move")]
        mv: MoveDto,
    },
    LeaveGame {
        game_id: String,
    },
    GameEnded {
        player_initials: String,
    },
    EquipVehicle {
        #[serde(default)]
        vehicle_type: Option<VehicleTypeDto>,
    },
}

// An unparsable id can never name the current game.
fn parse_game_id(raw: &str) -> Result<Uuid, GameError> {
    Uuid::parse_str(raw.trim()).map_err(|_| GameError::GameIdMismatch)
}

impl TryFrom<AreaCommandDto> for AreaCommand {
    type Error = GameError;

    fn try_from(dto: AreaCommandDto) -> Result<Self, Self::Error> {
        Ok(match dto {
            AreaCommandDto::JoinGame => AreaCommand::JoinGame,
            AreaCommandDto::GameMove { game_id, mv } => AreaCommand::GameMove {
                game_id: parse_game_id(&game_id)?,
                word: mv.word,
            },
            AreaCommandDto::LeaveGame { game_id } => AreaCommand::LeaveGame {
                game_id: parse_game_id(&game_id)?,
            },
            AreaCommandDto::GameEnded { player_initials } => {
                AreaCommand::GameEnded { player_initials }
            }
            AreaCommandDto::EquipVehicle { vehicle_type } => AreaCommand::EquipVehicle {
                vehicle_type: vehicle_type.map(VehicleType::from),
            },
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleTypeDto {
    Bike,
    Skateboard,
    Horse,
}

impl From<VehicleTypeDto> for VehicleType {
    fn from(dto: VehicleTypeDto) -> Self {
        match dto {
            VehicleTypeDto::Bike => VehicleType::Bike,
            VehicleTypeDto::Skateboard => VehicleType::Skateboard,
            VehicleTypeDto::Horse => VehicleType::Horse,
        }
    }
}

impl From<VehicleType> for VehicleTypeDto {
    fn from(vehicle_type: VehicleType) -> Self {
        match vehicle_type {
            VehicleType::Bike => VehicleTypeDto::Bike,
            VehicleType::Skateboard => VehicleTypeDto::Skateboard,
            VehicleType::Horse => VehicleTypeDto::Horse,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleDto {
    pub vehicle_type: VehicleTypeDto,
    pub speed_multiplier: f32,
}

impl From<&Vehicle> for VehicleDto {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            vehicle_type: vehicle.vehicle_type.into(),
            speed_multiplier: vehicle.speed_multiplier,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerDto {
    pub id: String,
    pub display_name: String,
    pub vehicle: Option<VehicleDto>,
}

impl From<&Player> for PlayerDto {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.to_string(),
            display_name: player.display_name.clone(),
            vehicle: player.vehicle.as_ref().map(VehicleDto::from),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatusDto {
    WaitingToStart,
    InProgress,
    Over,
}

impl From<GameStatus> for GameStatusDto {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::WaitingToStart => GameStatusDto::WaitingToStart,
            GameStatus::InProgress => GameStatusDto::InProgress,
            GameStatus::Over => GameStatusDto::Over,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleTrickStateDto {
    pub status: GameStatusDto,
    pub player: Option<String>,
    pub target_word: String,
    pub current_score: u32,
}

impl From<&VehicleTrickState> for VehicleTrickStateDto {
    fn from(state: &VehicleTrickState) -> Self {
        Self {
            status: state.status.into(),
            player: state.player.map(|id| id.to_string()),
            target_word: state.target_word.clone(),
            current_score: state.current_score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameDto {
    pub id: String,
    pub players: Vec<String>,
    pub state: VehicleTrickStateDto,
}

impl From<&GameModel<VehicleTrickState>> for GameDto {
    fn from(game: &GameModel<VehicleTrickState>) -> Self {
        Self {
            id: game.id.to_string(),
            players: game.players.iter().map(u64::to_string).collect(),
            state: VehicleTrickStateDto::from(&game.state),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameResultDto {
    pub game_id: String,
    pub scores: BTreeMap<String, u32>,
}

impl From<&GameResult> for GameResultDto {
    fn from(result: &GameResult) -> Self {
        Self {
            game_id: result.game_id.to_string(),
            scores: result.scores.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreEntryDto {
    pub initials: String,
    pub score: u32,
}

impl From<&ScoreEntry> for ScoreEntryDto {
    fn from(entry: &ScoreEntry) -> Self {
        Self {
            initials: entry.initials.clone(),
            score: entry.score,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleTrickAreaDto {
    pub id: String,
    pub occupants: Vec<String>,
    pub game: Option<GameDto>,
    pub history: Vec<GameResultDto>,
    pub persistent_history: Vec<ScoreEntryDto>,
}

impl From<&VehicleTrickAreaModel> for VehicleTrickAreaDto {
    fn from(model: &VehicleTrickAreaModel) -> Self {
        Self {
            id: model.id.clone(),
            occupants: model.occupants.iter().map(u64::to_string).collect(),
            game: model.game.as_ref().map(GameDto::from),
            history: model.history.iter().map(GameResultDto::from).collect(),
            persistent_history: model
                .persistent_history
                .iter()
                .map(ScoreEntryDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleRackAreaDto {
    pub id: String,
    pub occupants: Vec<String>,
}

impl From<&VehicleRackAreaModel> for VehicleRackAreaDto {
    fn from(model: &VehicleRackAreaModel) -> Self {
        Self {
            id: model.id.clone(),
            occupants: model.occupants.iter().map(u64::to_string).collect(),
        }
    }
}

/// Area model as broadcast to clients, tagged with its area type.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum AreaDto {
    VehicleTrickArea(VehicleTrickAreaDto),
    VehicleRackArea(VehicleRackAreaDto),
}

impl From<&AreaModel> for AreaDto {
    fn from(model: &AreaModel) -> Self {
        match model {
            AreaModel::VehicleTrick(model) => AreaDto::VehicleTrickArea(model.into()),
            AreaModel::VehicleRack(model) => AreaDto::VehicleRackArea(model.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TownSnapshotDto {
    pub players: Vec<PlayerDto>,
    pub areas: Vec<AreaDto>,
}

impl From<&TownSnapshot> for TownSnapshotDto {
    fn from(snapshot: &TownSnapshot) -> Self {
        Self {
            players: snapshot.players.iter().map(PlayerDto::from).collect(),
            areas: snapshot.areas.iter().map(AreaDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDto {
    pub code: String,
    pub message: String,
}

impl From<&GameError> for ErrorDto {
    fn from(error: &GameError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommandResultDto {
    pub command_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDto>,
}

impl CommandResultDto {
    pub fn from_result(command_id: u64, result: &Result<CommandResponse, GameError>) -> Self {
        match result {
            Ok(CommandResponse::Joined { game_id }) => Self {
                command_id,
                game_id: Some(game_id.to_string()),
                error: None,
            },
            Ok(_) => Self {
                command_id,
                game_id: None,
                error: None,
            },
            Err(error) => Self {
                command_id,
                game_id: None,
                error: Some(error.into()),
            },
        }
    }
}

impl From<&TownUpdate> for ServerMessage {
    fn from(update: &TownUpdate) -> Self {
        match update {
            TownUpdate::AreaChanged(model) => ServerMessage::AreaChanged(model.into()),
            TownUpdate::PlayerJoined(player) => ServerMessage::PlayerJoined(player.into()),
            TownUpdate::PlayerLeft { player_id } => ServerMessage::PlayerLeft {
                player_id: player_id.to_string(),
            },
            TownUpdate::PlayerChanged(player) => ServerMessage::PlayerChanged(player.into()),
        }
    }
}
