// Client-side mirror of the town WebSocket protocol.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    Identity { player_id: String },
    Snapshot(TownSnapshotDto),
    AreaChanged(AreaDto),
    PlayerJoined(PlayerDto),
    PlayerLeft { player_id: String },
    PlayerChanged(PlayerDto),
    CommandResult(CommandResultDto),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    Join { display_name: String },
    EnterArea { area_id: String },
    ExitArea { area_id: String },
    Command(CommandPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandPayload {
    pub command_id: u64,
    pub area_id: String,
    pub command: AreaCommandDto,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveDto {
    pub word: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
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
        vehicle_type: Option<VehicleTypeDto>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleTypeDto {
    Bike,
    Skateboard,
    Horse,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VehicleDto {
    pub vehicle_type: VehicleTypeDto,
    pub speed_multiplier: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerDto {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub vehicle: Option<VehicleDto>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatusDto {
    #[default]
    WaitingToStart,
    InProgress,
    Over,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VehicleTrickStateDto {
    pub status: GameStatusDto,
    #[serde(default)]
    pub player: Option<String>,
    pub target_word: String,
    pub current_score: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameDto {
    pub id: String,
    pub players: Vec<String>,
    pub state: VehicleTrickStateDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameResultDto {
    pub game_id: String,
    pub scores: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScoreEntryDto {
    pub initials: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VehicleTrickAreaDto {
    pub id: String,
    pub occupants: Vec<String>,
    #[serde(default)]
    pub game: Option<GameDto>,
    #[serde(default)]
    pub history: Vec<GameResultDto>,
    #[serde(default)]
    pub persistent_history: Vec<ScoreEntryDto>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VehicleRackAreaDto {
    pub id: String,
    pub occupants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum AreaDto {
    VehicleTrickArea(VehicleTrickAreaDto),
    VehicleRackArea(VehicleRackAreaDto),
}

impl AreaDto {
    pub fn id(&self) -> &str {
        match self {
            AreaDto::VehicleTrickArea(area) => &area.id,
            AreaDto::VehicleRackArea(area) => &area.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TownSnapshotDto {
    pub players: Vec<PlayerDto>,
    pub areas: Vec<AreaDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorDto {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandResultDto {
    pub command_id: u64,
    #[serde(default)]
    pub game_id: Option<String>,
    #[serde(default)]
    pub error: Option<ErrorDto>,
}
