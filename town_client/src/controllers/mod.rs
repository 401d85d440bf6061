// Per-area controllers mirroring server area models on the client.

pub mod base;
pub mod vehicle_rack;
pub mod vehicle_trick;

use async_trait::async_trait;

use crate::errors::ClientError;
use crate::protocol::{
    AreaCommandDto, AreaDto, GameResultDto, GameStatusDto, PlayerDto, ScoreEntryDto,
};

pub use base::GameAreaCache;
pub use vehicle_rack::VehicleRackAreaController;
pub use vehicle_trick::VehicleTrickAreaController;

/// Capacity of each controller's event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Successful command acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandAck {
    pub game_id: Option<String>,
}

/// Port used by controllers to send area commands to the town.
#[async_trait]
pub trait CommandSender: Send + Sync {
    async fn send_command(
        &self,
        area_id: &str,
        command: AreaCommandDto,
    ) -> Result<CommandAck, ClientError>;
}

/// Change notifications derived from successive area models.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaEvent {
    OccupantsChanged(Vec<PlayerDto>),
    GameInstanceChanged(Option<String>),
    StatusChanged(GameStatusDto),
    PlayersChanged(Vec<PlayerDto>),
    HistoryChanged(Vec<GameResultDto>),
    PersistentHistoryChanged(Vec<ScoreEntryDto>),
    ScoreChanged(u32),
    TargetWordChanged(String),
    // Score went up; carries the new score.
    TrickPerformed(u32),
}

/// Controller for any area type the town reports.
pub enum AreaController {
    VehicleTrick(VehicleTrickAreaController),
    VehicleRack(VehicleRackAreaController),
}

impl AreaController {
    pub fn id(&self) -> &str {
        match self {
            AreaController::VehicleTrick(controller) => controller.id(),
            AreaController::VehicleRack(controller) => controller.id(),
        }
    }

    /// Applies a broadcast model. Models of another area type are ignored.
    pub fn update_from(&mut self, model: &AreaDto, current_players: &[PlayerDto]) {
        match (self, model) {
            (AreaController::VehicleTrick(controller), AreaDto::VehicleTrickArea(model)) => {
                controller.update_from(model, current_players)
            }
            (AreaController::VehicleRack(controller), AreaDto::VehicleRackArea(model)) => {
                controller.update_from(model, current_players)
            }
            (controller, model) => tracing::warn!(
                area_id = %controller.id(),
                model_id = %model.id(),
                "area model type does not match controller"
            ),
        }
    }

    /// Re-resolves player references after the town roster changed.
    pub fn refresh_players(&mut self, current_players: &[PlayerDto]) {
        match self {
            AreaController::VehicleTrick(controller) => controller.refresh_players(current_players),
            AreaController::VehicleRack(controller) => controller.refresh_players(current_players),
        }
    }
}

// Ids that resolve to known players, in the given order.
pub(crate) fn resolve_players(ids: &[String], current_players: &[PlayerDto]) -> Vec<PlayerDto> {
    ids.iter()
        .filter_map(|id| current_players.iter().find(|p| &p.id == id).cloned())
        .collect()
}
