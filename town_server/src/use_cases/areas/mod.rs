// Interactable areas, one variant per area type placed on the map.

pub mod vehicle_rack;
pub mod vehicle_trick;

pub use vehicle_rack::VehicleRackArea;
pub use vehicle_trick::{AreaServices, VehicleTrickArea};

use crate::domain::{GameError, Player, ScoreEntry};
use crate::use_cases::types::{AreaCommand, AreaModel, CommandResponse};

pub enum InteractableArea {
    VehicleTrick(VehicleTrickArea),
    VehicleRack(VehicleRackArea),
}

impl InteractableArea {
    pub fn id(&self) -> &str {
        match self {
            InteractableArea::VehicleTrick(area) => area.id(),
            InteractableArea::VehicleRack(area) => area.id(),
        }
    }

    pub fn handle_command(
        &mut self,
        command: AreaCommand,
        player: &Player,
    ) -> Result<CommandResponse, GameError> {
        match self {
            InteractableArea::VehicleTrick(area) => area.handle_command(command, player),
            InteractableArea::VehicleRack(area) => area.handle_command(command, player),
        }
    }

    pub fn add_occupant(&mut self, player: &Player) {
        match self {
            InteractableArea::VehicleTrick(area) => area.add_occupant(player.id),
            InteractableArea::VehicleRack(area) => area.add_occupant(player.id),
        }
    }

    pub fn remove_occupant(&mut self, player: &Player) {
        match self {
            InteractableArea::VehicleTrick(area) => area.remove_occupant(player),
            InteractableArea::VehicleRack(area) => area.remove_occupant(player.id),
        }
    }

    /// Applies a leaderboard result. Areas without a leaderboard ignore it.
    pub fn apply_persistent_history(&mut self, seq: u64, entries: Vec<ScoreEntry>) {
        if let InteractableArea::VehicleTrick(area) = self {
            area.apply_persistent_history(seq, entries);
        }
    }

    pub fn to_model(&self) -> AreaModel {
        match self {
            InteractableArea::VehicleTrick(area) => area.to_model(),
            InteractableArea::VehicleRack(area) => area.to_model(),
        }
    }
}
