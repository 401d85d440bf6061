// Vehicle rack area: where players pick up or return a vehicle.

use tokio::sync::broadcast;

use crate::domain::{GameError, Player, PlayerId};
use crate::use_cases::types::{
    AreaCommand, AreaModel, CommandResponse, TownUpdate, VehicleRackAreaModel,
};

pub struct VehicleRackArea {
    id: String,
    occupants: Vec<PlayerId>,
    updates_tx: broadcast::Sender<TownUpdate>,
}

impl VehicleRackArea {
    pub fn new(id: impl Into<String>, updates_tx: broadcast::Sender<TownUpdate>) -> Self {
        Self {
            id: id.into(),
            occupants: Vec::new(),
            updates_tx,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Only `EquipVehicle` is understood here; the caller applies the returned player.
    pub fn handle_command(
        &mut self,
        command: AreaCommand,
        player: &Player,
    ) -> Result<CommandResponse, GameError> {
        match command {
            AreaCommand::EquipVehicle { vehicle_type } => {
                if !self.occupants.contains(&player.id) {
                    return Err(GameError::PlayerNotInArea);
                }
                Ok(CommandResponse::VehicleChanged(player.with_vehicle(vehicle_type)))
            }
            other => Err(GameError::InvalidCommand(other.kind().to_string())),
        }
    }

    pub fn add_occupant(&mut self, player_id: PlayerId) {
        if self.occupants.contains(&player_id) {
            return;
        }
        self.occupants.push(player_id);
        self.emit_changed();
    }

    pub fn remove_occupant(&mut self, player_id: PlayerId) {
        let before = self.occupants.len();
        self.occupants.retain(|id| *id != player_id);
        if self.occupants.len() != before {
            self.emit_changed();
        }
    }

    pub fn to_model(&self) -> AreaModel {
        AreaModel::VehicleRack(VehicleRackAreaModel {
            id: self.id.clone(),
            occupants: self.occupants.clone(),
        })
    }

    fn emit_changed(&self) {
        let _ = self.updates_tx.send(TownUpdate::AreaChanged(self.to_model()));
    }
}
