use std::sync::Arc;

use tokio::sync::broadcast;

use crate::controllers::base::emit;
use crate::controllers::{
    AreaEvent, CommandAck, CommandSender, EVENT_CHANNEL_CAPACITY, resolve_players,
};
use crate::errors::ClientError;
use crate::protocol::{AreaCommandDto, PlayerDto, VehicleRackAreaDto, VehicleTypeDto};

/// Client view of a vehicle rack: who stands in it, plus the equip command.
pub struct VehicleRackAreaController {
    id: String,
    sender: Arc<dyn CommandSender>,
    model: Option<VehicleRackAreaDto>,
    occupants: Vec<PlayerDto>,
    events: broadcast::Sender<AreaEvent>,
}

impl VehicleRackAreaController {
    pub fn new(id: impl Into<String>, sender: Arc<dyn CommandSender>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            id: id.into(),
            sender,
            model: None,
            occupants: Vec::new(),
            events,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn occupants(&self) -> &[PlayerDto] {
        &self.occupants
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AreaEvent> {
        self.events.subscribe()
    }

    pub fn update_from(&mut self, model: &VehicleRackAreaDto, current_players: &[PlayerDto]) {
        self.model = Some(model.clone());
        let occupants = resolve_players(&model.occupants, current_players);
        if occupants != self.occupants {
            self.occupants = occupants.clone();
            emit(&self.events, AreaEvent::OccupantsChanged(occupants));
        }
    }

    pub fn refresh_players(&mut self, current_players: &[PlayerDto]) {
        if let Some(model) = self.model.clone() {
            self.update_from(&model, current_players);
        }
    }

    /// `None` unequips the current vehicle.
    pub async fn equip_vehicle(
        &self,
        vehicle_type: Option<VehicleTypeDto>,
    ) -> Result<CommandAck, ClientError> {
        self.sender
            .send_command(&self.id, AreaCommandDto::EquipVehicle { vehicle_type })
            .await
    }
}
