// Routes town broadcasts to per-area controllers and keeps the player roster.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::controllers::{
    AreaController, CommandSender, VehicleRackAreaController, VehicleTrickAreaController,
};
use crate::protocol::{AreaDto, PlayerDto, ServerMessage};

pub struct TownController {
    sender: Arc<dyn CommandSender>,
    local_player_id: Option<String>,
    players: Vec<PlayerDto>,
    areas: BTreeMap<String, AreaController>,
}

impl TownController {
    pub fn new(sender: Arc<dyn CommandSender>) -> Self {
        Self {
            sender,
            local_player_id: None,
            players: Vec::new(),
            areas: BTreeMap::new(),
        }
    }

    pub fn local_player_id(&self) -> Option<&str> {
        self.local_player_id.as_deref()
    }

    pub fn local_player(&self) -> Option<&PlayerDto> {
        let id = self.local_player_id.as_deref()?;
        self.players.iter().find(|p| p.id == id)
    }

    pub fn players(&self) -> &[PlayerDto] {
        &self.players
    }

    pub fn area(&self, area_id: &str) -> Option<&AreaController> {
        self.areas.get(area_id)
    }

    pub fn area_mut(&mut self, area_id: &str) -> Option<&mut AreaController> {
        self.areas.get_mut(area_id)
    }

    pub fn vehicle_trick_area(&self, area_id: &str) -> Option<&VehicleTrickAreaController> {
        match self.areas.get(area_id) {
            Some(AreaController::VehicleTrick(controller)) => Some(controller),
            _ => None,
        }
    }

    pub fn vehicle_rack_area(&self, area_id: &str) -> Option<&VehicleRackAreaController> {
        match self.areas.get(area_id) {
            Some(AreaController::VehicleRack(controller)) => Some(controller),
            _ => None,
        }
    }

    /// Applies one server message. Command results are correlated by the connection.
    pub fn apply(&mut self, msg: &ServerMessage) {
        match msg {
            ServerMessage::Identity { player_id } => {
                self.local_player_id = Some(player_id.clone());
            }
            ServerMessage::Snapshot(snapshot) => {
                self.players = snapshot.players.clone();
                for area in &snapshot.areas {
                    self.apply_area(area);
                }
            }
            ServerMessage::AreaChanged(area) => self.apply_area(area),
            ServerMessage::PlayerJoined(player) | ServerMessage::PlayerChanged(player) => {
                match self.players.iter_mut().find(|p| p.id == player.id) {
                    Some(existing) => *existing = player.clone(),
                    None => self.players.push(player.clone()),
                }
                self.refresh_areas();
            }
            ServerMessage::PlayerLeft { player_id } => {
                self.players.retain(|p| &p.id != player_id);
                self.refresh_areas();
            }
            ServerMessage::CommandResult(_) => {}
        }
    }

    fn apply_area(&mut self, model: &AreaDto) {
        if !self.areas.contains_key(model.id()) {
            let Some(local_player_id) = self.local_player_id.clone() else {
                warn!(area_id = %model.id(), "area update before identity; ignoring");
                return;
            };
            debug!(area_id = %model.id(), "tracking new area");
            let controller = match model {
                AreaDto::VehicleTrickArea(area) => {
                    AreaController::VehicleTrick(VehicleTrickAreaController::new(
                        area.id.clone(),
                        local_player_id,
                        self.sender.clone(),
                    ))
                }
                AreaDto::VehicleRackArea(area) => AreaController::VehicleRack(
                    VehicleRackAreaController::new(area.id.clone(), self.sender.clone()),
                ),
            };
            self.areas.insert(model.id().to_string(), controller);
        }

        if let Some(controller) = self.areas.get_mut(model.id()) {
            controller.update_from(model, &self.players);
        }
    }

    fn refresh_areas(&mut self) {
        for controller in self.areas.values_mut() {
            controller.refresh_players(&self.players);
        }
    }
}
