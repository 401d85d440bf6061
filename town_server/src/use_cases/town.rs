// Town orchestration: a single task owns every area and player record.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use crate::domain::{
    Clock, GameError, Player, PlayerId, RandomSource, ScoreBoard, VehicleTrickGameFactory,
};
use crate::use_cases::areas::{AreaServices, InteractableArea, VehicleRackArea, VehicleTrickArea};
use crate::use_cases::types::{
    AreaCommand, CommandResponse, CommandResult, TownEvent, TownSnapshot, TownUpdate,
};

/// Static configuration for spawning a town.
#[derive(Debug, Clone)]
pub struct TownSettings {
    /// Capacity for inbound town events.
    pub input_channel_capacity: usize,
    /// Capacity for broadcast town updates.
    pub update_broadcast_capacity: usize,
    /// Word corpus loaded by every new trick game.
    pub word_list_path: PathBuf,
    pub trick_area_ids: Vec<String>,
    pub rack_area_ids: Vec<String>,
}

/// Runtime collaborators injected into the town.
#[derive(Clone)]
pub struct TownServices {
    pub clock: Arc<dyn Clock>,
    pub random: Arc<dyn RandomSource>,
    pub scores: Arc<dyn ScoreBoard>,
}

/// Channels used by adapters to talk to the town task.
#[derive(Clone)]
pub struct TownHandle {
    /// Sender for events into the town task.
    pub input_tx: mpsc::Sender<TownEvent>,
    /// Broadcast sender for town updates.
    pub updates_tx: broadcast::Sender<TownUpdate>,
}

pub struct Town {
    players: HashMap<PlayerId, Player>,
    areas: BTreeMap<String, InteractableArea>,
    updates_tx: broadcast::Sender<TownUpdate>,
}

impl Town {
    pub fn new(updates_tx: broadcast::Sender<TownUpdate>) -> Self {
        Self {
            players: HashMap::new(),
            areas: BTreeMap::new(),
            updates_tx,
        }
    }

    pub fn add_area(&mut self, area: InteractableArea) {
        self.areas.insert(area.id().to_string(), area);
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.get(&player_id)
    }

    pub fn snapshot(&self) -> TownSnapshot {
        let mut players: Vec<Player> = self.players.values().cloned().collect();
        players.sort_by_key(|p| p.id);
        TownSnapshot {
            players,
            areas: self.areas.values().map(InteractableArea::to_model).collect(),
        }
    }

    pub fn handle_event(&mut self, event: TownEvent) {
        match event {
            TownEvent::Join { player, reply } => {
                info!(player_id = player.id, display_name = %player.display_name, "player joined town");
                self.players.insert(player.id, player.clone());
                self.publish(TownUpdate::PlayerJoined(player));
                let _ = reply.send(self.snapshot());
            }
            TownEvent::Leave { player_id } => self.remove_player(player_id),
            TownEvent::EnterArea { player_id, area_id } => self.enter_area(player_id, &area_id),
            TownEvent::ExitArea { player_id, area_id } => self.exit_area(player_id, &area_id),
            TownEvent::Command {
                player_id,
                area_id,
                command,
                reply,
            } => {
                let result = self.handle_command(player_id, &area_id, command);
                let _ = reply.send(result);
            }
            TownEvent::PersistentHistory {
                area_id,
                seq,
                entries,
            } => {
                match self.areas.get_mut(&area_id) {
                    Some(area) => area.apply_persistent_history(seq, entries),
                    None => warn!(%area_id, "leaderboard for unknown area"),
                }
            }
            TownEvent::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    pub fn handle_command(
        &mut self,
        player_id: PlayerId,
        area_id: &str,
        command: AreaCommand,
    ) -> CommandResult {
        let player = self
            .players
            .get(&player_id)
            .cloned()
            .ok_or(GameError::PlayerNotFound)?;
        let area = self.areas.get_mut(area_id).ok_or(GameError::AreaNotFound)?;
        let kind = command.kind();

        let response = area.handle_command(command, &player).inspect_err(|error| {
            info!(player_id, %area_id, command = kind, %error, "command rejected");
        })?;

        if let CommandResponse::VehicleChanged(updated) = &response {
            self.players.insert(updated.id, updated.clone());
            self.publish(TownUpdate::PlayerChanged(updated.clone()));
        }
        Ok(response)
    }

    fn enter_area(&mut self, player_id: PlayerId, area_id: &str) {
        let Some(player) = self.players.get(&player_id).cloned() else {
            warn!(player_id, "enter area for unknown player");
            return;
        };
        if !self.areas.contains_key(area_id) {
            warn!(player_id, %area_id, "enter for unknown area");
            return;
        }

        // A player stands in one zone at a time.
        for (id, area) in self.areas.iter_mut() {
            if id != area_id {
                area.remove_occupant(&player);
            }
        }
        if let Some(area) = self.areas.get_mut(area_id) {
            area.add_occupant(&player);
        }
    }

    fn exit_area(&mut self, player_id: PlayerId, area_id: &str) {
        let Some(player) = self.players.get(&player_id).cloned() else {
            return;
        };
        if let Some(area) = self.areas.get_mut(area_id) {
            area.remove_occupant(&player);
        }
    }

    fn remove_player(&mut self, player_id: PlayerId) {
        let Some(player) = self.players.remove(&player_id) else {
            return;
        };
        for area in self.areas.values_mut() {
            area.remove_occupant(&player);
        }
        info!(player_id, "player left town");
        self.publish(TownUpdate::PlayerLeft { player_id });
    }

    fn publish(&self, update: TownUpdate) {
        let _ = self.updates_tx.send(update);
    }
}

/// Consumes town events one at a time until every sender is gone.
pub async fn town_task(mut input_rx: mpsc::Receiver<TownEvent>, mut town: Town) {
    while let Some(event) = input_rx.recv().await {
        town.handle_event(event);
    }
    info!("town input closed; town task exiting");
}

/// Builds the configured areas and spawns the town task.
pub fn spawn_town(settings: &TownSettings, services: TownServices) -> TownHandle {
    let (input_tx, input_rx) = mpsc::channel::<TownEvent>(settings.input_channel_capacity);
    let (updates_tx, _updates_rx) =
        broadcast::channel::<TownUpdate>(settings.update_broadcast_capacity);

    let mut town = Town::new(updates_tx.clone());
    let area_services = AreaServices {
        clock: services.clock.clone(),
        scores: services.scores.clone(),
        updates_tx: updates_tx.clone(),
        events_tx: input_tx.clone(),
    };

    for area_id in &settings.trick_area_ids {
        let factory =
            VehicleTrickGameFactory::new(settings.word_list_path.clone(), services.random.clone());
        town.add_area(InteractableArea::VehicleTrick(VehicleTrickArea::new(
            area_id.clone(),
            factory,
            area_services.clone(),
        )));
    }
    for area_id in &settings.rack_area_ids {
        town.add_area(InteractableArea::VehicleRack(VehicleRackArea::new(
            area_id.clone(),
            updates_tx.clone(),
        )));
    }

    tokio::spawn(town_task(input_rx, town));

    TownHandle {
        input_tx,
        updates_tx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{ManualClock, ScriptedRandom, write_word_list};
    use crate::domain::{GameStatus, VehicleType};
    use crate::use_cases::test_support::RecordingScoreBoard;
    use crate::use_cases::types::AreaModel;
    use tokio::sync::oneshot;

    fn settings() -> TownSettings {
        TownSettings {
            input_channel_capacity: 64,
            update_broadcast_capacity: 64,
            word_list_path: write_word_list(&["ollie", "kickflip"]),
            trick_area_ids: vec!["trick".into()],
            rack_area_ids: vec!["rack".into()],
        }
    }

    fn services() -> TownServices {
        TownServices {
            clock: Arc::new(ManualClock::new(1_700_000_000_000)),
            random: Arc::new(ScriptedRandom::new(vec![0, 1])),
            scores: Arc::new(RecordingScoreBoard::new()),
        }
    }

    async fn join(handle: &TownHandle, id: PlayerId, name: &str) -> TownSnapshot {
        let (reply, rx) = oneshot::channel();
        handle
            .input_tx
            .send(TownEvent::Join {
                player: Player::new(id, name),
                reply,
            })
            .await
            .unwrap();
        rx.await.unwrap()
    }

    async fn command(
        handle: &TownHandle,
        player_id: PlayerId,
        area_id: &str,
        command: AreaCommand,
    ) -> CommandResult {
        let (reply, rx) = oneshot::channel();
        handle
            .input_tx
            .send(TownEvent::Command {
                player_id,
                area_id: area_id.into(),
                command,
                reply,
            })
            .await
            .unwrap();
        rx.await.unwrap()
    }

    async fn snapshot(handle: &TownHandle) -> TownSnapshot {
        let (reply, rx) = oneshot::channel();
        handle.input_tx.send(TownEvent::Snapshot { reply }).await.unwrap();
        rx.await.unwrap()
    }

    #[tokio::test]
    async fn join_returns_a_snapshot_with_configured_areas() {
        let handle = spawn_town(&settings(), services());

        let snap = join(&handle, 7, "Ada").await;

        assert_eq!(snap.players.len(), 1);
        let ids: Vec<&str> = snap.areas.iter().map(AreaModel::id).collect();
        assert_eq!(ids, vec!["rack", "trick"]);
    }

    #[tokio::test]
    async fn when_area_or_player_is_unknown_then_command_fails() {
        let handle = spawn_town(&settings(), services());
        join(&handle, 7, "Ada").await;

        assert_eq!(
            command(&handle, 7, "nowhere", AreaCommand::JoinGame).await,
            Err(GameError::AreaNotFound)
        );
        assert_eq!(
            command(&handle, 99, "trick", AreaCommand::JoinGame).await,
            Err(GameError::PlayerNotFound)
        );
    }

    #[tokio::test]
    async fn equipping_at_the_rack_updates_the_player_and_broadcasts() {
        let handle = spawn_town(&settings(), services());
        let mut updates = handle.updates_tx.subscribe();
        join(&handle, 7, "Ada").await;
        handle
            .input_tx
            .send(TownEvent::EnterArea {
                player_id: 7,
                area_id: "rack".into(),
            })
            .await
            .unwrap();

        let result = command(
            &handle,
            7,
            "rack",
            AreaCommand::EquipVehicle {
                vehicle_type: Some(VehicleType::Bike),
            },
        )
        .await;
        assert!(matches!(result, Ok(CommandResponse::VehicleChanged(_))));

        let mut saw_change = false;
        while let Ok(update) = updates.try_recv() {
            if let TownUpdate::PlayerChanged(player) = update {
                saw_change = player.vehicle.is_some();
            }
        }
        assert!(saw_change);
        let snap = snapshot(&handle).await;
        assert!(snap.players[0].vehicle.is_some());
    }

    #[tokio::test]
    async fn leaving_town_concludes_a_running_game() {
        let handle = spawn_town(&settings(), services());
        join(&handle, 7, "Ada").await;
        handle
            .input_tx
            .send(TownEvent::EnterArea {
                player_id: 7,
                area_id: "trick".into(),
            })
            .await
            .unwrap();
        command(&handle, 7, "trick", AreaCommand::JoinGame)
            .await
            .unwrap();

        handle
            .input_tx
            .send(TownEvent::Leave { player_id: 7 })
            .await
            .unwrap();

        let snap = snapshot(&handle).await;
        assert!(snap.players.is_empty());
        let trick = snap
            .areas
            .iter()
            .find_map(|area| match area {
                AreaModel::VehicleTrick(model) => Some(model),
                _ => None,
            })
            .unwrap();
        assert!(trick.occupants.is_empty());
        assert_eq!(trick.game.as_ref().unwrap().state.status, GameStatus::Over);
        assert_eq!(trick.history.len(), 1);
    }

    #[tokio::test]
    async fn entering_an_area_leaves_the_previous_one() {
        let handle = spawn_town(&settings(), services());
        join(&handle, 7, "Ada").await;
        for area_id in ["rack", "trick"] {
            handle
                .input_tx
                .send(TownEvent::EnterArea {
                    player_id: 7,
                    area_id: area_id.into(),
                })
                .await
                .unwrap();
        }

        let snap = snapshot(&handle).await;
        for area in &snap.areas {
            match area {
                AreaModel::VehicleRack(model) => assert!(model.occupants.is_empty()),
                AreaModel::VehicleTrick(model) => assert_eq!(model.occupants, vec![7]),
            }
        }
    }
}
