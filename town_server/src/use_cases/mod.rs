// Use cases layer: area command handling and the town event loop.

pub mod areas;
pub mod town;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use areas::{AreaServices, InteractableArea, VehicleRackArea, VehicleTrickArea};
pub use town::{Town, TownHandle, TownServices, TownSettings, spawn_town, town_task};
pub use types::{
    AreaCommand, AreaModel, CommandResponse, GameModel, TownEvent, TownSnapshot, TownUpdate,
    VehicleRackAreaModel, VehicleTrickAreaModel,
};
