// Client library for the town: wire protocol, area controllers, and the socket connection.

pub mod controllers;
pub mod errors;
pub mod leaderboard;
pub mod net;
pub mod protocol;
pub mod town;

#[cfg(test)]
pub(crate) mod test_support;

pub use controllers::{
    AreaController, AreaEvent, CommandAck, CommandSender, VehicleRackAreaController,
    VehicleTrickAreaController,
};
pub use errors::ClientError;
pub use net::TownConnection;
pub use town::TownController;
