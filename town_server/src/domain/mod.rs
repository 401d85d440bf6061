// Domain layer: game rules, area bookkeeping, and the ports they depend on.

pub mod area;
pub mod errors;
pub mod game;
pub mod player;
pub mod ports;
pub mod scores;
pub mod vehicle_trick;
pub mod word_generator;

#[cfg(test)]
pub(crate) mod test_support;

pub use area::{GameArea, GameResult};
pub use errors::GameError;
pub use game::{Game, GameFactory, GameInstanceId, GameMove, GameStatus, GameStatusView};
pub use player::{Player, PlayerId, Vehicle, VehicleType};
pub use ports::{Clock, RandomSource, ScoreBoard};
pub use scores::ScoreEntry;
pub use vehicle_trick::{TrickMove, VehicleTrickGame, VehicleTrickGameFactory, VehicleTrickState};
pub use word_generator::WordGenerator;
