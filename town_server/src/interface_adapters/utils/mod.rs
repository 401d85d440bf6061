pub mod ids;
pub mod system;

pub use ids::rand_id;
pub use system::{SystemClock, ThreadRandom};
