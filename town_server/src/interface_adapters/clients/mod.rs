// Reqwest clients for services the town talks to.

pub mod scores;

pub use scores::{ScoresClient, ScoresClientError};
