//! Core engine types: player identity, deaths, RNG.
//!
//! Role content and objectives are external collaborators; this module holds
//! the data the engine itself owns per player.

pub mod player;
pub mod rng;

pub use player::{Death, Player, PlayerId, PlayerView};
pub use rng::GameRng;
