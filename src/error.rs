//! Engine error types.
//!
//! Everything fallible in the engine returns [`EngineError`]. Rejections are
//! side-effect free: an operation that fails validation leaves the game
//! exactly as it found it.

use crate::core::PlayerId;
use crate::phase::GameState;

/// Errors produced by engine operations and role hooks.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The operation is not legal in the game's current lifecycle state.
    #[error("operation requires state {required:?}, but the game is {actual}")]
    InvalidState {
        /// States in which the operation would have been legal.
        required: &'static [GameState],
        /// The state the game is actually in.
        actual: GameState,
    },

    /// The role list rejected the lobby's player count at start.
    #[error("cannot start a game with {count} players")]
    InvalidPlayerCount {
        /// Number of players in the lobby.
        count: usize,
    },

    /// A write-once player field was assigned a second time.
    #[error("{field} of {player} is already assigned")]
    MultipleAssignment {
        /// The player whose field was re-assigned.
        player: PlayerId,
        /// Which field: `"name"` or `"role"`.
        field: &'static str,
    },

    /// A bounded target selection is already full.
    #[error("selection already holds its maximum of {limit} targets")]
    CapacityExceeded {
        /// The selection's capacity.
        limit: usize,
    },

    /// A kill was requested for a player who is already dead.
    #[error("{player} is already dead")]
    DoubleKill {
        /// The target of the redundant kill.
        player: PlayerId,
    },

    /// The referenced player is not part of this game.
    #[error("{player} is not in this game")]
    UnknownPlayer {
        /// The unknown id.
        player: PlayerId,
    },

    /// A priority change was requested for a player with no role bound.
    #[error("{player} has no role assigned")]
    RoleNotAssigned {
        /// The roleless player.
        player: PlayerId,
    },

    /// The role list ran out of kits before every player had a role.
    #[error("role list exhausted before every player had a role")]
    RolesExhausted,

    /// The name list ran out before every player had a name.
    #[error("name list exhausted before every player had a name")]
    NamesExhausted,

    /// A host event sink failed to accept a delivery.
    #[error("event delivery to {player} failed")]
    Delivery {
        /// The recipient whose sink failed.
        player: PlayerId,
        /// The sink's own error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
