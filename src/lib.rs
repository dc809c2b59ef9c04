//! # Salem Engine
//!
//! A content-agnostic engine for turn-based social-deduction games in the
//! werewolf/mafia family. The crate owns the mechanics every such game
//! shares: a lobby, a repeating dawn/day/dusk/night cycle, priority-ordered
//! role hooks, a per-game event bus, and objective-driven victory
//! evaluation. The concrete roles, objectives, and name pools are supplied
//! by the host behind traits.
//!
//! ## Design Principles
//!
//! - **Content behind traits**: the engine never names a concrete role.
//!   Roles implement [`RoleBehavior`], win conditions implement
//!   [`Objective`], and a [`RoleList`]/[`NameList`] pair supplies them at
//!   game start.
//! - **One authoritative timeline**: each [`Game`] is a self-contained value
//!   with its own roster, phase clock, event bus, and seeded RNG. Instances
//!   never share state.
//! - **Deterministic given a seed**: the only randomness is the assignment
//!   shuffle at game start, drawn from an injectable [`GameRng`].
//! - **Synchronous dispatch**: role hooks and event deliveries run to
//!   completion inside the engine call that triggered them. There are no
//!   queues that outlive a call.
//! - **Explicit failure**: every fallible operation returns
//!   [`EngineError`]; rejected operations leave the game untouched.
//!
//! ## Quick example
//!
//! ```
//! use salem_engine::{
//!     Game, GameRng, GameState, NameList, Objective, ObjectiveStatus,
//!     RoleBehavior, RoleKit, RoleList,
//! };
//!
//! struct Villager;
//! impl RoleBehavior for Villager {
//!     fn name(&self) -> &str {
//!         "villager"
//!     }
//! }
//!
//! struct AlwaysWins;
//! impl Objective for AlwaysWins {
//!     fn status(&self) -> ObjectiveStatus {
//!         ObjectiveStatus::Win
//!     }
//! }
//!
//! struct Village;
//! impl RoleList for Village {
//!     fn validate_player_count(&self, count: usize) -> bool {
//!         count >= 3
//!     }
//!     fn next_role(&mut self) -> Option<RoleKit> {
//!         Some(RoleKit::new(0, Box::new(Villager), Box::new(AlwaysWins)))
//!     }
//! }
//!
//! struct Numbered(u32);
//! impl NameList for Numbered {
//!     fn next_name(&mut self) -> Option<String> {
//!         self.0 += 1;
//!         Some(format!("Townsfolk {}", self.0))
//!     }
//! }
//!
//! let mut game = Game::with_rng(Box::new(Village), Box::new(Numbered(0)), GameRng::new(42));
//! for _ in 0..3 {
//!     game.player_join().unwrap();
//! }
//! game.start_game().unwrap();
//! game.advance_phase().unwrap();
//! // Every objective settles immediately, so one phase pass ends the game.
//! assert_eq!(game.state(), GameState::Ended);
//! ```

pub mod core;
pub mod error;
pub mod events;
pub mod game;
pub mod objective;
pub mod phase;
pub mod roles;
pub mod roster;

pub use crate::core::{Death, GameRng, Player, PlayerId, PlayerView};
pub use error::EngineError;
pub use events::{Event, EventBus, EventKind, EventSink};
pub use game::{Game, GameId, LobbySummary, PhaseCx};
pub use objective::{GameResults, Objective, ObjectiveStatus, Outcome, Verdict};
pub use phase::{GameState, Moment, Phase, PhaseMachine};
pub use roles::targeting::{BoundedSelection, MultiTarget, SingleTarget};
pub use roles::{NameList, RoleBehavior, RoleKit, RoleList, RoleSlot};
pub use roster::Roster;
