//! Player identity and per-game mutable state.
//!
//! A `Player` belongs to exactly one game for its lifetime. Its `name` and
//! `role` are write-once: the engine assigns them during `start_game`, and any
//! second assignment attempt fails with `MultipleAssignment` instead of
//! silently overwriting. Death is likewise recorded at most once, by the
//! engine's kill path; role code never flips an alive flag directly.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::objective::{Objective, ObjectiveStatus};
use crate::phase::Moment;
use crate::roles::{RoleBehavior, RoleKit, RoleSlot};

/// Player identifier, unique within one game.
///
/// Ids are allocated in join order, so comparing raw ids reproduces the
/// lobby's insertion order, which is the stable tie-break for priority
/// sorting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl PlayerId {
    /// Create a player ID from a raw index.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player {}", self.0)
    }
}

/// Immutable record of a player's death.
///
/// Created once per player by the engine; the moment is the phase/cycle in
/// which the kill was applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Death {
    moment: Moment,
    cause: String,
}

impl Death {
    /// Create a death record.
    #[must_use]
    pub fn new(moment: Moment, cause: impl Into<String>) -> Self {
        Self {
            moment,
            cause: cause.into(),
        }
    }

    /// When the player died.
    #[must_use]
    pub fn moment(&self) -> Moment {
        self.moment
    }

    /// Why the player died, as reported by whoever requested the kill.
    #[must_use]
    pub fn cause(&self) -> &str {
        &self.cause
    }
}

/// A player in one game: identity plus mutable per-game state.
pub struct Player {
    id: PlayerId,
    name: Option<String>,
    connected: bool,
    death: Option<Death>,
    role: Option<RoleSlot>,
    objective: Option<Box<dyn Objective>>,
}

impl Player {
    pub(crate) fn new(id: PlayerId) -> Self {
        Self {
            id,
            name: None,
            connected: true,
            death: None,
            role: None,
            objective: None,
        }
    }

    /// This player's id.
    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Display name, once assigned at game start.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the host currently considers this player connected.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.connected
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Death record, if the player has died.
    #[must_use]
    pub fn death(&self) -> Option<&Death> {
        self.death.as_ref()
    }

    /// True until a death is recorded.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.death.is_none()
    }

    /// The assigned role, once bound.
    #[must_use]
    pub fn role(&self) -> Option<&RoleSlot> {
        self.role.as_ref()
    }

    /// Current role priority, once a role is bound.
    #[must_use]
    pub fn priority(&self) -> Option<i32> {
        self.role.as_ref().map(RoleSlot::priority)
    }

    /// Current objective status, once an objective is bound.
    #[must_use]
    pub fn objective_status(&self) -> Option<ObjectiveStatus> {
        self.objective.as_ref().map(|objective| objective.status())
    }

    /// Assign the display name. Write-once.
    pub(crate) fn assign_name(&mut self, name: String) -> Result<(), EngineError> {
        if self.name.is_some() {
            return Err(EngineError::MultipleAssignment {
                player: self.id,
                field: "name",
            });
        }
        self.name = Some(name);
        Ok(())
    }

    /// Bind a role and its objective from a kit. Write-once.
    pub(crate) fn assign_role(&mut self, kit: RoleKit) -> Result<(), EngineError> {
        if self.role.is_some() {
            return Err(EngineError::MultipleAssignment {
                player: self.id,
                field: "role",
            });
        }
        let (slot, objective) = kit.into_parts();
        self.role = Some(slot);
        self.objective = Some(objective);
        Ok(())
    }

    pub(crate) fn set_priority(&mut self, priority: i32) -> Result<(), EngineError> {
        match self.role.as_mut() {
            Some(slot) => {
                slot.set_priority(priority);
                Ok(())
            }
            None => Err(EngineError::RoleNotAssigned { player: self.id }),
        }
    }

    /// Record the death. The first record wins; a second attempt is a
    /// `DoubleKill` and leaves the original untouched.
    pub(crate) fn record_death(&mut self, death: Death) -> Result<(), EngineError> {
        if self.death.is_some() {
            return Err(EngineError::DoubleKill { player: self.id });
        }
        self.death = Some(death);
        Ok(())
    }

    /// Take the role behavior out for a hook invocation.
    ///
    /// Returns `None` when no role is bound or the behavior is already
    /// checked out further up the call stack.
    pub(crate) fn checkout_behavior(&mut self) -> Option<Box<dyn RoleBehavior>> {
        self.role.as_mut().and_then(RoleSlot::take_behavior)
    }

    /// Put a checked-out role behavior back.
    pub(crate) fn restore_behavior(&mut self, behavior: Box<dyn RoleBehavior>) {
        if let Some(slot) = self.role.as_mut() {
            slot.put_behavior(behavior);
        }
    }

    /// Public snapshot of this player.
    #[must_use]
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            connected: self.connected,
            death: self.death.clone(),
        }
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("connected", &self.connected)
            .field("alive", &self.is_alive())
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Public per-player view: what any observer may know about a player.
///
/// Role and objective are deliberately absent. Wire encoding is the host's
/// concern; this is just serializable data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// The player's id.
    pub id: PlayerId,
    /// Display name, if assigned yet.
    pub name: Option<String>,
    /// Host-reported connectivity.
    pub connected: bool,
    /// Death record, if the player has died.
    pub death: Option<Death>,
}
