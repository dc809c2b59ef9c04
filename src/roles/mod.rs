//! Role behavior and the collaborator traits that supply role content.
//!
//! The engine is content-agnostic: it knows that every player has exactly one
//! role, that roles react to phase changes and events through hooks, and that
//! a role's integer `priority` orders it relative to other roles within a
//! phase (lower acts first, join order breaks ties). What the concrete roles
//! *do* is defined outside the crate, behind [`RoleBehavior`], and handed in
//! through a [`RoleList`].
//!
//! ## Hook model
//!
//! Hooks run synchronously, to completion, inside the engine call that
//! triggered them (`start_game`, `advance_phase`, `kill`). Each hook receives
//! the id of the player the role is bound to and a [`PhaseCx`] for observing
//! players, requesting kills, posting events, and adjusting priorities.
//! Target-selection state for roles that pick victims or allies lives in
//! [`targeting`].
//!
//! [`PhaseCx`]: crate::game::PhaseCx

pub mod targeting;

use crate::core::PlayerId;
use crate::error::EngineError;
use crate::events::Event;
use crate::game::PhaseCx;
use crate::objective::Objective;

/// Behavior bound to one player for the duration of a game.
///
/// All hooks default to no-ops; a role implements only the phases it cares
/// about. Hook errors abort the remainder of the phase pass and propagate to
/// the engine caller.
#[allow(unused_variables)]
pub trait RoleBehavior: Send {
    /// Role name, for logging and debugging.
    fn name(&self) -> &str;

    /// Triggered when dawn starts.
    fn on_dawn(&mut self, me: PlayerId, cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
        Ok(())
    }

    /// Triggered when day starts.
    fn on_day(&mut self, me: PlayerId, cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
        Ok(())
    }

    /// Triggered when dusk starts.
    fn on_dusk(&mut self, me: PlayerId, cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
        Ok(())
    }

    /// Triggered when night starts.
    fn on_night(&mut self, me: PlayerId, cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
        Ok(())
    }

    /// Triggered after the engine kills this role's player, before the death
    /// is recorded.
    fn on_death(&mut self, me: PlayerId, cx: &mut PhaseCx<'_>) -> Result<(), EngineError> {
        Ok(())
    }

    /// Triggered when an event addressed to this role's player is posted.
    fn on_event(
        &mut self,
        me: PlayerId,
        event: &Event,
        cx: &mut PhaseCx<'_>,
    ) -> Result<(), EngineError> {
        Ok(())
    }
}

/// A player's bound role: current priority plus the behavior itself.
///
/// The priority lives here rather than inside the behavior so it stays
/// readable and mutable while the behavior is checked out for a hook.
pub struct RoleSlot {
    priority: i32,
    behavior: Option<Box<dyn RoleBehavior>>,
}

impl RoleSlot {
    /// Current priority. Lower values act earlier within a phase.
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Role name; `None` while the behavior is checked out for a hook.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.behavior.as_deref().map(RoleBehavior::name)
    }

    pub(crate) fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub(crate) fn take_behavior(&mut self) -> Option<Box<dyn RoleBehavior>> {
        self.behavior.take()
    }

    pub(crate) fn put_behavior(&mut self, behavior: Box<dyn RoleBehavior>) {
        self.behavior = Some(behavior);
    }
}

impl std::fmt::Debug for RoleSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleSlot")
            .field("priority", &self.priority)
            .field("name", &self.name().unwrap_or("<checked out>"))
            .finish()
    }
}

/// Everything a role list yields for one player: the behavior, its starting
/// priority, and the objective that is assigned together with the role.
pub struct RoleKit {
    priority: i32,
    behavior: Box<dyn RoleBehavior>,
    objective: Box<dyn Objective>,
}

impl RoleKit {
    /// Bundle a behavior, its default priority, and its objective.
    #[must_use]
    pub fn new(
        priority: i32,
        behavior: Box<dyn RoleBehavior>,
        objective: Box<dyn Objective>,
    ) -> Self {
        Self {
            priority,
            behavior,
            objective,
        }
    }

    pub(crate) fn into_parts(self) -> (RoleSlot, Box<dyn Objective>) {
        (
            RoleSlot {
                priority: self.priority,
                behavior: Some(self.behavior),
            },
            self.objective,
        )
    }
}

/// Supplier of role content for one game.
///
/// The generator is exhausted in the order roles should be handed out; the
/// engine draws one kit per player, walking the roster in random order.
pub trait RoleList: Send {
    /// Whether a game with `count` players can be started from this list.
    fn validate_player_count(&self, count: usize) -> bool;

    /// Draw the next role kit, or `None` when the list is exhausted.
    fn next_role(&mut self) -> Option<RoleKit>;
}

/// Supplier of display names, exhausted in assignment order.
pub trait NameList: Send {
    /// Draw the next name, or `None` when the pool is exhausted.
    fn next_name(&mut self) -> Option<String>;
}
