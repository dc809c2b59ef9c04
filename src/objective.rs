//! Win/loss conditions and end-of-game evaluation.
//!
//! Each player carries one [`Objective`], assigned together with their role
//! and queried by the engine, never mutated. Evaluation walks the roster in
//! priority order: if any objective is still pending, the game continues.
//! Once every objective has settled, the game ends and a results map is built
//! over every player.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::PlayerId;
use crate::roster::Roster;

/// A settled end-of-game outcome for one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The player's objective was met.
    Win,
    /// The player's objective failed.
    Loss,
}

/// Tri-state answer an objective gives when queried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveStatus {
    /// Not decided yet; the game must continue.
    Pending,
    /// Settled as a win.
    Win,
    /// Settled as a loss.
    Loss,
}

impl ObjectiveStatus {
    /// Whether the objective is still undecided.
    #[must_use]
    pub fn is_pending(self) -> bool {
        matches!(self, ObjectiveStatus::Pending)
    }

    /// The settled outcome, or `None` while pending.
    #[must_use]
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            ObjectiveStatus::Pending => None,
            ObjectiveStatus::Win => Some(Outcome::Win),
            ObjectiveStatus::Loss => Some(Outcome::Loss),
        }
    }
}

/// A player's win condition, independent of their role's mechanics.
///
/// Implementations inspect whatever game state they were constructed around;
/// the engine only ever calls [`status`](Objective::status).
pub trait Objective: Send {
    /// Current standing of this objective.
    fn status(&self) -> ObjectiveStatus;
}

/// Outcome per player at game end. `None` marks an objective that was still
/// pending when the game was ended explicitly.
pub type GameResults = FxHashMap<PlayerId, Option<Outcome>>;

/// Aggregated answer of one evaluation pass.
#[derive(Debug, PartialEq)]
pub enum Verdict {
    /// At least one objective is still pending.
    Continue,
    /// Every objective has settled; the game is over.
    Ended(GameResults),
}

/// Evaluate every player's objective, in priority order.
///
/// Read-only with respect to the objectives. Returns
/// [`Verdict::Ended`] only when no objective reports pending.
#[must_use]
pub fn evaluate(roster: &Roster) -> Verdict {
    for id in roster.by_priority_order() {
        let pending = roster
            .get(id)
            .and_then(|player| player.objective_status())
            .is_some_and(ObjectiveStatus::is_pending);
        if pending {
            return Verdict::Continue;
        }
    }
    Verdict::Ended(results(roster))
}

/// Build the results map over every player, in priority order.
///
/// A pending (or missing) objective maps to `None`; used directly when the
/// game is ended explicitly rather than by evaluation.
#[must_use]
pub fn results(roster: &Roster) -> GameResults {
    let mut results = GameResults::default();
    for id in roster.by_priority_order() {
        let outcome = roster
            .get(id)
            .and_then(|player| player.objective_status())
            .and_then(ObjectiveStatus::outcome);
        results.insert(id, outcome);
    }
    results
}
