//! Target selection state for roles.
//!
//! Roles that pick victims or allies hold one of two composition strategies:
//! [`SingleTarget`] for roles with at most one mark, [`BoundedSelection`]
//! (optionally wrapped in [`MultiTarget`]) for roles that may hold several
//! simultaneous targets under a fixed cap. New target cardinalities are new
//! strategy values, not new role base types.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::PlayerId;
use crate::error::EngineError;

/// Fixed-capacity ordered collection of target players.
///
/// The capacity is fixed at construction and the length never exceeds it.
/// At capacity, `add` rejects with `CapacityExceeded` rather than evicting;
/// a role that wants rotation must remove or clear explicitly first.
///
/// ```
/// use salem_engine::{BoundedSelection, PlayerId};
///
/// let mut marks = BoundedSelection::new(1);
/// marks.add(PlayerId::new(7)).unwrap();
/// assert!(marks.add(PlayerId::new(8)).is_err());
///
/// marks.remove(PlayerId::new(7));
/// marks.add(PlayerId::new(8)).unwrap();
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundedSelection {
    targets: SmallVec<[PlayerId; 4]>,
    max_len: usize,
}

impl BoundedSelection {
    /// Create an empty selection holding at most `max_len` targets.
    #[must_use]
    pub fn new(max_len: usize) -> Self {
        Self {
            targets: SmallVec::new(),
            max_len,
        }
    }

    /// The fixed capacity.
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Number of targets currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the selection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Whether the selection is at capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.targets.len() >= self.max_len
    }

    /// Append a target, failing with `CapacityExceeded` at capacity.
    pub fn add(&mut self, player: PlayerId) -> Result<(), EngineError> {
        if self.is_full() {
            return Err(EngineError::CapacityExceeded {
                limit: self.max_len,
            });
        }
        self.targets.push(player);
        Ok(())
    }

    /// Remove the first matching entry. Returns whether one was removed.
    pub fn remove(&mut self, player: PlayerId) -> bool {
        match self.targets.iter().position(|&t| t == player) {
            Some(index) => {
                self.targets.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether the player is currently selected.
    #[must_use]
    pub fn contains(&self, player: PlayerId) -> bool {
        self.targets.contains(&player)
    }

    /// Drop all targets; capacity is unchanged.
    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Snapshot of the targets in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[PlayerId] {
        &self.targets
    }

    /// Iterate over the targets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.targets.iter().copied()
    }
}

/// Strategy for roles holding at most one target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleTarget {
    target: Option<PlayerId>,
}

impl SingleTarget {
    /// Create an empty strategy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current target, if any.
    #[must_use]
    pub fn get(&self) -> Option<PlayerId> {
        self.target
    }

    /// Set the target, replacing any previous one.
    pub fn set(&mut self, player: PlayerId) {
        self.target = Some(player);
    }

    /// Take the target, leaving the strategy empty.
    pub fn take(&mut self) -> Option<PlayerId> {
        self.target.take()
    }
}

/// Strategy for roles holding several simultaneous targets under a fixed cap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiTarget {
    selection: BoundedSelection,
}

impl MultiTarget {
    /// Create an empty strategy capped at `max_targets`.
    #[must_use]
    pub fn new(max_targets: usize) -> Self {
        Self {
            selection: BoundedSelection::new(max_targets),
        }
    }

    /// The underlying selection.
    #[must_use]
    pub fn selection(&self) -> &BoundedSelection {
        &self.selection
    }

    /// Mutable access to the underlying selection.
    pub fn selection_mut(&mut self) -> &mut BoundedSelection {
        &mut self.selection
    }
}
