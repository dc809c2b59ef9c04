//! The player collection owned by one game.
//!
//! The roster keeps players in join order and exposes the two traversal
//! orders the engine needs: a fresh uniform shuffle (used exactly once, at
//! game start, so lobby position cannot leak role assignment) and the
//! priority order used for every phase pass and for end-game aggregation.

use crate::core::{GameRng, Player, PlayerId};
use crate::roles::RoleBehavior;

/// All players of one game instance, in join order.
#[derive(Debug, Default)]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Look up a player by id.
    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id() == id)
    }

    /// Iterate over players in join order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// All player ids in join order.
    #[must_use]
    pub fn ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(Player::id).collect()
    }

    /// Ids of players still alive, in join order.
    #[must_use]
    pub fn alive_ids(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|player| player.is_alive())
            .map(Player::id)
            .collect()
    }

    pub(crate) fn add(&mut self, player: Player) {
        self.players.push(player);
    }

    pub(crate) fn remove(&mut self, id: PlayerId) -> Option<Player> {
        let index = self.players.iter().position(|player| player.id() == id)?;
        Some(self.players.remove(index))
    }

    /// A fresh uniformly shuffled sequence of all player ids.
    pub(crate) fn by_random_order(&self, rng: &mut GameRng) -> Vec<PlayerId> {
        let mut ids = self.ids();
        rng.shuffle(&mut ids);
        ids
    }

    /// All player ids sorted ascending by current role priority.
    ///
    /// Priorities may change at runtime, so this is recomputed on every call
    /// and never cached. The sort is stable, so players sharing a priority
    /// keep their join order. Players without a role (pre-start) sort as
    /// priority 0.
    #[must_use]
    pub fn by_priority_order(&self) -> Vec<PlayerId> {
        let mut ids: Vec<(i32, PlayerId)> = self
            .players
            .iter()
            .map(|player| (player.priority().unwrap_or(0), player.id()))
            .collect();
        ids.sort_by_key(|&(priority, _)| priority);
        ids.into_iter().map(|(_, id)| id).collect()
    }

    pub(crate) fn checkout_behavior(&mut self, id: PlayerId) -> Option<Box<dyn RoleBehavior>> {
        self.get_mut(id).and_then(Player::checkout_behavior)
    }

    pub(crate) fn restore_behavior(&mut self, id: PlayerId, behavior: Box<dyn RoleBehavior>) {
        if let Some(player) = self.get_mut(id) {
            player.restore_behavior(behavior);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::{Objective, ObjectiveStatus};
    use crate::roles::RoleKit;

    struct Idle;
    impl RoleBehavior for Idle {
        fn name(&self) -> &str {
            "idle"
        }
    }

    struct Pending;
    impl Objective for Pending {
        fn status(&self) -> ObjectiveStatus {
            ObjectiveStatus::Pending
        }
    }

    fn roster_with_priorities(priorities: &[i32]) -> Roster {
        let mut roster = Roster::new();
        for (index, &priority) in priorities.iter().enumerate() {
            let mut player = Player::new(PlayerId::new(index as u32));
            player
                .assign_role(RoleKit::new(priority, Box::new(Idle), Box::new(Pending)))
                .unwrap();
            roster.add(player);
        }
        roster
    }

    #[test]
    fn test_priority_order_ascending() {
        let roster = roster_with_priorities(&[30, 10, 20]);
        let order: Vec<u32> = roster
            .by_priority_order()
            .into_iter()
            .map(PlayerId::raw)
            .collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_priority_ties_break_by_join_order() {
        let roster = roster_with_priorities(&[5, 5, 1, 5]);
        let order: Vec<u32> = roster
            .by_priority_order()
            .into_iter()
            .map(PlayerId::raw)
            .collect();
        assert_eq!(order, vec![2, 0, 1, 3]);
    }

    #[test]
    fn test_priority_order_not_cached() {
        let mut roster = roster_with_priorities(&[1, 2]);
        assert_eq!(
            roster.by_priority_order(),
            vec![PlayerId::new(0), PlayerId::new(1)]
        );

        roster.get_mut(PlayerId::new(0)).unwrap().set_priority(9).unwrap();
        assert_eq!(
            roster.by_priority_order(),
            vec![PlayerId::new(1), PlayerId::new(0)]
        );
    }

    #[test]
    fn test_random_order_deterministic_for_seed() {
        let roster = roster_with_priorities(&[0, 0, 0, 0, 0]);
        let a = roster.by_random_order(&mut GameRng::new(7));
        let b = roster.by_random_order(&mut GameRng::new(7));
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort();
        assert_eq!(sorted, roster.ids());
    }

    #[test]
    fn test_remove_returns_player() {
        let mut roster = roster_with_priorities(&[1, 2]);
        let removed = roster.remove(PlayerId::new(0)).unwrap();
        assert_eq!(removed.id(), PlayerId::new(0));
        assert_eq!(roster.len(), 1);
        assert!(roster.remove(PlayerId::new(0)).is_none());
    }
}
