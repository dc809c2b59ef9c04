//! The game composition root.
//!
//! A [`Game`] binds the roster, the phase machine, the event bus, and the
//! externally supplied role/name lists into one in-memory simulation with one
//! authoritative timeline. Hosts drive it through the public operations
//! (`player_join`, `player_leave`, `start_game`, `advance_phase`, `kill`,
//! `end_game`); role hooks run synchronously inside those calls and reach
//! back into the engine through a [`PhaseCx`].
//!
//! ## Execution model
//!
//! Single-threaded and cooperative: one mutating call completes fully before
//! the next begins, and `&mut self` on every entry point enforces that within
//! one instance. Independent instances are just independent values and may be
//! driven from different threads. There is no internal locking, cancellation,
//! or timeout handling; real-time deadlines belong to the host, which calls
//! `advance_phase` when one elapses.
//!
//! ## Failure model
//!
//! A hook or sink failure aborts the remaining hooks of the current pass and
//! propagates. The engine does not roll a phase back; the host decides what
//! to do with a partially-updated game.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{Death, GameRng, Player, PlayerId, PlayerView};
use crate::error::EngineError;
use crate::events::{Event, EventBus, EventKind, EventSink};
use crate::objective::{self, GameResults, Verdict};
use crate::phase::{GameState, Moment, Phase, PhaseMachine};
use crate::roles::{NameList, RoleBehavior, RoleList};
use crate::roster::Roster;

/// Opaque identifier for one game instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl GameId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "game {:016x}", self.0)
    }
}

/// Public lobby snapshot: game id, lifecycle state, and the player list.
///
/// Serializable data; the wire format around it is the host's concern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbySummary {
    /// The game's id.
    pub id: GameId,
    /// Current lifecycle state.
    pub state: GameState,
    /// Public view of every player, in join order.
    pub players: Vec<PlayerView>,
}

/// What a role hook may do to the game while it runs.
///
/// Kills requested here are validated immediately (`DoubleKill` fires on the
/// spot for a dead target) and applied as soon as the current hook returns,
/// before the next role in priority order acts, so an earlier role's effect
/// is always visible to later roles in the same phase. Posted events reach
/// host sinks before `post` returns; the recipients' `on_event` hooks run
/// right after the current hook, in posting order.
pub struct PhaseCx<'a> {
    roster: &'a mut Roster,
    bus: &'a mut EventBus,
    state: GameState,
    moment: Moment,
    actor: PlayerId,
    pending_kills: Vec<(PlayerId, String)>,
    pending_events: Vec<Event>,
}

impl PhaseCx<'_> {
    /// The player whose hook is currently running.
    #[must_use]
    pub fn actor(&self) -> PlayerId {
        self.actor
    }

    /// The current point in game time.
    #[must_use]
    pub fn moment(&self) -> Moment {
        self.moment
    }

    /// Look up a player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.roster.get(id)
    }

    /// Iterate over all players in join order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.roster.iter()
    }

    /// Ids of players still alive, in join order.
    #[must_use]
    pub fn alive(&self) -> Vec<PlayerId> {
        self.roster.alive_ids()
    }

    /// Request a kill.
    ///
    /// Legal only while the game is in progress: a hook running during the
    /// `GameEnded` dispatch gets `InvalidState`, since the results are
    /// already built. Fails immediately with `DoubleKill` if the target is
    /// already dead or already marked for death by this hook. The death
    /// itself (`on_death` hook, then the death record) is applied when the
    /// current hook returns.
    pub fn kill(&mut self, target: PlayerId, cause: impl Into<String>) -> Result<(), EngineError> {
        if self.state != GameState::InProgress {
            return Err(EngineError::InvalidState {
                required: &[GameState::InProgress],
                actual: self.state,
            });
        }
        let player = self
            .roster
            .get(target)
            .ok_or(EngineError::UnknownPlayer { player: target })?;
        if !player.is_alive() || self.pending_kills.iter().any(|(id, _)| *id == target) {
            return Err(EngineError::DoubleKill { player: target });
        }
        self.pending_kills.push((target, cause.into()));
        Ok(())
    }

    /// Post an event.
    ///
    /// Host sinks receive it before this returns; role `on_event` hooks of
    /// the recipients run after the current hook completes.
    pub fn post(&mut self, event: Event) -> Result<(), EngineError> {
        self.bus.post(&event)?;
        self.pending_events.push(event);
        Ok(())
    }

    /// Change a player's role priority, reordering subsequent priority
    /// traversals.
    pub fn set_priority(&mut self, target: PlayerId, priority: i32) -> Result<(), EngineError> {
        self.roster
            .get_mut(target)
            .ok_or(EngineError::UnknownPlayer { player: target })?
            .set_priority(priority)
    }
}

/// One game instance: the single authoritative timeline for its players.
pub struct Game {
    id: GameId,
    machine: PhaseMachine,
    roster: Roster,
    bus: EventBus,
    rng: GameRng,
    role_list: Box<dyn RoleList>,
    name_list: Box<dyn NameList>,
    next_player: u32,
}

impl Game {
    /// Create a lobby with entropy-seeded randomness.
    #[must_use]
    pub fn new(role_list: Box<dyn RoleList>, name_list: Box<dyn NameList>) -> Self {
        Self::with_rng(role_list, name_list, GameRng::from_entropy())
    }

    /// Create a lobby with an injected random source.
    ///
    /// With a fixed seed, identical join sequences produce identical
    /// role/name assignments.
    #[must_use]
    pub fn with_rng(
        role_list: Box<dyn RoleList>,
        name_list: Box<dyn NameList>,
        mut rng: GameRng,
    ) -> Self {
        let id = GameId(rng.gen_u64());
        Self {
            id,
            machine: PhaseMachine::new(),
            roster: Roster::new(),
            bus: EventBus::new(),
            rng,
            role_list,
            name_list,
            next_player: 0,
        }
    }

    /// This game's id.
    #[must_use]
    pub fn id(&self) -> GameId {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> GameState {
        self.machine.state()
    }

    /// Current sub-phase, while the game is in progress.
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        self.machine.phase()
    }

    /// The current point in game time.
    #[must_use]
    pub fn moment(&self) -> Moment {
        self.machine.moment()
    }

    /// Number of players in the game.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.roster.len()
    }

    /// Look up a player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.roster.get(id)
    }

    /// Iterate over all players in join order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.roster.iter()
    }

    /// Player ids sorted ascending by current role priority, join order
    /// breaking ties. Recomputed on every call.
    #[must_use]
    pub fn priority_order(&self) -> Vec<PlayerId> {
        self.roster.by_priority_order()
    }

    /// Subscribe a host sink for one player's events.
    pub fn subscribe(&mut self, player: PlayerId, sink: Box<dyn EventSink>) {
        self.bus.subscribe(player, sink);
    }

    /// Remove a player's sink. Returns whether one was subscribed.
    pub fn unsubscribe(&mut self, player: PlayerId) -> bool {
        self.bus.unsubscribe(player)
    }

    /// Flip a player's host-reported connectivity flag.
    pub fn set_connected(&mut self, player: PlayerId, connected: bool) -> Result<(), EngineError> {
        self.roster
            .get_mut(player)
            .ok_or(EngineError::UnknownPlayer { player })?
            .set_connected(connected);
        Ok(())
    }

    /// Add a player to the lobby. Legal only before the game starts.
    ///
    /// Posts `PlayerJoined` to everyone in the lobby, the joiner included.
    pub fn player_join(&mut self) -> Result<PlayerId, EngineError> {
        self.machine.require(&[GameState::WaitingForPlayers])?;
        let id = PlayerId::new(self.next_player);
        self.next_player += 1;
        self.roster.add(Player::new(id));
        debug!(game = %self.id, player = %id, "player joined");

        let event = Event::new(EventKind::PlayerJoined { player: id }).to_players(self.roster.ids());
        self.post(event)?;
        Ok(id)
    }

    /// Remove a player from the lobby. Legal only before the game starts.
    ///
    /// Posts `PlayerLeft` to the remaining players.
    pub fn player_leave(&mut self, id: PlayerId) -> Result<(), EngineError> {
        self.machine.require(&[GameState::WaitingForPlayers])?;
        self.roster
            .remove(id)
            .ok_or(EngineError::UnknownPlayer { player: id })?;
        self.bus.unsubscribe(id);
        debug!(game = %self.id, player = %id, "player left");

        let event = Event::new(EventKind::PlayerLeft { player: id }).to_players(self.roster.ids());
        self.post(event)?;
        Ok(())
    }

    /// Start the game.
    ///
    /// Legal only from the lobby, and only if the role list accepts the
    /// current player count; otherwise `InvalidPlayerCount`, with no state
    /// changed. Walks the roster in a fresh random order, binding one role
    /// kit and one name per player (write-once), then enters dawn of cycle 0
    /// and posts `GameStarted` to all players.
    pub fn start_game(&mut self) -> Result<(), EngineError> {
        self.machine.require(&[GameState::WaitingForPlayers])?;
        let count = self.roster.len();
        if !self.role_list.validate_player_count(count) {
            return Err(EngineError::InvalidPlayerCount { count });
        }

        for id in self.roster.by_random_order(&mut self.rng) {
            let kit = self.role_list.next_role().ok_or(EngineError::RolesExhausted)?;
            let name = self.name_list.next_name().ok_or(EngineError::NamesExhausted)?;
            let player = self
                .roster
                .get_mut(id)
                .ok_or(EngineError::UnknownPlayer { player: id })?;
            player.assign_role(kit)?;
            player.assign_name(name)?;
        }

        self.machine.begin()?;
        info!(game = %self.id, players = count, "game started");

        let event = Event::new(EventKind::GameStarted).to_players(self.roster.ids());
        self.post(event)
    }

    /// Run the current sub-phase and move to the next one.
    ///
    /// Invokes the hook matching the current sub-phase on every living
    /// player's role, in ascending priority order, applying hook-requested
    /// kills and event dispatch between hooks. Then steps the sub-phase and
    /// evaluates objectives, which may end the game.
    pub fn advance_phase(&mut self) -> Result<(), EngineError> {
        self.machine.require(&[GameState::InProgress])?;
        let moment = self.machine.moment();
        let phase = moment.phase;
        debug!(game = %self.id, %phase, cycle = moment.cycle, "running phase hooks");

        for id in self.roster.by_priority_order() {
            // Re-checked every iteration: an earlier hook may have killed
            // this player.
            if !self.roster.get(id).is_some_and(Player::is_alive) {
                continue;
            }
            run_hook(
                &mut self.roster,
                &mut self.bus,
                GameState::InProgress,
                moment,
                id,
                |behavior, me, cx| match phase {
                    Phase::Dawn => behavior.on_dawn(me, cx),
                    Phase::Day => behavior.on_day(me, cx),
                    Phase::Dusk => behavior.on_dusk(me, cx),
                    Phase::Night => behavior.on_night(me, cx),
                },
            )?;
        }

        self.machine.step()?;
        self.check_victory()?;
        Ok(())
    }

    /// Kill a player.
    ///
    /// The explicit death entry point, used by hosts and (through
    /// [`PhaseCx::kill`]) by role logic. Invokes the target's `on_death`
    /// hook, then records a death stamped with the current moment. Killing an
    /// already-dead player is `DoubleKill` and leaves the original record
    /// unchanged.
    pub fn kill(&mut self, target: PlayerId, cause: impl Into<String>) -> Result<(), EngineError> {
        self.machine.require(&[GameState::InProgress])?;
        kill_player(
            &mut self.roster,
            &mut self.bus,
            self.machine.state(),
            self.machine.moment(),
            target,
            cause.into(),
        )
    }

    /// Evaluate every player's objective, ending the game if none is pending.
    ///
    /// Runs automatically after each `advance_phase`; exposed for hosts that
    /// want an explicit check. Returns whether the game ended.
    pub fn check_victory(&mut self) -> Result<bool, EngineError> {
        self.machine.require(&[GameState::InProgress])?;
        match objective::evaluate(&self.roster) {
            Verdict::Continue => Ok(false),
            Verdict::Ended(results) => {
                self.finish(results)?;
                Ok(true)
            }
        }
    }

    /// End the game now, regardless of objective standing.
    ///
    /// Objectives still pending map to a `None` outcome in the results.
    pub fn end_game(&mut self) -> Result<(), EngineError> {
        self.machine.require(&[GameState::InProgress])?;
        let results = objective::results(&self.roster);
        self.finish(results)
    }

    /// Public lobby snapshot.
    #[must_use]
    pub fn lobby_summary(&self) -> LobbySummary {
        LobbySummary {
            id: self.id,
            state: self.machine.state(),
            players: self.roster.iter().map(Player::view).collect(),
        }
    }

    /// Public snapshot of one player.
    #[must_use]
    pub fn player_view(&self, id: PlayerId) -> Option<PlayerView> {
        self.roster.get(id).map(Player::view)
    }

    fn finish(&mut self, results: GameResults) -> Result<(), EngineError> {
        self.machine.finish()?;
        info!(game = %self.id, "game ended");
        let event = Event::new(EventKind::GameEnded { results }).to_players(self.roster.ids());
        self.post(event)
    }

    fn post(&mut self, event: Event) -> Result<(), EngineError> {
        post_event(
            &mut self.roster,
            &mut self.bus,
            self.machine.state(),
            self.machine.moment(),
            event,
        )
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("id", &self.id)
            .field("state", &self.machine.state())
            .field("players", &self.roster.len())
            .finish_non_exhaustive()
    }
}

/// Run one role hook with the behavior temporarily checked out of the roster,
/// then apply whatever the hook requested.
///
/// Skips silently when the player has no behavior seated: either no role is
/// bound yet, or the behavior belongs to a hook further up the call stack.
fn run_hook<F>(
    roster: &mut Roster,
    bus: &mut EventBus,
    state: GameState,
    moment: Moment,
    id: PlayerId,
    hook: F,
) -> Result<(), EngineError>
where
    F: FnOnce(&mut dyn RoleBehavior, PlayerId, &mut PhaseCx<'_>) -> Result<(), EngineError>,
{
    let Some(mut behavior) = roster.checkout_behavior(id) else {
        return Ok(());
    };
    let mut cx = PhaseCx {
        roster,
        bus,
        state,
        moment,
        actor: id,
        pending_kills: Vec::new(),
        pending_events: Vec::new(),
    };
    let result = hook(behavior.as_mut(), id, &mut cx);
    let PhaseCx {
        pending_kills,
        pending_events,
        ..
    } = cx;
    roster.restore_behavior(id, behavior);
    result?;

    for (target, cause) in pending_kills {
        kill_player(roster, bus, state, moment, target, cause)?;
    }
    for event in pending_events {
        dispatch_to_roles(roster, bus, state, moment, &event)?;
    }
    Ok(())
}

/// Apply a death: `on_death` hook first, then the death record.
///
/// Refuses to run unless the game is in progress, so no dispatch path can
/// record a death after the results map was built. The record lands after
/// the hook so the role still observes itself as alive while reacting,
/// matching the hook's "before the death is recorded" contract.
fn kill_player(
    roster: &mut Roster,
    bus: &mut EventBus,
    state: GameState,
    moment: Moment,
    target: PlayerId,
    cause: String,
) -> Result<(), EngineError> {
    if state != GameState::InProgress {
        return Err(EngineError::InvalidState {
            required: &[GameState::InProgress],
            actual: state,
        });
    }
    let player = roster
        .get(target)
        .ok_or(EngineError::UnknownPlayer { player: target })?;
    if !player.is_alive() {
        return Err(EngineError::DoubleKill { player: target });
    }
    debug!(player = %target, %moment, %cause, "killing player");

    run_hook(roster, bus, state, moment, target, |behavior, me, cx| {
        behavior.on_death(me, cx)
    })?;
    roster
        .get_mut(target)
        .ok_or(EngineError::UnknownPlayer { player: target })?
        .record_death(Death::new(moment, cause))
}

/// Invoke `on_event` on each recipient's role, in `to` order.
fn dispatch_to_roles(
    roster: &mut Roster,
    bus: &mut EventBus,
    state: GameState,
    moment: Moment,
    event: &Event,
) -> Result<(), EngineError> {
    for &id in &event.to {
        run_hook(roster, bus, state, moment, id, |behavior, me, cx| {
            behavior.on_event(me, event, cx)
        })?;
    }
    Ok(())
}

/// Post an event from outside any hook: sink fan-out, then role dispatch.
fn post_event(
    roster: &mut Roster,
    bus: &mut EventBus,
    state: GameState,
    moment: Moment,
    event: Event,
) -> Result<(), EngineError> {
    bus.post(&event)?;
    dispatch_to_roles(roster, bus, state, moment, &event)
}
