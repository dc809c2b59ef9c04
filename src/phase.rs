//! Game lifecycle and the repeating phase cycle.
//!
//! A game moves through three lifecycle states, strictly forward:
//! waiting for players, in progress, ended. While in progress, time is a
//! repeating cycle of four sub-phases (dawn, day, dusk, night) with a
//! counter that increments each time night wraps back to dawn. A
//! [`Moment`] (cycle plus sub-phase) is the engine's timestamp: deaths are
//! stamped with one, and each phase pass runs at one.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Lifecycle state of a game. Transitions are strictly forward; an ended
/// game never restarts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Lobby: players may join and leave.
    #[default]
    WaitingForPlayers,
    /// Roles are bound and the phase cycle is running.
    InProgress,
    /// The game is over; only read access remains.
    Ended,
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameState::WaitingForPlayers => write!(f, "waiting for players"),
            GameState::InProgress => write!(f, "in progress"),
            GameState::Ended => write!(f, "ended"),
        }
    }
}

/// One sub-phase of the repeating cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// First sub-phase of each cycle.
    #[default]
    Dawn,
    /// Discussion phase.
    Day,
    /// Voting/verdict phase.
    Dusk,
    /// Night actions; wraps to the next cycle's dawn.
    Night,
}

impl Phase {
    /// The sub-phase that follows this one in the cycle.
    #[must_use]
    pub const fn next(self) -> Phase {
        match self {
            Phase::Dawn => Phase::Day,
            Phase::Day => Phase::Dusk,
            Phase::Dusk => Phase::Night,
            Phase::Night => Phase::Dawn,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Dawn => write!(f, "dawn"),
            Phase::Day => write!(f, "day"),
            Phase::Dusk => write!(f, "dusk"),
            Phase::Night => write!(f, "night"),
        }
    }
}

/// A point in game time: which cycle, and which sub-phase within it.
///
/// ```
/// use salem_engine::{Moment, Phase};
///
/// let moment = Moment::default();
/// assert_eq!(moment.cycle, 0);
/// assert_eq!(moment.phase, Phase::Dawn);
/// assert_eq!(moment.to_string(), "dawn of cycle 0");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Moment {
    /// Zero-based cycle counter.
    pub cycle: u32,
    /// Sub-phase within the cycle.
    pub phase: Phase,
}

impl std::fmt::Display for Moment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of cycle {}", self.phase, self.cycle)
    }
}

/// The lifecycle and phase clock of one game.
///
/// Owns the forward-only lifecycle state and, while in progress, the current
/// [`Moment`]. Everything that must only happen in a particular lifecycle
/// state goes through [`require`](PhaseMachine::require) first.
#[derive(Clone, Debug, Default)]
pub struct PhaseMachine {
    state: GameState,
    moment: Moment,
}

impl PhaseMachine {
    /// A fresh machine in the lobby state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Current point in game time. Meaningful once the game has begun;
    /// frozen at the final moment after it ends.
    #[must_use]
    pub fn moment(&self) -> Moment {
        self.moment
    }

    /// Current sub-phase, or `None` unless the game is in progress.
    #[must_use]
    pub fn phase(&self) -> Option<Phase> {
        match self.state {
            GameState::InProgress => Some(self.moment.phase),
            _ => None,
        }
    }

    /// Fail with `InvalidState` unless the current state is one of
    /// `required`.
    pub fn require(&self, required: &'static [GameState]) -> Result<(), EngineError> {
        if required.contains(&self.state) {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                required,
                actual: self.state,
            })
        }
    }

    /// Leave the lobby: enter dawn of cycle 0.
    pub fn begin(&mut self) -> Result<(), EngineError> {
        self.require(&[GameState::WaitingForPlayers])?;
        self.state = GameState::InProgress;
        self.moment = Moment::default();
        Ok(())
    }

    /// Move to the next sub-phase, bumping the cycle counter when night
    /// wraps to dawn. Returns the new moment.
    pub fn step(&mut self) -> Result<Moment, EngineError> {
        self.require(&[GameState::InProgress])?;
        if self.moment.phase == Phase::Night {
            self.moment.cycle += 1;
        }
        self.moment.phase = self.moment.phase.next();
        Ok(self.moment)
    }

    /// End the game. The moment freezes at its current value.
    pub fn finish(&mut self) -> Result<(), EngineError> {
        self.require(&[GameState::InProgress])?;
        self.state = GameState::Ended;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_cycle_wraps() {
        assert_eq!(Phase::Dawn.next(), Phase::Day);
        assert_eq!(Phase::Day.next(), Phase::Dusk);
        assert_eq!(Phase::Dusk.next(), Phase::Night);
        assert_eq!(Phase::Night.next(), Phase::Dawn);
    }

    #[test]
    fn test_step_increments_cycle_on_wrap() {
        let mut machine = PhaseMachine::new();
        machine.begin().unwrap();

        let moments: Vec<Moment> = (0..5).map(|_| machine.step().unwrap()).collect();
        let expected: Vec<(u32, Phase)> = vec![
            (0, Phase::Day),
            (0, Phase::Dusk),
            (0, Phase::Night),
            (1, Phase::Dawn),
            (1, Phase::Day),
        ];
        let actual: Vec<(u32, Phase)> = moments.iter().map(|m| (m.cycle, m.phase)).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_begin_requires_lobby() {
        let mut machine = PhaseMachine::new();
        machine.begin().unwrap();

        let err = machine.begin().unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidState {
                actual: GameState::InProgress,
                ..
            }
        ));
    }

    #[test]
    fn test_step_requires_in_progress() {
        let mut machine = PhaseMachine::new();
        assert!(machine.step().is_err());
        assert_eq!(machine.phase(), None);

        machine.begin().unwrap();
        assert_eq!(machine.phase(), Some(Phase::Dawn));
    }

    #[test]
    fn test_ended_is_terminal() {
        let mut machine = PhaseMachine::new();
        machine.begin().unwrap();
        machine.step().unwrap();
        machine.finish().unwrap();

        assert!(machine.begin().is_err());
        assert!(machine.step().is_err());
        assert!(machine.finish().is_err());
        // The final moment stays readable.
        assert_eq!(machine.moment().phase, Phase::Day);
        assert_eq!(machine.phase(), None);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(GameState::WaitingForPlayers.to_string(), "waiting for players");
        assert_eq!(GameState::InProgress.to_string(), "in progress");
        assert_eq!(GameState::Ended.to_string(), "ended");
    }
}
