//! Shared fixtures for the integration tests: scripted role/name lists,
//! externally settable objectives, and roles/sinks that record what the
//! engine did to them.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use salem_engine::{
    Event, EventKind, EventSink, NameList, Objective, ObjectiveStatus, PhaseCx, PlayerId,
    RoleBehavior, RoleKit, RoleList,
};

/// Role list that hands out a fixed sequence of kits.
pub struct ScriptedRoles {
    kits: VecDeque<RoleKit>,
    min_players: usize,
}

impl ScriptedRoles {
    /// Accepts exactly as many players as there are kits (or more, which
    /// exhausts the list mid-assignment).
    pub fn new(kits: Vec<RoleKit>) -> Self {
        Self {
            min_players: kits.len(),
            kits: kits.into(),
        }
    }

    /// Same kits, but with an explicit minimum player count.
    pub fn requiring(min_players: usize, kits: Vec<RoleKit>) -> Self {
        Self {
            min_players,
            kits: kits.into(),
        }
    }
}

impl RoleList for ScriptedRoles {
    fn validate_player_count(&self, count: usize) -> bool {
        count >= self.min_players
    }

    fn next_role(&mut self) -> Option<RoleKit> {
        self.kits.pop_front()
    }
}

/// Endless name pool: `townsfolk-1`, `townsfolk-2`, ...
#[derive(Default)]
pub struct NumberedNames {
    next: u32,
}

impl NameList for NumberedNames {
    fn next_name(&mut self) -> Option<String> {
        self.next += 1;
        Some(format!("townsfolk-{}", self.next))
    }
}

pub fn names() -> Box<dyn NameList> {
    Box::new(NumberedNames::default())
}

/// Objective whose status the test flips from outside the game.
#[derive(Clone)]
pub struct SharedStatus(Arc<Mutex<ObjectiveStatus>>);

impl SharedStatus {
    pub fn pending() -> Self {
        Self(Arc::new(Mutex::new(ObjectiveStatus::Pending)))
    }

    pub fn settled(status: ObjectiveStatus) -> Self {
        Self(Arc::new(Mutex::new(status)))
    }

    pub fn set(&self, status: ObjectiveStatus) {
        *self.0.lock().unwrap() = status;
    }
}

impl Objective for SharedStatus {
    fn status(&self) -> ObjectiveStatus {
        *self.0.lock().unwrap()
    }
}

/// Chronological record of hook invocations, shared across roles.
pub type HookLog = Arc<Mutex<Vec<(&'static str, PlayerId)>>>;

pub fn hook_log() -> HookLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Ids logged for one hook kind, in invocation order.
pub fn logged(log: &HookLog, hook: &str) -> Vec<PlayerId> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|(name, _)| *name == hook)
        .map(|&(_, id)| id)
        .collect()
}

/// Role that does nothing but log every hook it receives.
pub struct Recorder {
    log: HookLog,
}

impl Recorder {
    pub fn new(log: &HookLog) -> Self {
        Self {
            log: Arc::clone(log),
        }
    }

    fn record(&self, hook: &'static str, me: PlayerId) {
        self.log.lock().unwrap().push((hook, me));
    }
}

impl RoleBehavior for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn on_dawn(&mut self, me: PlayerId, _cx: &mut PhaseCx<'_>) -> Result<(), salem_engine::EngineError> {
        self.record("dawn", me);
        Ok(())
    }

    fn on_day(&mut self, me: PlayerId, _cx: &mut PhaseCx<'_>) -> Result<(), salem_engine::EngineError> {
        self.record("day", me);
        Ok(())
    }

    fn on_dusk(&mut self, me: PlayerId, _cx: &mut PhaseCx<'_>) -> Result<(), salem_engine::EngineError> {
        self.record("dusk", me);
        Ok(())
    }

    fn on_night(&mut self, me: PlayerId, _cx: &mut PhaseCx<'_>) -> Result<(), salem_engine::EngineError> {
        self.record("night", me);
        Ok(())
    }

    fn on_death(&mut self, me: PlayerId, _cx: &mut PhaseCx<'_>) -> Result<(), salem_engine::EngineError> {
        self.record("death", me);
        Ok(())
    }

    fn on_event(
        &mut self,
        me: PlayerId,
        _event: &Event,
        _cx: &mut PhaseCx<'_>,
    ) -> Result<(), salem_engine::EngineError> {
        self.record("event", me);
        Ok(())
    }
}

/// A recorder kit with a pending objective.
pub fn recorder_kit(priority: i32, log: &HookLog) -> RoleKit {
    RoleKit::new(
        priority,
        Box::new(Recorder::new(log)),
        Box::new(SharedStatus::pending()),
    )
}

/// A recorder kit wired to the given objective.
pub fn recorder_kit_with(priority: i32, log: &HookLog, status: &SharedStatus) -> RoleKit {
    RoleKit::new(priority, Box::new(Recorder::new(log)), Box::new(status.clone()))
}

/// Host sink that records every delivered event kind.
pub type EventLog = Arc<Mutex<Vec<EventKind>>>;

pub struct RecordingSink {
    log: EventLog,
}

impl RecordingSink {
    pub fn new() -> (Box<dyn EventSink>, EventLog) {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        (
            Box::new(Self {
                log: Arc::clone(&log),
            }),
            log,
        )
    }
}

impl EventSink for RecordingSink {
    fn receive(&mut self, event: &Event) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.log.lock().unwrap().push(event.kind.clone());
        Ok(())
    }
}

/// Host sink that rejects every delivery.
pub struct FailingSink;

impl EventSink for FailingSink {
    fn receive(&mut self, _event: &Event) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err("connection lost".into())
    }
}
