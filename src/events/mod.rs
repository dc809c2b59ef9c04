//! Game events and the per-game event bus.
//!
//! An [`Event`] is an immutable value carrying the ordered list of players
//! that should observe it (`to`) plus a typed payload. The [`EventBus`] fans a
//! posted event out to the sinks of the recipients in `to`, in list order,
//! synchronously, before `post` returns. There is no retry, persistence, or
//! back-pressure; a sink failure propagates to whichever engine operation
//! triggered the post.
//!
//! The bus is constructed per game and passed explicitly to anything that
//! publishes, so concurrent game instances stay isolated.
//!
//! Roles observe events too, through their `on_event` hook; that dispatch is
//! driven by the engine after the sink fan-out (see `game`).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::PlayerId;
use crate::error::EngineError;
use crate::objective::Outcome;

/// Typed event payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// The game left the lobby and entered its first dawn.
    GameStarted,
    /// The game is over.
    GameEnded {
        /// Every player's settled outcome; `None` for objectives that were
        /// still pending when the game was ended explicitly.
        results: FxHashMap<PlayerId, Option<Outcome>>,
    },
    /// A player joined the lobby.
    PlayerJoined {
        /// The joiner.
        player: PlayerId,
    },
    /// A player left the lobby.
    PlayerLeft {
        /// The leaver.
        player: PlayerId,
    },
    /// Role-content event. The engine routes it without interpreting it.
    Custom {
        /// Content-defined discriminator.
        tag: String,
        /// The player whose role caused the event, if any.
        source: Option<PlayerId>,
        /// The player the event is about, if any.
        target: Option<PlayerId>,
        /// Numeric payload; content defines the meaning of each index.
        values: Vec<i64>,
    },
}

/// An immutable game event addressed to an ordered list of players.
///
/// An empty `to` list means the event is internal: nobody observes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The players that should observe this event, in delivery order.
    pub to: Vec<PlayerId>,
    /// The payload.
    pub kind: EventKind,
}

impl Event {
    /// Create an event with no recipients yet.
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            to: Vec::new(),
            kind,
        }
    }

    /// Add a single recipient (builder pattern).
    #[must_use]
    pub fn to_player(mut self, player: PlayerId) -> Self {
        self.to.push(player);
        self
    }

    /// Add recipients in order (builder pattern).
    #[must_use]
    pub fn to_players(mut self, players: impl IntoIterator<Item = PlayerId>) -> Self {
        self.to.extend(players);
        self
    }

    /// Whether the given player is among the recipients.
    #[must_use]
    pub fn addressed_to(&self, player: PlayerId) -> bool {
        self.to.contains(&player)
    }
}

/// Host-side receiver for one player's events.
///
/// Typically a thin adapter that forwards to a session/transport layer. A
/// returned error surfaces as [`EngineError::Delivery`] from the engine
/// operation that posted the event.
pub trait EventSink: Send {
    /// Receive one event addressed to the subscribed player.
    fn receive(&mut self, event: &Event) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Per-game publish/subscribe fan-out.
///
/// Players in an event's `to` list that have no subscribed sink are simply
/// skipped; subscription is the host's choice per player.
#[derive(Default)]
pub struct EventBus {
    sinks: FxHashMap<PlayerId, Box<dyn EventSink>>,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a sink for a player, replacing any previous sink.
    pub fn subscribe(&mut self, player: PlayerId, sink: Box<dyn EventSink>) {
        self.sinks.insert(player, sink);
    }

    /// Remove a player's sink. Returns whether one was subscribed.
    pub fn unsubscribe(&mut self, player: PlayerId) -> bool {
        self.sinks.remove(&player).is_some()
    }

    /// Whether a sink is subscribed for the player.
    #[must_use]
    pub fn is_subscribed(&self, player: PlayerId) -> bool {
        self.sinks.contains_key(&player)
    }

    /// Deliver an event to the subscribed recipients in `to`, in order.
    ///
    /// Synchronous: every delivery completes before this returns. The first
    /// sink failure aborts the remaining deliveries and propagates.
    pub fn post(&mut self, event: &Event) -> Result<(), EngineError> {
        for &player in &event.to {
            if let Some(sink) = self.sinks.get_mut(&player) {
                sink.receive(event)
                    .map_err(|source| EngineError::Delivery { player, source })?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.sinks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recorder {
        log: Arc<Mutex<Vec<(PlayerId, EventKind)>>>,
        me: PlayerId,
    }

    impl EventSink for Recorder {
        fn receive(
            &mut self,
            event: &Event,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.log.lock().unwrap().push((self.me, event.kind.clone()));
            Ok(())
        }
    }

    struct Failing;

    impl EventSink for Failing {
        fn receive(
            &mut self,
            _event: &Event,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Err("connection lost".into())
        }
    }

    fn recorder(
        bus: &mut EventBus,
        player: PlayerId,
    ) -> Arc<Mutex<Vec<(PlayerId, EventKind)>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(
            player,
            Box::new(Recorder {
                log: Arc::clone(&log),
                me: player,
            }),
        );
        log
    }

    #[test]
    fn test_post_delivers_in_to_order() {
        let mut bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for id in [0, 1, 2] {
            bus.subscribe(
                PlayerId::new(id),
                Box::new(Recorder {
                    log: Arc::clone(&log),
                    me: PlayerId::new(id),
                }),
            );
        }

        let event = Event::new(EventKind::GameStarted)
            .to_player(PlayerId::new(2))
            .to_player(PlayerId::new(0))
            .to_player(PlayerId::new(1));
        bus.post(&event).unwrap();

        let recipients: Vec<_> = log.lock().unwrap().iter().map(|(p, _)| *p).collect();
        assert_eq!(
            recipients,
            vec![PlayerId::new(2), PlayerId::new(0), PlayerId::new(1)]
        );
    }

    #[test]
    fn test_unsubscribed_recipients_are_skipped() {
        let mut bus = EventBus::new();
        let log = recorder(&mut bus, PlayerId::new(1));

        let event = Event::new(EventKind::GameStarted)
            .to_players([PlayerId::new(0), PlayerId::new(1)]);
        bus.post(&event).unwrap();

        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_sink_failure_propagates() {
        let mut bus = EventBus::new();
        bus.subscribe(PlayerId::new(0), Box::new(Failing));
        let log = recorder(&mut bus, PlayerId::new(1));

        let event = Event::new(EventKind::GameStarted)
            .to_players([PlayerId::new(0), PlayerId::new(1)]);
        let err = bus.post(&event).unwrap_err();

        assert!(matches!(
            err,
            EngineError::Delivery { player, .. } if player == PlayerId::new(0)
        ));
        // Fan-out stopped at the failure.
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_to_list_is_internal() {
        let mut bus = EventBus::new();
        let log = recorder(&mut bus, PlayerId::new(0));

        bus.post(&Event::new(EventKind::GameStarted)).unwrap();
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = EventBus::new();
        recorder(&mut bus, PlayerId::new(0));

        assert!(bus.is_subscribed(PlayerId::new(0)));
        assert!(bus.unsubscribe(PlayerId::new(0)));
        assert!(!bus.unsubscribe(PlayerId::new(0)));
        assert!(!bus.is_subscribed(PlayerId::new(0)));
    }
}
