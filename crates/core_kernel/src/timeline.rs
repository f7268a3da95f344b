//! Append-only audit timeline
//!
//! Every state transition in the engine records exactly one `TimelineEvent`.
//! Events are immutable once recorded; a record's `Timeline` only ever grows,
//! and consecutive events must chain (`previous_status` of each event equals
//! `new_status` of the one before it). The generic status parameter lets the
//! same primitives audit vouchers, cash-in and cash-out records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::identifiers::EventId;

/// Who performed a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActorRole {
    Admin,
    System,
    Seller,
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorRole::Admin => write!(f, "ADMIN"),
            ActorRole::System => write!(f, "SYSTEM"),
            ActorRole::Seller => write!(f, "SELLER"),
        }
    }
}

/// The principal recorded on a timeline event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: ActorRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    /// The engine itself, for transitions not initiated by a person
    pub fn system() -> Self {
        Self::new("system", "Treasury Engine", ActorRole::System)
    }

    pub fn admin(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, ActorRole::Admin)
    }

    pub fn seller(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, ActorRole::Seller)
    }
}

/// Errors raised when a timeline append would break the audit chain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimelineError {
    #[error("Broken audit chain: expected previous status {expected}, got {got}")]
    BrokenChain { expected: String, got: String },

    #[error("Initial event must not carry a previous status")]
    InitialHasPrevious,
}

/// One immutable audit record
///
/// `previous_status` is `None` only on the creation event of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent<S> {
    pub id: EventId,
    pub timestamp: DateTime<Utc>,
    pub previous_status: Option<S>,
    pub new_status: S,
    pub actor: Actor,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl<S> TimelineEvent<S> {
    /// The creation event of a record
    pub fn initial(status: S, actor: Actor, reason: impl Into<String>) -> Self {
        Self {
            id: EventId::new_v7(),
            timestamp: Utc::now(),
            previous_status: None,
            new_status: status,
            actor,
            reason: reason.into(),
            metadata: None,
        }
    }

    /// A transition from one status to another
    pub fn transition(previous: S, new: S, actor: Actor, reason: impl Into<String>) -> Self {
        Self {
            id: EventId::new_v7(),
            timestamp: Utc::now(),
            previous_status: Some(previous),
            new_status: new,
            actor,
            reason: reason.into(),
            metadata: None,
        }
    }

    /// Attaches an opaque payload (e.g., a raw provider response) for audit
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// The ordered, append-only history of one record
///
/// Non-empty by construction: a timeline starts from a creation event and
/// only grows. `record` rejects any event that does not chain onto the
/// current status, so no event is ever reordered, replaced or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline<S>(Vec<TimelineEvent<S>>);

impl<S> Timeline<S>
where
    S: Copy + PartialEq + fmt::Debug,
{
    /// Starts a timeline from a creation event
    pub fn start(event: TimelineEvent<S>) -> Result<Self, TimelineError> {
        if event.previous_status.is_some() {
            return Err(TimelineError::InitialHasPrevious);
        }
        Ok(Self(vec![event]))
    }

    /// Appends a transition event, enforcing the audit chain
    pub fn record(&mut self, event: TimelineEvent<S>) -> Result<(), TimelineError> {
        let current = self.current_status();
        if event.previous_status != Some(current) {
            return Err(TimelineError::BrokenChain {
                expected: format!("{:?}", current),
                got: format!("{:?}", event.previous_status),
            });
        }
        self.0.push(event);
        Ok(())
    }

    /// The status recorded by the most recent event
    pub fn current_status(&self) -> S {
        self.last().new_status
    }

    /// The most recent event
    pub fn last(&self) -> &TimelineEvent<S> {
        self.0.last().expect("timeline is non-empty by construction")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn events(&self) -> &[TimelineEvent<S>] {
        &self.0
    }

    /// Verifies the chain invariant over the whole history
    pub fn is_chained(&self) -> bool {
        self.0
            .windows(2)
            .all(|w| w[1].previous_status == Some(w[0].new_status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    enum Phase {
        Open,
        Closed,
    }

    #[test]
    fn test_timeline_starts_from_initial_event() {
        let timeline =
            Timeline::start(TimelineEvent::initial(Phase::Open, Actor::system(), "created"))
                .unwrap();

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.current_status(), Phase::Open);
        assert!(timeline.last().previous_status.is_none());
    }

    #[test]
    fn test_timeline_rejects_initial_with_previous() {
        let event = TimelineEvent::transition(Phase::Open, Phase::Closed, Actor::system(), "");
        assert_eq!(
            Timeline::start(event),
            Err(TimelineError::InitialHasPrevious)
        );
    }

    #[test]
    fn test_record_appends_chained_event() {
        let mut timeline =
            Timeline::start(TimelineEvent::initial(Phase::Open, Actor::system(), "created"))
                .unwrap();

        timeline
            .record(TimelineEvent::transition(
                Phase::Open,
                Phase::Closed,
                Actor::admin("a-1", "Ana"),
                "done",
            ))
            .unwrap();

        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.current_status(), Phase::Closed);
        assert!(timeline.is_chained());
    }

    #[test]
    fn test_record_rejects_broken_chain() {
        let mut timeline =
            Timeline::start(TimelineEvent::initial(Phase::Open, Actor::system(), "created"))
                .unwrap();

        let stale = TimelineEvent::transition(Phase::Closed, Phase::Open, Actor::system(), "");
        let result = timeline.record(stale);

        assert!(matches!(result, Err(TimelineError::BrokenChain { .. })));
        assert_eq!(timeline.len(), 1);
    }

    #[test]
    fn test_metadata_round_trips_through_serde() {
        let event = TimelineEvent::initial(Phase::Open, Actor::system(), "created")
            .with_metadata(serde_json::json!({"cdr": "ok"}));
        let timeline = Timeline::start(event).unwrap();

        let json = serde_json::to_string(&timeline).unwrap();
        let back: Timeline<Phase> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.last().metadata, timeline.last().metadata);
    }
}
