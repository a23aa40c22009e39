//! Event types for the AHP event system
//!
//! Provides shared event definitions and the EventBus used by the catalog,
//! submission and aggregation services.

use crate::models::{Category, Iteration};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Why the iteration counter moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationChange {
    IndicatorAdded,
    IndicatorEdited,
    IndicatorRemoved,
    /// Admin set the counter explicitly
    Manual,
}

/// AHP event types
///
/// Events are broadcast via EventBus and can be serialized for transport by
/// whatever layer sits in front of the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AhpEvent {
    /// Iteration counter changed
    ///
    /// Future submissions land in `iteration`; past results are untouched.
    IterationAdvanced {
        iteration: Iteration,
        reason: IterationChange,
        timestamp: DateTime<Utc>,
    },

    /// A respondent submission was stored
    SubmissionReceived {
        submission_id: Uuid,
        iteration: Iteration,
        /// Groups whose CR exceeded the configured threshold
        inconsistent_groups: Vec<Category>,
        timestamp: DateTime<Utc>,
    },

    /// A respondent submission was deleted (recompute follows)
    SubmissionDeleted {
        submission_id: Uuid,
        iteration: Iteration,
        timestamp: DateTime<Utc>,
    },

    /// Weights for an iteration were (re)computed and stored
    ResultComputed {
        iteration: Iteration,
        respondent_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// No submissions remain for an iteration; its result was removed
    ResultCleared {
        iteration: Iteration,
        timestamp: DateTime<Utc>,
    },
}

impl AhpEvent {
    /// Iteration the event refers to
    pub fn iteration(&self) -> Iteration {
        match self {
            AhpEvent::IterationAdvanced { iteration, .. }
            | AhpEvent::SubmissionReceived { iteration, .. }
            | AhpEvent::SubmissionDeleted { iteration, .. }
            | AhpEvent::ResultComputed { iteration, .. }
            | AhpEvent::ResultCleared { iteration, .. } => *iteration,
        }
    }
}

/// Broadcast channel shared by all services
///
/// Cloning an EventBus yields another handle onto the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AhpEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    ///
    /// # Examples
    ///
    /// ```
    /// use ahp_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<AhpEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: AhpEvent) -> Result<usize, broadcast::error::SendError<AhpEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: AhpEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
