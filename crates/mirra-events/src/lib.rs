//! Core event bus for the mirra mirroring engine.
//!
//! The bus provides a typed event enum, sequential identifiers, and support
//! for replaying recent events when subscribers reconnect. Internally it uses
//! `tokio::broadcast` with a bounded buffer; when the channel overflows, the
//! oldest events are dropped, matching the desired backpressure behaviour.
//! Because a single channel carries every kind of event, subscribers observe
//! text lines and percentages in exactly the order the engine produced them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::sync::broadcast::{Receiver, Sender};
use uuid::Uuid;

/// Identifier assigned to each event emitted by the engine.
pub type EventId = u64;

/// Default buffer size for the in-memory replay ring.
const DEFAULT_REPLAY_CAPACITY: usize = 1_024;

/// Typed domain events surfaced by the mirror engine.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A job was appended to the queue.
    JobQueued {
        /// Identifier of the queued job.
        job_id: Uuid,
        /// Human-readable job label, e.g. `debian/bookworm`.
        label: String,
    },
    /// The sequencer started executing a job.
    JobStarted {
        /// Identifier of the started job.
        job_id: Uuid,
        /// Human-readable job label.
        label: String,
    },
    /// Raw diagnostic line from a transfer tool or the engine itself.
    Text {
        /// Job the line belongs to.
        job_id: Uuid,
        /// Verbatim line with trailing whitespace removed.
        line: String,
    },
    /// Normalized completion percentage for the active transfer.
    ///
    /// Upstream tools do not guarantee monotonic values; consumers must
    /// tolerate regressions.
    Percent {
        /// Job the percentage belongs to.
        job_id: Uuid,
        /// Completion percentage, clamped to 0..=100 by the publisher.
        value: u8,
    },
    /// A job reached a terminal state.
    JobFinished {
        /// Identifier of the finished job.
        job_id: Uuid,
        /// Terminal outcome of the job.
        outcome: JobOutcome,
    },
    /// The queue drained and the sequencer went idle.
    QueueIdle,
    /// The sequencer parked itself after a cancellation and is waiting for an
    /// explicit resume.
    Suspended {
        /// Job whose cancellation caused the suspension.
        job_id: Uuid,
    },
}

impl Event {
    /// Machine-friendly discriminator for stream consumers.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::JobQueued { .. } => "job_queued",
            Self::JobStarted { .. } => "job_started",
            Self::Text { .. } => "text",
            Self::Percent { .. } => "percent",
            Self::JobFinished { .. } => "job_finished",
            Self::QueueIdle => "queue_idle",
            Self::Suspended { .. } => "suspended",
        }
    }
}

/// Terminal state of one mirror job.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    /// The transfer completed and the destination was updated.
    Success,
    /// An external process failed and the job was aborted.
    Failed {
        /// Pipeline phase that failed.
        phase: TransferPhase,
        /// Exit code of the failed process when the OS reported one.
        exit_code: Option<i32>,
    },
    /// The job was forcefully cancelled by the caller.
    Cancelled,
}

impl JobOutcome {
    /// Whether the outcome represents a completed transfer.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Phase of a transfer pipeline, used to attribute failures.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransferPhase {
    /// Download from the remote mirror (into staging for two-phase jobs).
    Fetch,
    /// Synchronisation from staging into the final destination.
    Commit,
}

impl TransferPhase {
    /// Render the phase as its lowercase string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Commit => "commit",
        }
    }
}

/// Metadata wrapper around events. Each envelope tracks the event id and
/// emission timestamp.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Sequential identifier assigned by the bus.
    pub id: EventId,
    /// Emission timestamp.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub event: Event,
}

/// Shared event bus built on top of `tokio::broadcast`.
#[derive(Clone)]
pub struct EventBus {
    sender: Sender<EventEnvelope>,
    buffer: Arc<Mutex<VecDeque<EventEnvelope>>>,
    next_id: Arc<std::sync::atomic::AtomicU64>,
    replay_capacity: usize,
}

impl EventBus {
    /// Construct a new bus with the provided broadcast capacity.
    ///
    /// The broadcast channel uses the same capacity as the in-memory replay
    /// buffer, ensuring dropped events impact both structures consistently.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "event bus capacity must be positive");
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            next_id: Arc::new(std::sync::atomic::AtomicU64::new(1)),
            replay_capacity: capacity,
        }
    }

    /// Construct a bus with the default in-memory buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Publish a new event to the bus, assigning it a sequential identifier.
    ///
    /// # Panics
    ///
    /// Panics if the replay buffer mutex has been poisoned.
    pub fn publish(&self, event: Event) -> EventId {
        let id = self
            .next_id
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let envelope = EventEnvelope {
            id,
            timestamp: Utc::now(),
            event,
        };

        {
            let mut buffer = self.buffer.lock().expect("event buffer mutex poisoned");
            if buffer.len() == self.replay_capacity {
                buffer.pop_front();
            }
            buffer.push_back(envelope.clone());
        }

        let _ = self.sender.send(envelope);
        id
    }

    /// Subscribe to the bus, replaying any buffered events newer than `since_id`.
    ///
    /// # Panics
    ///
    /// Panics if the replay buffer mutex has been poisoned.
    #[must_use]
    pub fn subscribe(&self, since_id: Option<EventId>) -> EventStream {
        let mut backlog = VecDeque::new();
        if let Some(since) = since_id {
            let buffer = self.buffer.lock().expect("event buffer mutex poisoned");
            for item in buffer.iter() {
                if item.id > since {
                    backlog.push_back(item.clone());
                }
            }
        }

        let receiver = self.sender.subscribe();
        EventStream { backlog, receiver }
    }

    /// Returns the last assigned identifier, if any events have been published.
    ///
    /// # Panics
    ///
    /// Panics if the replay buffer mutex has been poisoned.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        let buffer = self.buffer.lock().expect("event buffer mutex poisoned");
        buffer.back().map(|event| event.id)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream wrapper that yields events either from the replay backlog or from
/// the live broadcast channel.
pub struct EventStream {
    backlog: VecDeque<EventEnvelope>,
    receiver: Receiver<EventEnvelope>,
}

impl EventStream {
    /// Receive the next event, respecting the replay backlog first.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        if let Some(event) = self.backlog.pop_front() {
            return Some(event);
        }

        match self.receiver.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(_)) => self.receiver.recv().await.ok(),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text_event(id: usize) -> Event {
        Event::Text {
            job_id: Uuid::from_u128(id as u128 + 1),
            line: format!("receiving file list ... {id}"),
        }
    }

    #[tokio::test]
    async fn sequential_ids_and_replay() {
        let bus = EventBus::with_capacity(16);

        let mut last_id = 0;
        for i in 0..5 {
            last_id = bus.publish(sample_text_event(i));
        }
        assert_eq!(last_id, 5);

        let mut stream = bus.subscribe(Some(2));
        let mut received = Vec::new();
        for _ in 0..3 {
            if let Some(event) = stream.next().await {
                received.push(event);
            }
        }

        assert_eq!(received.len(), 3);
        assert_eq!(received.first().unwrap().id, 3);
        assert_eq!(received.last().unwrap().id, 5);
    }

    #[tokio::test]
    async fn text_and_percent_preserve_publish_order() {
        let bus = EventBus::with_capacity(16);
        let mut stream = bus.subscribe(None);
        let job_id = Uuid::new_v4();

        bus.publish(Event::Text {
            job_id,
            line: "pool/main/a/apt".into(),
        });
        bus.publish(Event::Percent { job_id, value: 1 });
        bus.publish(Event::Percent { job_id, value: 45 });

        let kinds = [
            stream.next().await.unwrap().event.kind(),
            stream.next().await.unwrap().event.kind(),
            stream.next().await.unwrap().event.kind(),
        ];
        assert_eq!(kinds, ["text", "percent", "percent"]);
    }

    #[test]
    fn outcome_success_flag() {
        assert!(JobOutcome::Success.is_success());
        assert!(!JobOutcome::Cancelled.is_success());
        assert!(
            !JobOutcome::Failed {
                phase: TransferPhase::Fetch,
                exit_code: Some(2),
            }
            .is_success()
        );
    }
}
