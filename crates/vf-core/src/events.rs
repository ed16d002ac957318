//! Pipeline event system.
//!
//! [`EventBus`] wraps a `tokio::sync::broadcast` channel with a bounded
//! ring-buffer of recent events so that late subscribers can catch up.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::ids::{JobId, VideoId};
use crate::jobs::JobKind;

/// Maximum number of events retained in the ring buffer.
const MAX_RECENT_EVENTS: usize = 100;

// ---------------------------------------------------------------------------
// EventPayload
// ---------------------------------------------------------------------------

/// Payload describing what happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    // -- Job lifecycle -------------------------------------------------------
    JobQueued {
        job_id: JobId,
        video_id: VideoId,
        kind: JobKind,
    },
    JobStarted {
        job_id: JobId,
        video_id: VideoId,
        kind: JobKind,
    },
    JobCompleted {
        job_id: JobId,
        video_id: VideoId,
        kind: JobKind,
    },
    JobFailed {
        job_id: JobId,
        video_id: VideoId,
        kind: JobKind,
        error: String,
    },
    /// Dependents of a failed job that will never run.
    JobsCancelled {
        failed_job_id: JobId,
        count: usize,
    },

    // -- Video lifecycle -----------------------------------------------------
    DurationProbed {
        video_id: VideoId,
        duration_secs: f64,
    },
    TierTranscoded {
        video_id: VideoId,
        height: u32,
        index: usize,
        total: usize,
    },
    VideoTranscoded {
        video_id: VideoId,
    },
    VideoCleanedUp {
        video_id: VideoId,
    },
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A timestamped event ready for broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub payload: EventPayload,
}

impl Event {
    /// Create a new event with a fresh UUID and the current timestamp.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Broadcast channel with a bounded ring buffer of recent events.
pub struct EventBus {
    tx: broadcast::Sender<Event>,
    recent: RwLock<VecDeque<Event>>,
}

impl EventBus {
    /// Create a new event bus.
    ///
    /// `capacity` controls the broadcast channel buffer size (not the ring
    /// buffer, which is always [`MAX_RECENT_EVENTS`]).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            recent: RwLock::new(VecDeque::with_capacity(MAX_RECENT_EVENTS)),
        }
    }

    /// Subscribe to the broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Broadcast an event to all current subscribers and store it in the
    /// ring buffer.
    pub fn broadcast(&self, payload: EventPayload) {
        let event = Event::new(payload);

        {
            let mut recent = self.recent.write();
            if recent.len() >= MAX_RECENT_EVENTS {
                recent.pop_back();
            }
            recent.push_front(event.clone());
        }

        // Ignore send errors (no subscribers).
        let _ = self.tx.send(event);
    }

    /// Return the `n` most recent events (newest first).
    pub fn recent_events(&self, n: usize) -> Vec<Event> {
        let recent = self.recent.read();
        recent.iter().take(n).cloned().collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        let job_id = JobId::new();
        bus.broadcast(EventPayload::JobQueued {
            job_id,
            video_id: VideoId::new(1),
            kind: JobKind::Probe,
        });

        let event = rx.try_recv().unwrap();
        match &event.payload {
            EventPayload::JobQueued { job_id: received, kind, .. } => {
                assert_eq!(*received, job_id);
                assert_eq!(*kind, JobKind::Probe);
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn recent_events_capped() {
        let bus = EventBus::new(256);
        for i in 0..150 {
            bus.broadcast(EventPayload::VideoTranscoded {
                video_id: VideoId::new(i),
            });
        }
        assert_eq!(bus.recent_events(200).len(), MAX_RECENT_EVENTS);
    }

    #[test]
    fn recent_events_newest_first() {
        let bus = EventBus::new(16);
        bus.broadcast(EventPayload::VideoTranscoded {
            video_id: VideoId::new(1),
        });
        bus.broadcast(EventPayload::VideoCleanedUp {
            video_id: VideoId::new(1),
        });

        let recent = bus.recent_events(1);
        assert_eq!(recent.len(), 1);
        assert!(matches!(recent[0].payload, EventPayload::VideoCleanedUp { .. }));
    }

    #[test]
    fn no_subscribers_does_not_panic() {
        let bus = EventBus::new(4);
        bus.broadcast(EventPayload::JobFailed {
            job_id: JobId::new(),
            video_id: VideoId::new(2),
            kind: JobKind::Transcode,
            error: "test".into(),
        });
    }

    #[test]
    fn payload_serializes_with_type_tag() {
        let json = serde_json::to_string(&EventPayload::TierTranscoded {
            video_id: VideoId::new(7),
            height: 720,
            index: 2,
            total: 4,
        })
        .unwrap();
        assert!(json.contains(r#""type":"tier_transcoded""#));
        assert!(json.contains(r#""video_id":7"#));
    }
}
