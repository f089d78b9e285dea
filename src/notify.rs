use serde::Serialize;
use sqlx::types::Uuid;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Outbound notification vocabulary. Delivery (email, push) lives outside
/// this service; events are fanned out on a broadcast channel that the
/// WebSocket route and any in-process listener can subscribe to.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SchedulingEvent {
    SessionsGenerated {
        template_id: Uuid,
        created: usize,
        skipped: usize,
    },
    EnrollmentCreated {
        enrollment_id: Uuid,
        training_session_id: Uuid,
        tutor_id: Uuid,
        pet_id: Uuid,
    },
    EnrollmentConfirmed {
        enrollment_id: Uuid,
        training_session_id: Uuid,
    },
    EnrollmentCancelled {
        enrollment_id: Uuid,
        training_session_id: Uuid,
        reason: Option<String>,
    },
}

/// Fire-and-forget dispatcher. Losing an event (no subscribers, lagging
/// receiver) never affects the transaction that produced it.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<String>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn dispatch(&self, event: SchedulingEvent) {
        info!(?event, "Dispatching scheduling event");
        match serde_json::to_string(&event) {
            Ok(payload) => {
                // Err here only means nobody is listening right now.
                if self.tx.send(payload).is_err() {
                    debug!("No notification subscribers connected");
                }
            }
            Err(err) => debug!("Failed to serialize scheduling event: {err}"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(256)
    }
}
