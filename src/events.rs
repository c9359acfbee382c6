use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::db::todos::Todo;

/// A committed task-store mutation. Events are transient: they exist only for
/// the duration of relay-to-gateway delivery and are never persisted.
#[derive(Debug, Clone)]
pub enum TodoMutation {
    Created { todo: Todo },
    Updated { todo: Todo },
    Deleted { id: i64, title: Option<String> },
    BulkDeleted { ids: Vec<i64>, count: u64 },
}

#[derive(Debug, Clone)]
pub struct TodoEvent {
    pub mutation: TodoMutation,
    pub occurred_at: DateTime<Utc>,
}

/// Process-wide publish point decoupling the task store from the broadcast
/// gateway. Publishing never blocks the mutating caller; subscribers that lag
/// past the channel capacity drop events instead of exerting backpressure.
#[derive(Clone)]
pub struct EventRelay {
    sender: broadcast::Sender<TodoEvent>,
}

impl EventRelay {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TodoEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, mutation: TodoMutation) {
        let event = TodoEvent {
            mutation,
            occurred_at: Utc::now(),
        };
        if let Err(error) = self.sender.send(event) {
            tracing::debug!(?error, "no subscribers for todo event");
        }
    }
}

impl Default for EventRelay {
    fn default() -> Self {
        Self::new(1024)
    }
}
