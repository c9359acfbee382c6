use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::todos::Todo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientMessage {
    JoinTodoRoom,
    LeaveTodoRoom,
    Ping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    fn new(message: impl Into<String>, kind: NotificationKind) -> Self {
        Self {
            message: message.into(),
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Success)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationKind::Info)
    }
}

/// Payload for the created/updated multicasts: the full record plus an action
/// tag and the server timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct TodoEventPayload {
    pub id: i64,
    pub todo: Todo,
    pub action: &'static str,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    TodoCreated(TodoEventPayload),
    TodoUpdated(TodoEventPayload),
    TodoDeleted { id: i64, deleted_id: i64 },
    TodoBulkDeleted { ids: Vec<i64>, deleted_count: u64 },
    Notification(Notification),
}
