use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use super::{
    TODOS_ROOM,
    message::{Notification, ServerMessage, TodoEventPayload},
    rooms::Rooms,
};
use crate::events::{TodoEvent, TodoMutation};

/// Bridge relay events into room multicasts until the relay closes. A lagged
/// subscription drops the missed events and keeps going.
pub async fn run(receiver: broadcast::Receiver<TodoEvent>, rooms: Rooms) {
    let mut stream = BroadcastStream::new(receiver);
    while let Some(item) = stream.next().await {
        match item {
            Ok(event) => dispatch(event, &rooms),
            Err(error) => {
                tracing::warn!(?error, "todo event stream lagged");
            }
        }
    }
    tracing::debug!("todo event fanout exiting");
}

pub(crate) fn dispatch(event: TodoEvent, rooms: &Rooms) {
    match event.mutation {
        TodoMutation::Created { todo } => {
            let message = format!(
                "Todo \"{}\" was created",
                todo.title.as_deref().unwrap_or_default()
            );
            let reached = rooms.broadcast(
                TODOS_ROOM,
                &ServerMessage::TodoCreated(TodoEventPayload {
                    id: todo.id,
                    action: "created",
                    timestamp: event.occurred_at,
                    message,
                    todo,
                }),
            );
            tracing::debug!(reached, "emitted todoCreated");
        }
        TodoMutation::Updated { todo } => {
            let message = format!(
                "Todo \"{}\" was updated",
                todo.title.as_deref().unwrap_or_default()
            );
            let reached = rooms.broadcast(
                TODOS_ROOM,
                &ServerMessage::TodoUpdated(TodoEventPayload {
                    id: todo.id,
                    action: "updated",
                    timestamp: event.occurred_at,
                    message,
                    todo,
                }),
            );
            tracing::debug!(reached, "emitted todoUpdated");
        }
        TodoMutation::Deleted { id, title } => {
            rooms.broadcast(TODOS_ROOM, &ServerMessage::TodoDeleted { id, deleted_id: id });

            let label = title.unwrap_or_else(|| id.to_string());
            rooms.broadcast(
                TODOS_ROOM,
                &ServerMessage::Notification(Notification::info(format!(
                    "Todo \"{label}\" was deleted"
                ))),
            );
        }
        TodoMutation::BulkDeleted { ids, count } => {
            rooms.broadcast(
                TODOS_ROOM,
                &ServerMessage::TodoBulkDeleted {
                    ids,
                    deleted_count: count,
                },
            );
            rooms.broadcast(
                TODOS_ROOM,
                &ServerMessage::Notification(Notification::info(format!(
                    "{count} todos were deleted"
                ))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use tokio::sync::mpsc;
    use uuid::Uuid;

    use super::*;
    use crate::{
        db::todos::{Status, Todo},
        events::EventRelay,
    };

    fn sample_todo(id: i64, title: &str) -> Todo {
        Todo {
            id,
            title: Some(title.to_string()),
            assignee: String::new(),
            due_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            time_tracked: 0,
            status: Status::Pending,
            priority: None,
            task_type: None,
            estimated_sp: None,
            actual_sp: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn room_members_receive_one_broadcast_per_create_in_order() {
        let relay = EventRelay::new(16);
        let rooms = Rooms::default();
        let member = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();
        rooms.join(TODOS_ROOM, member, tx);

        let fanout = tokio::spawn(run(relay.subscribe(), rooms));

        for id in 1..=3 {
            relay.publish(TodoMutation::Created {
                todo: sample_todo(id, "t"),
            });
        }

        for expected in 1..=3 {
            let message = rx.recv().await.unwrap();
            match message {
                ServerMessage::TodoCreated(payload) => assert_eq!(payload.id, expected),
                other => panic!("unexpected message: {other:?}"),
            }
        }

        fanout.abort();
    }

    #[tokio::test]
    async fn connections_outside_the_room_receive_nothing() {
        let rooms = Rooms::default();
        let outsider = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();
        rooms.join(TODOS_ROOM, outsider, tx);
        rooms.leave(TODOS_ROOM, outsider);

        let relay = EventRelay::new(16);
        let receiver = relay.subscribe();
        relay.publish(TodoMutation::Created {
            todo: sample_todo(1, "t"),
        });
        drop(relay);

        run(receiver, rooms).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn delete_emits_typed_message_and_info_notification() {
        let rooms = Rooms::default();
        let member = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();
        rooms.join(TODOS_ROOM, member, tx);

        dispatch(
            TodoEvent {
                mutation: TodoMutation::Deleted {
                    id: 4,
                    title: Some("Ship v1".to_string()),
                },
                occurred_at: Utc::now(),
            },
            &rooms,
        );

        match rx.try_recv().unwrap() {
            ServerMessage::TodoDeleted { id, deleted_id } => {
                assert_eq!(id, 4);
                assert_eq!(deleted_id, 4);
            }
            other => panic!("unexpected message: {other:?}"),
        }
        match rx.try_recv().unwrap() {
            ServerMessage::Notification(notification) => {
                assert_eq!(notification.message, "Todo \"Ship v1\" was deleted");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn bulk_delete_reports_ids_and_count() {
        let rooms = Rooms::default();
        let member = Uuid::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();
        rooms.join(TODOS_ROOM, member, tx);

        dispatch(
            TodoEvent {
                mutation: TodoMutation::BulkDeleted {
                    ids: vec![1, 2, 3],
                    count: 2,
                },
                occurred_at: Utc::now(),
            },
            &rooms,
        );

        match rx.try_recv().unwrap() {
            ServerMessage::TodoBulkDeleted { ids, deleted_count } => {
                assert_eq!(ids, vec![1, 2, 3]);
                assert_eq!(deleted_count, 2);
            }
            other => panic!("unexpected message: {other:?}"),
        }
        match rx.try_recv().unwrap() {
            ServerMessage::Notification(notification) => {
                assert_eq!(notification.message, "2 todos were deleted");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
