//! Post-commit event fan-out.
//!
//! Services publish a [`DomainEvent`] only after their store commit
//! succeeded. The bus stamps each one into an [`Envelope`] with a
//! monotonically increasing sequence number and the publish time, then hands
//! it to every live receiver. Receivers that fall more than the channel
//! capacity behind lose the oldest envelopes and see `RecvError::Lagged`.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use timekeep_core::types::{DbId, WorkDate};
use tokio::sync::broadcast;

/// Channel capacity used by [`EventBus::default`].
pub const DEFAULT_CAPACITY: usize = 1024;

/// A committed change to users or timesheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    UserCreated {
        user_id: DbId,
        username: String,
    },
    TimesheetBatchCreated {
        user_id: DbId,
        work_date: WorkDate,
        /// Ids assigned by the store, in request order.
        timesheet_ids: Vec<DbId>,
    },
    TimesheetBatchUpdated {
        user_id: DbId,
        start: WorkDate,
        end: WorkDate,
        /// Only the entries a request row revised.
        timesheet_ids: Vec<DbId>,
    },
    TimesheetDeleted {
        timesheet_id: DbId,
        user_id: DbId,
    },
}

impl DomainEvent {
    /// Dotted name used in logs, e.g. `timesheet.batch_created`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserCreated { .. } => "user.created",
            Self::TimesheetBatchCreated { .. } => "timesheet.batch_created",
            Self::TimesheetBatchUpdated { .. } => "timesheet.batch_updated",
            Self::TimesheetDeleted { .. } => "timesheet.deleted",
        }
    }

    /// The user whose data changed.
    pub fn user_id(&self) -> DbId {
        match self {
            Self::UserCreated { user_id, .. }
            | Self::TimesheetBatchCreated { user_id, .. }
            | Self::TimesheetBatchUpdated { user_id, .. }
            | Self::TimesheetDeleted { user_id, .. } => *user_id,
        }
    }
}

/// What receivers get: the event plus bus-assigned ordering metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    /// Starts at 1 and increases by one per publish on this bus.
    pub sequence: u64,
    pub published_at: DateTime<Utc>,
    pub event: DomainEvent,
}

/// Fan-out hub shared as `Arc<EventBus>` by the services.
pub struct EventBus {
    sender: broadcast::Sender<Envelope>,
    sequence: AtomicU64,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            sequence: AtomicU64::new(0),
        }
    }

    /// Stamp and broadcast `event`, returning how many receivers got it.
    ///
    /// Publishing with nobody listening is normal and returns 0.
    pub fn publish(&self, event: DomainEvent) -> usize {
        let envelope = Envelope {
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed) + 1,
            published_at: Utc::now(),
            event,
        };
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Receive every envelope published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_created(ids: Vec<DbId>) -> DomainEvent {
        DomainEvent::TimesheetBatchCreated {
            user_id: 7,
            work_date: "2024-07-01".parse().unwrap(),
            timesheet_ids: ids,
        }
    }

    #[tokio::test]
    async fn envelopes_are_numbered_in_publish_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(batch_created(vec![1, 2]));
        bus.publish(DomainEvent::TimesheetDeleted {
            timesheet_id: 2,
            user_id: 7,
        });

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!((first.sequence, second.sequence), (1, 2));
        assert_eq!(first.event, batch_created(vec![1, 2]));
        assert!(first.published_at <= second.published_at);
    }

    #[tokio::test]
    async fn every_receiver_sees_the_event() {
        let bus = EventBus::default();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        let event = DomainEvent::UserCreated {
            user_id: 5,
            username: "grace".into(),
        };
        assert_eq!(bus.publish(event.clone()), 2);

        assert_eq!(a.recv().await.unwrap().event, event);
        assert_eq!(b.recv().await.unwrap().event, event);
    }

    #[test]
    fn publish_without_receivers_still_advances_sequence() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(batch_created(vec![])), 0);

        let mut rx = bus.subscribe();
        bus.publish(batch_created(vec![3]));
        assert_eq!(rx.try_recv().unwrap().sequence, 2);
    }

    #[test]
    fn name_and_user_follow_the_variant() {
        let event = DomainEvent::TimesheetBatchUpdated {
            user_id: 3,
            start: "2024-06-01".parse().unwrap(),
            end: "2024-06-30".parse().unwrap(),
            timesheet_ids: vec![10],
        };
        assert_eq!(event.name(), "timesheet.batch_updated");
        assert_eq!(event.user_id(), 3);
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(DomainEvent::TimesheetDeleted {
            timesheet_id: 4,
            user_id: 1,
        })
        .unwrap();
        assert_eq!(json["type"], "timesheet_deleted");
        assert_eq!(json["timesheet_id"], 4);
    }
}
