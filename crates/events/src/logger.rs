//! Event logging subscriber.
//!
//! [`EventLogger`] drains a bus receiver and writes one structured log line
//! per envelope. It runs as a long-lived background task and stops once
//! the bus is dropped.

use tokio::sync::broadcast;

use crate::bus::{DomainEvent, Envelope};

pub struct EventLogger;

impl EventLogger {
    /// Run until the channel closes. Returns the number of events logged.
    pub async fn run(mut receiver: broadcast::Receiver<Envelope>) -> u64 {
        let mut logged = 0;
        loop {
            match receiver.recv().await {
                Ok(envelope) => {
                    Self::log(&envelope);
                    logged += 1;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event logger lagged, some events were not logged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!(logged, "Event bus closed, event logger shutting down");
                    break;
                }
            }
        }
        logged
    }

    fn log(envelope: &Envelope) {
        let sequence = envelope.sequence;
        let event = envelope.event.name();
        match &envelope.event {
            DomainEvent::UserCreated { user_id, username } => {
                tracing::info!(sequence, event, user_id, "User with username {username} has been created");
            }
            DomainEvent::TimesheetBatchCreated {
                user_id,
                work_date,
                timesheet_ids,
            } => {
                tracing::info!(
                    sequence,
                    event,
                    user_id,
                    %work_date,
                    count = timesheet_ids.len(),
                    "Timesheets created"
                );
            }
            DomainEvent::TimesheetBatchUpdated {
                user_id,
                start,
                end,
                timesheet_ids,
            } => {
                tracing::info!(
                    sequence,
                    event,
                    user_id,
                    %start,
                    %end,
                    ids = ?timesheet_ids,
                    "Timesheets revised"
                );
            }
            DomainEvent::TimesheetDeleted { timesheet_id, user_id } => {
                tracing::info!(sequence, event, user_id, timesheet_id, "Timesheet deleted");
            }
        }
    }
}
