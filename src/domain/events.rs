//! Notification lifecycle hook and the events it publishes.
//!
//! Services call the hook after a notification is persisted or removed. The
//! default hook forwards to the event bus, which the reminder scheduler
//! listens on.

use tokio::sync::broadcast;
use tracing::debug;

use crate::models::Notification;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TripEvent {
    NotificationScheduled(Notification),
    NotificationCancelled {
        notification_id: i32,
    },
    ReminderDue {
        notification_id: i32,
        way_id: i32,
        user_id: i32,
        way_name: String,
    },
}

/// Receives notification lifecycle callbacks after the store commits.
pub trait NotificationHook: Send + Sync {
    fn on_notification_created(&self, notification: &Notification);

    fn on_notification_deleted(&self, notification_id: i32);
}

/// Publishes notification lifecycle changes on the event bus.
#[derive(Clone)]
pub struct EventBusHook {
    event_bus: broadcast::Sender<TripEvent>,
}

impl EventBusHook {
    #[must_use]
    pub const fn new(event_bus: broadcast::Sender<TripEvent>) -> Self {
        Self { event_bus }
    }
}

impl NotificationHook for EventBusHook {
    fn on_notification_created(&self, notification: &Notification) {
        // No receivers just means the scheduler is disabled.
        if self
            .event_bus
            .send(TripEvent::NotificationScheduled(notification.clone()))
            .is_err()
        {
            debug!(notification_id = notification.id, "No listeners for scheduled notification");
        }
    }

    fn on_notification_deleted(&self, notification_id: i32) {
        if self
            .event_bus
            .send(TripEvent::NotificationCancelled { notification_id })
            .is_err()
        {
            debug!(notification_id, "No listeners for cancelled notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn bus_hook_publishes_lifecycle_events() {
        let (tx, mut rx) = broadcast::channel(8);
        let hook = EventBusHook::new(tx);

        let notification = Notification {
            id: 1,
            way_id: 2,
            start_time: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_time: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            week_day: 0,
            time: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
        };

        hook.on_notification_created(&notification);
        hook.on_notification_deleted(1);

        assert_eq!(
            rx.try_recv().unwrap(),
            TripEvent::NotificationScheduled(notification)
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            TripEvent::NotificationCancelled { notification_id: 1 }
        );
    }

    #[test]
    fn bus_hook_without_listeners_does_not_panic() {
        let (tx, rx) = broadcast::channel::<TripEvent>(1);
        drop(rx);
        EventBusHook::new(tx).on_notification_deleted(5);
    }
}
