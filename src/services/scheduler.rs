//! Keeps one weekly cron job per stored notification.
//!
//! Jobs are registered for every notification at startup and then kept in
//! sync with the event bus. A firing job reloads its notification and emits
//! [`TripEvent::ReminderDue`] while the validity window is open; once the
//! window has passed the job removes itself.

use anyhow::Result;
use chrono::{NaiveDate, Timelike, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::db::Store;
use crate::domain::TripEvent;
use crate::models::Notification;

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Weekly cron expression (`sec min hour dom month dow`, UTC) for a notification.
#[must_use]
pub fn cron_expression(notification: &Notification) -> Option<String> {
    let day = usize::try_from(notification.week_day)
        .ok()
        .and_then(|d| DAY_NAMES.get(d))?;
    let time = notification.time;

    Some(format!(
        "{} {} {} * * {}",
        time.second(),
        time.minute(),
        time.hour(),
        day
    ))
}

/// What a firing job found when it reloaded its notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderCheck {
    Due(TripEvent),
    NotStarted,
    Expired,
    Missing,
}

pub async fn check_reminder(
    store: &Store,
    notification_id: i32,
    today: NaiveDate,
) -> Result<ReminderCheck> {
    let Some(notification) = store.get_notification(notification_id).await? else {
        return Ok(ReminderCheck::Missing);
    };

    if notification.has_expired(today) {
        return Ok(ReminderCheck::Expired);
    }
    if !notification.is_active_on(today) {
        return Ok(ReminderCheck::NotStarted);
    }

    let Some(way) = store.get_way_by_notification(notification_id).await? else {
        return Ok(ReminderCheck::Missing);
    };

    Ok(ReminderCheck::Due(TripEvent::ReminderDue {
        notification_id,
        way_id: way.id,
        user_id: way.owner_id,
        way_name: way.name,
    }))
}

pub struct ReminderScheduler {
    store: Store,
    event_bus: broadcast::Sender<TripEvent>,
    sched: JobScheduler,
    jobs: Arc<Mutex<HashMap<i32, Uuid>>>,
}

impl ReminderScheduler {
    pub async fn new(store: Store, event_bus: broadcast::Sender<TripEvent>) -> Result<Self> {
        Ok(Self {
            store,
            event_bus,
            sched: JobScheduler::new().await?,
            jobs: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Registers jobs for all stored notifications, starts the cron loop and
    /// follows notification events on the bus.
    pub async fn start(self: Arc<Self>) -> Result<()> {
        // Subscribe before loading so nothing created meanwhile is missed.
        let rx = self.event_bus.subscribe();

        let notifications = self.store.list_all_notifications().await?;
        let total = notifications.len();
        for notification in &notifications {
            if let Err(e) = self.schedule(notification).await {
                error!(notification_id = notification.id, error = %e, "Failed to schedule reminder");
            }
        }

        self.sched.start().await?;
        info!(count = total, "Reminder scheduler started");

        self.start_listener(rx);
        Ok(())
    }

    fn start_listener(self: Arc<Self>, mut rx: broadcast::Receiver<TripEvent>) {
        let scheduler = self;

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if let Err(e) = scheduler.handle_event(event).await {
                            error!(error = %e, "Failed to apply notification event");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        warn!(count, "Reminder listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Reminder listener event bus closed");
                        break;
                    }
                }
            }
        });
    }

    async fn handle_event(&self, event: TripEvent) -> Result<()> {
        match event {
            TripEvent::NotificationScheduled(notification) => self.schedule(&notification).await,
            TripEvent::NotificationCancelled { notification_id } => {
                self.unschedule(notification_id).await
            }
            TripEvent::ReminderDue { .. } => Ok(()),
        }
    }

    /// Replaces any existing job for the notification.
    pub async fn schedule(&self, notification: &Notification) -> Result<()> {
        self.unschedule(notification.id).await?;

        let Some(cron) = cron_expression(notification) else {
            warn!(
                notification_id = notification.id,
                week_day = notification.week_day,
                "Skipping reminder with invalid week day"
            );
            return Ok(());
        };

        let notification_id = notification.id;
        let store = self.store.clone();
        let event_bus = self.event_bus.clone();
        let jobs = Arc::clone(&self.jobs);

        let job = Job::new_async(cron.as_str(), move |job_id, sched| {
            let store = store.clone();
            let event_bus = event_bus.clone();
            let jobs = Arc::clone(&jobs);
            Box::pin(async move {
                let today = Utc::now().date_naive();
                match check_reminder(&store, notification_id, today).await {
                    Ok(ReminderCheck::Due(event)) => {
                        info!(
                            event = "reminder_due",
                            notification_id,
                            "Reminder due"
                        );
                        if event_bus.send(event).is_err() {
                            debug!(notification_id, "No listeners for due reminder");
                        }
                    }
                    Ok(ReminderCheck::NotStarted) => {
                        debug!(notification_id, "Reminder window not open yet");
                    }
                    Ok(ReminderCheck::Expired | ReminderCheck::Missing) => {
                        info!(notification_id, "Reminder window closed, removing job");
                        jobs.lock().await.remove(&notification_id);
                        if let Err(e) = sched.remove(&job_id).await {
                            error!(notification_id, error = %e, "Failed to remove reminder job");
                        }
                    }
                    Err(e) => {
                        error!(notification_id, error = %e, "Reminder check failed");
                    }
                }
            })
        })?;

        let job_id = self.sched.add(job).await?;
        self.jobs.lock().await.insert(notification_id, job_id);

        debug!(notification_id, cron = %cron, "Reminder scheduled");
        Ok(())
    }

    pub async fn unschedule(&self, notification_id: i32) -> Result<()> {
        let job_id = self.jobs.lock().await.remove(&notification_id);
        if let Some(job_id) = job_id {
            self.sched.remove(&job_id).await?;
            debug!(notification_id, "Reminder unscheduled");
        }
        Ok(())
    }

    /// Number of notifications with a registered job.
    pub async fn job_count(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn shutdown(&self) -> Result<()> {
        let mut sched = self.sched.clone();
        sched.shutdown().await?;
        info!("Reminder scheduler stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, test_store};
    use crate::models::NewNotification;
    use chrono::NaiveTime;

    fn notification(week_day: i32, time: NaiveTime) -> Notification {
        Notification {
            id: 1,
            way_id: 1,
            start_time: NaiveDate::from_ymd_opt(2019, 10, 29).unwrap(),
            end_time: NaiveDate::from_ymd_opt(2019, 12, 29).unwrap(),
            week_day,
            time,
        }
    }

    #[test]
    fn cron_expression_uses_weekday_names() {
        let n = notification(6, NaiveTime::from_hms_opt(23, 58, 59).unwrap());
        assert_eq!(cron_expression(&n).as_deref(), Some("59 58 23 * * Sun"));

        let n = notification(0, NaiveTime::from_hms_opt(7, 5, 0).unwrap());
        assert_eq!(cron_expression(&n).as_deref(), Some("0 5 7 * * Mon"));

        assert_eq!(cron_expression(&notification(7, NaiveTime::MIN)), None);
    }

    async fn stored_notification(store: &Store) -> (i32, i32, i32) {
        let user = store
            .create_user(NewUser {
                email: "mail@gmail.com",
                password_hash: "hash".to_string(),
                activation_token: None,
                is_active: true,
            })
            .await
            .unwrap();
        let way = store.create_way(user.id, "to work").await.unwrap();
        let created = store
            .create_notification(
                way.id,
                &NewNotification {
                    start_time: NaiveDate::from_ymd_opt(2019, 10, 29).unwrap(),
                    end_time: NaiveDate::from_ymd_opt(2019, 12, 29).unwrap(),
                    week_day: 1,
                    time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                },
            )
            .await
            .unwrap();
        (user.id, way.id, created.id)
    }

    #[tokio::test]
    async fn check_reminder_follows_validity_window() {
        let store = test_store().await;
        let (user_id, way_id, id) = stored_notification(&store).await;
        let day = |m, d| NaiveDate::from_ymd_opt(2019, m, d).unwrap();

        assert_eq!(
            check_reminder(&store, id, day(10, 1)).await.unwrap(),
            ReminderCheck::NotStarted
        );
        assert_eq!(
            check_reminder(&store, id, day(11, 5)).await.unwrap(),
            ReminderCheck::Due(TripEvent::ReminderDue {
                notification_id: id,
                way_id,
                user_id,
                way_name: "to work".to_string(),
            })
        );
        assert_eq!(
            check_reminder(&store, id, day(12, 30)).await.unwrap(),
            ReminderCheck::Expired
        );
        assert_eq!(
            check_reminder(&store, id + 1, day(11, 5)).await.unwrap(),
            ReminderCheck::Missing
        );
    }

    #[tokio::test]
    async fn events_keep_job_table_in_sync() {
        let store = test_store().await;
        let (_, _, id) = stored_notification(&store).await;
        let (tx, _) = broadcast::channel(16);
        let scheduler = ReminderScheduler::new(store.clone(), tx).await.unwrap();

        let stored = store.get_notification(id).await.unwrap().unwrap();
        scheduler
            .handle_event(TripEvent::NotificationScheduled(stored.clone()))
            .await
            .unwrap();
        assert_eq!(scheduler.job_count().await, 1);

        // Re-scheduling replaces the job instead of adding a second one.
        scheduler.schedule(&stored).await.unwrap();
        assert_eq!(scheduler.job_count().await, 1);

        scheduler
            .handle_event(TripEvent::NotificationCancelled {
                notification_id: id,
            })
            .await
            .unwrap();
        assert_eq!(scheduler.job_count().await, 0);
    }

    #[tokio::test]
    async fn start_registers_stored_notifications() {
        let store = test_store().await;
        stored_notification(&store).await;
        let (tx, _) = broadcast::channel(16);
        let scheduler = Arc::new(ReminderScheduler::new(store, tx).await.unwrap());

        Arc::clone(&scheduler).start().await.unwrap();
        assert_eq!(scheduler.job_count().await, 1);
        scheduler.shutdown().await.unwrap();
    }
}
