use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::Serialize;

use crate::domain::access::WayChild;
use crate::entities::notifications;

/// Recurring reminder window attached to a way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: i32,
    pub way_id: i32,
    pub start_time: NaiveDate,
    pub end_time: NaiveDate,
    pub week_day: i32,
    pub time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationDto {
    pub id: i32,
    pub way_id: i32,
    pub start_time: NaiveDate,
    pub end_time: NaiveDate,
    pub week_day: i32,
    pub time: NaiveTime,
}

impl Notification {
    #[must_use]
    pub fn to_dto(&self) -> NotificationDto {
        NotificationDto {
            id: self.id,
            way_id: self.way_id,
            start_time: self.start_time,
            end_time: self.end_time,
            week_day: self.week_day,
            time: self.time,
        }
    }

    /// Day of week this reminder fires on, `None` if `week_day` is out of range.
    #[must_use]
    pub fn weekday(&self) -> Option<Weekday> {
        u8::try_from(self.week_day)
            .ok()
            .and_then(|d| Weekday::try_from(d).ok())
    }

    #[must_use]
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_time <= date && date <= self.end_time
    }

    #[must_use]
    pub fn has_expired(&self, date: NaiveDate) -> bool {
        date > self.end_time
    }
}

impl From<notifications::Model> for Notification {
    fn from(model: notifications::Model) -> Self {
        Self {
            id: model.id,
            way_id: model.way_id,
            start_time: model.start_time,
            end_time: model.end_time,
            week_day: model.week_day,
            time: model.time,
        }
    }
}

impl WayChild for Notification {
    const KIND: &'static str = "Notification";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub start_time: NaiveDate,
    pub end_time: NaiveDate,
    pub week_day: i32,
    pub time: NaiveTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationChanges {
    pub start_time: Option<NaiveDate>,
    pub end_time: Option<NaiveDate>,
    pub week_day: Option<i32>,
    pub time: Option<NaiveTime>,
}

impl NotificationChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_time.is_none()
            && self.end_time.is_none()
            && self.week_day.is_none()
            && self.time.is_none()
    }
}
