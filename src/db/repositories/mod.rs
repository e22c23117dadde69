pub mod notification;
pub mod place;
pub mod profile;
pub mod route;
pub mod user;
pub mod way;

use sea_orm::DbErr;
use tracing::error;

/// Outcome of a delete that may cascade into scheduled notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deletion {
    /// True iff the target row existed and was removed.
    pub removed: bool,
    /// Notifications removed along with the target.
    pub notification_ids: Vec<i32>,
}

impl Deletion {
    #[must_use]
    pub const fn missing() -> Self {
        Self {
            removed: false,
            notification_ids: Vec::new(),
        }
    }
}

/// Collapses a failed write into `None`, logging the cause.
pub(crate) fn settle<T>(result: Result<Option<T>, DbErr>, action: &'static str) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            error!(action, error = %e, "Unsuccessful write");
            None
        }
    }
}

/// Like [`settle`], for writes that only report success.
pub(crate) fn settle_flag(result: Result<bool, DbErr>, action: &'static str) -> bool {
    match result {
        Ok(done) => done,
        Err(e) => {
            error!(action, error = %e, "Unsuccessful write");
            false
        }
    }
}
