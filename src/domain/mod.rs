//! Domain rules shared by the trip-planning services.
//!
//! `access` holds the ownership check applied to every Place, Way, Route and
//! Notification request; `events` holds the notification hook and the events
//! carried on the bus.

pub mod access;
pub mod events;

pub use access::{AccessError, InWay, Owned, WayChild, authorize};
pub use events::{EventBusHook, NotificationHook, TripEvent};
