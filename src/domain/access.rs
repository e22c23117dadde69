//! Ownership-scoped access control.

use thiserror::Error;

use crate::models::Way;

/// Anything that belongs to exactly one user.
pub trait Owned {
    /// Name used in error messages ("Place", "Way", ...).
    const KIND: &'static str;

    fn owner_id(&self) -> i32;
}

/// Records owned through their parent way (routes and notifications).
pub trait WayChild {
    const KIND: &'static str;
}

/// A way-scoped record paired with the way it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct InWay<T> {
    pub item: T,
    pub way: Way,
}

impl<T: WayChild> Owned for InWay<T> {
    const KIND: &'static str = T::KIND;

    fn owner_id(&self) -> i32 {
        self.way.owner_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("{kind} with id={id} does not exist")]
    NotFound { kind: &'static str, id: i32 },

    #[error("{kind} with id={id} belongs to another user")]
    Forbidden { kind: &'static str, id: i32 },
}

/// Returns the entity if it exists and `caller` owns it.
pub fn authorize<T: Owned>(id: i32, entity: Option<T>, caller: i32) -> Result<T, AccessError> {
    let Some(entity) = entity else {
        return Err(AccessError::NotFound { kind: T::KIND, id });
    };

    if entity.owner_id() != caller {
        return Err(AccessError::Forbidden { kind: T::KIND, id });
    }

    Ok(entity)
}
