use serde::Serialize;

use crate::entities::{user_profiles, users};

/// User data returned from the store (without the password hash).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub api_key: String,
    pub is_active: bool,
    pub phone_number: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub phone_number: Option<String>,
    pub is_active: bool,
}

impl User {
    #[must_use]
    pub fn to_dto(&self) -> UserDto {
        UserDto {
            id: self.id,
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            is_active: self.is_active,
        }
    }
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            api_key: model.api_key,
            is_active: model.is_active,
            phone_number: model.phone_number,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i32,
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub telegram_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub user_id: i32,
    pub telegram_id: Option<i64>,
}

impl UserProfile {
    #[must_use]
    pub fn to_dto(&self) -> ProfileDto {
        ProfileDto {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            user_id: self.user_id,
            telegram_id: self.telegram_id,
        }
    }
}

impl From<user_profiles::Model> for UserProfile {
    fn from(model: user_profiles::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            first_name: model.first_name,
            last_name: model.last_name,
            telegram_id: model.telegram_id,
        }
    }
}

/// Partial profile update. `telegram_id: Some(None)` unlinks Telegram.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub telegram_id: Option<Option<i64>>,
}

impl ProfileChanges {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.telegram_id.is_none()
    }
}
