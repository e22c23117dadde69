use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use tokio::task;
use tracing::{error, warn};

use super::{Deletion, settle, settle_flag};
use crate::config::SecurityConfig;
use crate::entities::{notifications, places, prelude::*, routes, user_profiles, users, ways};
use crate::models::User;

/// Fields for a new account row; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: String,
    pub activation_token: Option<String>,
    pub is_active: bool,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts the user together with an empty profile. `None` on any
    /// constraint violation (e.g. the email is taken).
    pub async fn create(&self, user: NewUser<'_>) -> Option<User> {
        settle(self.try_create(user).await, "create user")
    }

    async fn try_create(&self, user: NewUser<'_>) -> Result<Option<User>, DbErr> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        let model = users::ActiveModel {
            email: Set(user.email.to_string()),
            password_hash: Set(user.password_hash),
            api_key: Set(generate_api_key()),
            is_active: Set(user.is_active),
            activation_token: Set(user.activation_token),
            phone_number: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        user_profiles::ActiveModel {
            user_id: Set(model.id),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            telegram_id: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        Ok(Some(User::from(model)))
    }

    /// Get user by email
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Returns the user if `password` matches the stored hash.
    /// Note: Argon2 is CPU-bound, so verification runs on the blocking pool.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            Ok::<bool, anyhow::Error>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid.then(|| User::from(user)))
    }

    /// Verify API key and return the associated user
    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::ApiKey.eq(api_key))
            .one(&self.conn)
            .await
            .context("Failed to query user by API key")?;

        Ok(user.map(User::from))
    }

    /// Activates the account holding `token` and consumes the token.
    pub async fn activate(&self, token: &str) -> bool {
        settle_flag(self.try_activate(token).await, "activate user")
    }

    async fn try_activate(&self, token: &str) -> Result<bool, DbErr> {
        let Some(user) = Users::find()
            .filter(users::Column::ActivationToken.eq(token))
            .one(&self.conn)
            .await?
        else {
            return Ok(false);
        };

        let mut active: users::ActiveModel = user.into();
        active.is_active = Set(true);
        active.activation_token = Set(None);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(true)
    }

    pub async fn update_phone(&self, id: i32, phone_number: &str) -> bool {
        settle_flag(
            self.try_update_phone(id, phone_number).await,
            "update phone number",
        )
    }

    async fn try_update_phone(&self, id: i32, phone_number: &str) -> Result<bool, DbErr> {
        let Some(user) = Users::find_by_id(id).one(&self.conn).await? else {
            return Ok(false);
        };

        let mut active: users::ActiveModel = user.into();
        active.phone_number = Set(Some(phone_number.to_string()));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;

        Ok(true)
    }

    /// Removes the account and everything it owns in one transaction.
    pub async fn delete(&self, id: i32) -> Deletion {
        match self.try_delete(id).await {
            Ok(deletion) => deletion,
            Err(e) => {
                error!(user_id = id, error = %e, "Unsuccessful account deletion");
                Deletion::missing()
            }
        }
    }

    async fn try_delete(&self, id: i32) -> Result<Deletion, DbErr> {
        let txn = self.conn.begin().await?;

        let way_ids: Vec<i32> = Ways::find()
            .select_only()
            .column(ways::Column::Id)
            .filter(ways::Column::OwnerId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;
        let place_ids: Vec<i32> = Places::find()
            .select_only()
            .column(places::Column::Id)
            .filter(places::Column::OwnerId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;
        let notification_ids: Vec<i32> = Notifications::find()
            .select_only()
            .column(notifications::Column::Id)
            .filter(notifications::Column::WayId.is_in(way_ids.clone()))
            .into_tuple()
            .all(&txn)
            .await?;

        Notifications::delete_many()
            .filter(notifications::Column::WayId.is_in(way_ids.clone()))
            .exec(&txn)
            .await?;
        Routes::delete_many()
            .filter(
                routes::Column::WayId
                    .is_in(way_ids)
                    .or(routes::Column::StartPlaceId.is_in(place_ids.clone()))
                    .or(routes::Column::EndPlaceId.is_in(place_ids)),
            )
            .exec(&txn)
            .await?;
        Ways::delete_many()
            .filter(ways::Column::OwnerId.eq(id))
            .exec(&txn)
            .await?;
        Places::delete_many()
            .filter(places::Column::OwnerId.eq(id))
            .exec(&txn)
            .await?;
        UserProfiles::delete_many()
            .filter(user_profiles::Column::UserId.eq(id))
            .exec(&txn)
            .await?;

        let result = Users::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            warn!(user_id = id, "Account deletion for unknown user");
            return Ok(Deletion::missing());
        }

        txn.commit().await?;
        Ok(Deletion {
            removed: true,
            notification_ids,
        })
    }
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the crate's default params.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None,
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Random 64 character hex string.
fn random_hex() -> String {
    use rand::Rng;

    let bytes: [u8; 32] = rand::rng().random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[must_use]
pub fn generate_api_key() -> String {
    random_hex()
}

#[must_use]
pub fn generate_activation_token() -> String {
    random_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_64_hex_chars_and_distinct() {
        let a = generate_activation_token();
        let b = generate_activation_token();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn hash_password_honours_security_params() {
        let config = SecurityConfig {
            argon2_memory_cost_kib: 8,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        };

        let hash = hash_password("correct horse", Some(&config)).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("m=8,t=1,p=1"));
    }
}
