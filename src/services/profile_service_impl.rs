//! `SeaORM` implementation of the `ProfileService` trait.

use async_trait::async_trait;

use crate::db::Store;
use crate::models::{ProfileChanges, UserProfile};
use crate::services::TripError;
use crate::services::profile_service::ProfileService;

const MAX_NAME_LEN: usize = 64;

pub struct SeaOrmProfileService {
    store: Store,
}

impl SeaOrmProfileService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn check_name(field: &str, value: &str) -> Result<(), TripError> {
    if value.chars().count() > MAX_NAME_LEN {
        return Err(TripError::validation(format!(
            "{field} must be {MAX_NAME_LEN} characters or less"
        )));
    }
    Ok(())
}

#[async_trait]
impl ProfileService for SeaOrmProfileService {
    async fn get(&self, user_id: i32) -> Result<UserProfile, TripError> {
        self.store
            .get_profile(user_id)
            .await?
            .ok_or_else(|| TripError::NotFound(format!("Profile of user {user_id} does not exist")))
    }

    async fn update(
        &self,
        user_id: i32,
        changes: ProfileChanges,
    ) -> Result<UserProfile, TripError> {
        if changes.is_empty() {
            return Err(TripError::validation("No fields to update"));
        }
        if let Some(first_name) = &changes.first_name {
            check_name("first_name", first_name)?;
        }
        if let Some(last_name) = &changes.last_name {
            check_name("last_name", last_name)?;
        }

        if !self.store.update_profile(user_id, &changes).await {
            return Err(TripError::Persistence("profile update"));
        }

        self.get(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, test_store};

    #[tokio::test]
    async fn update_applies_fields_and_validates_length() {
        let store = test_store().await;
        let user = store
            .create_user(NewUser {
                email: "mail@gmail.com",
                password_hash: "hash".to_string(),
                activation_token: None,
                is_active: true,
            })
            .await
            .unwrap();
        let service = SeaOrmProfileService::new(store);

        assert!(matches!(
            service
                .update(
                    user.id,
                    ProfileChanges {
                        first_name: Some("x".repeat(65)),
                        ..Default::default()
                    }
                )
                .await,
            Err(TripError::Validation(_))
        ));

        let profile = service
            .update(
                user.id,
                ProfileChanges {
                    last_name: Some("Shevchenko".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.last_name, "Shevchenko");
        assert_eq!(profile.user_id, user.id);

        let profile = service
            .update(
                user.id,
                ProfileChanges {
                    first_name: Some("x".repeat(64)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.first_name.len(), 64);
    }
}
