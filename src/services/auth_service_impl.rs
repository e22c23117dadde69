//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

use crate::config::SecurityConfig;
use crate::db::repositories::user::{generate_activation_token, hash_password};
use crate::db::{NewUser, Store};
use crate::domain::NotificationHook;
use crate::models::User;
use crate::services::auth_service::{AuthError, AuthService, Registration};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+380[0-9]{9}$").expect("valid phone regex"));

const MIN_PASSWORD_LEN: usize = 8;

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
    hook: Arc<dyn NotificationHook>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, security: SecurityConfig, hook: Arc<dyn NotificationHook>) -> Self {
        Self {
            store,
            security,
            hook,
        }
    }
}

pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if !EMAIL_RE.is_match(email) {
        return Err(AuthError::Validation(format!("Invalid email: {email}")));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_phone(phone_number: &str) -> Result<(), AuthError> {
    if !PHONE_RE.is_match(phone_number) {
        return Err(AuthError::Validation(
            "Phone number must look like +380XXXXXXXXX".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, email: &str, password: &str) -> Result<Registration, AuthError> {
        validate_email(email)?;
        validate_password(password)?;

        if self.store.get_user_by_email(email).await?.is_some() {
            return Err(AuthError::Validation(format!(
                "User with email {email} already exists"
            )));
        }

        let password = password.to_string();
        let security = self.security.clone();
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&password, Some(&security)))
                .await
                .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {e}")))??;

        let activation_token = generate_activation_token();
        let user = self
            .store
            .create_user(NewUser {
                email,
                password_hash,
                activation_token: Some(activation_token.clone()),
                is_active: false,
            })
            .await
            .ok_or_else(|| AuthError::Validation(format!("Could not register {email}")))?;

        info!(user_id = user.id, "User registered");
        // No mailer is wired in; the link is only logged.
        debug!(
            user_id = user.id,
            activation_path = %format!("/api/user/activate/{activation_token}"),
            "Activation link issued"
        );

        Ok(Registration {
            user,
            activation_token,
        })
    }

    async fn activate(&self, token: &str) -> Result<(), AuthError> {
        if !self.store.activate_user(token).await {
            return Err(AuthError::InvalidToken);
        }
        info!("User activated");
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .store
            .verify_user_password(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::Inactive);
        }

        Ok(user)
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>, AuthError> {
        let user = self.store.verify_api_key(api_key).await?;
        Ok(user.filter(|u| u.is_active))
    }

    async fn get_user(&self, user_id: i32) -> Result<User, AuthError> {
        self.store
            .get_user_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::UserNotFound)
    }

    async fn update_phone(&self, user_id: i32, phone_number: &str) -> Result<User, AuthError> {
        validate_phone(phone_number)?;

        if !self.store.update_user_phone(user_id, phone_number).await {
            return Err(AuthError::UserNotFound);
        }

        self.get_user(user_id).await
    }

    async fn delete_account(&self, user_id: i32) -> Result<(), AuthError> {
        let deletion = self.store.delete_user(user_id).await;
        if !deletion.removed {
            return Err(AuthError::UserNotFound);
        }

        for notification_id in deletion.notification_ids {
            self.hook.on_notification_deleted(notification_id);
        }

        info!(user_id, "Account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_store;
    use crate::models::{NewNotification, Notification};
    use chrono::{NaiveDate, NaiveTime};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingHook {
        deleted: Mutex<Vec<i32>>,
    }

    impl NotificationHook for RecordingHook {
        fn on_notification_created(&self, _notification: &Notification) {}

        fn on_notification_deleted(&self, notification_id: i32) {
            self.deleted.lock().unwrap().push(notification_id);
        }
    }

    fn fast_security() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 8,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    async fn service() -> (SeaOrmAuthService, Arc<RecordingHook>) {
        let hook = Arc::new(RecordingHook::default());
        let service = SeaOrmAuthService::new(test_store().await, fast_security(), hook.clone());
        (service, hook)
    }

    #[test]
    fn field_validators() {
        assert!(validate_email("mail@gmail.com").is_ok());
        assert!(validate_email("mail").is_err());
        assert!(validate_email("mail@gmail").is_err());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
        assert!(validate_phone("+380501234567").is_ok());
        assert!(validate_phone("0501234567").is_err());
        assert!(validate_phone("+38050123456").is_err());
    }

    #[tokio::test]
    async fn signup_activation_login() {
        let (service, _) = service().await;

        let registration = service
            .register("mail@gmail.com", "password1")
            .await
            .unwrap();
        assert!(!registration.user.is_active);
        assert_eq!(registration.activation_token.len(), 64);

        assert!(matches!(
            service.login("mail@gmail.com", "password1").await,
            Err(AuthError::Inactive)
        ));

        service.activate(&registration.activation_token).await.unwrap();
        assert!(matches!(
            service.activate(&registration.activation_token).await,
            Err(AuthError::InvalidToken)
        ));

        let user = service.login("mail@gmail.com", "password1").await.unwrap();
        assert_eq!(user.id, registration.user.id);
        assert!(matches!(
            service.login("mail@gmail.com", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(
            service
                .verify_api_key(&user.api_key)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn taken_email_is_a_validation_error() {
        let (service, _) = service().await;
        service.register("mail@gmail.com", "password1").await.unwrap();

        assert!(matches!(
            service.register("mail@gmail.com", "password2").await,
            Err(AuthError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn inactive_api_keys_are_ignored() {
        let (service, _) = service().await;
        let registration = service.register("mail@gmail.com", "password1").await.unwrap();

        assert!(
            service
                .verify_api_key(&registration.user.api_key)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn phone_update_and_account_deletion() {
        let (service, hook) = service().await;
        let registration = service.register("mail@gmail.com", "password1").await.unwrap();
        service.activate(&registration.activation_token).await.unwrap();
        let user_id = registration.user.id;

        assert!(matches!(
            service.update_phone(user_id, "12345").await,
            Err(AuthError::Validation(_))
        ));
        let user = service.update_phone(user_id, "+380501234567").await.unwrap();
        assert_eq!(user.phone_number.as_deref(), Some("+380501234567"));

        service.delete_account(user_id).await.unwrap();
        assert!(hook.deleted.lock().unwrap().is_empty());
        assert!(matches!(
            service.get_user(user_id).await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            service.delete_account(user_id).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn account_deletion_cancels_reminders() {
        let store = test_store().await;
        let hook = Arc::new(RecordingHook::default());
        let service = SeaOrmAuthService::new(store.clone(), fast_security(), hook.clone());

        let user = store
            .create_active_user("mail@gmail.com", "password1", Some(&fast_security()))
            .await
            .unwrap()
            .unwrap();
        let way = store.create_way(user.id, "Commute").await.unwrap();
        let notification = store
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

        service.delete_account(user.id).await.unwrap();

        assert_eq!(*hook.deleted.lock().unwrap(), vec![notification.id]);
        assert_eq!(store.get_notification(notification.id).await.unwrap(), None);
        assert_eq!(store.get_way(way.id).await.unwrap(), None);
    }
}
