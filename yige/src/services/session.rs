//! Session store
//!
//! The persisted pieces of a session: the signed-in user, this device's guest
//! id and the number of records saved locally. Each is one opaque key/value
//! row.

use crate::config::{KEY_CURRENT_USER, KEY_GUEST_DEVICE_ID, KEY_LOCAL_RECORD_COUNT};
use crate::database::{Repository, User};
use crate::error::Result;
use uuid::Uuid;

#[derive(Clone)]
pub struct SessionStore {
    repo: Repository,
}

impl SessionStore {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// The persisted user, if any. An unreadable blob counts as signed out.
    pub async fn load_user(&self) -> Result<Option<User>> {
        let Some(blob) = self.repo.get_value(KEY_CURRENT_USER).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<User>(&blob) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!("Discarding unreadable user blob: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn save_user(&self, user: &User) -> Result<()> {
        let blob = serde_json::to_string(user)?;
        self.repo.set_value(KEY_CURRENT_USER, &blob).await
    }

    pub async fn clear_user(&self) -> Result<()> {
        self.repo.delete_value(KEY_CURRENT_USER).await
    }

    pub async fn guest_device_id(&self) -> Result<Option<String>> {
        self.repo.get_value(KEY_GUEST_DEVICE_ID).await
    }

    /// Guest id of this device, created on first use
    pub async fn ensure_guest_device_id(&self) -> Result<String> {
        if let Some(id) = self.guest_device_id().await? {
            return Ok(id);
        }

        let id = format!("guest-{}", Uuid::new_v4());
        self.repo.set_value(KEY_GUEST_DEVICE_ID, &id).await?;
        tracing::info!("Created guest device id: {}", id);
        Ok(id)
    }

    pub async fn local_record_count(&self) -> Result<u64> {
        let count = self
            .repo
            .get_value(KEY_LOCAL_RECORD_COUNT)
            .await?
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        Ok(count)
    }

    pub async fn increment_record_count(&self) -> Result<u64> {
        self.repo.adjust_counter(KEY_LOCAL_RECORD_COUNT, 1).await
    }

    /// Never goes below zero
    pub async fn decrement_record_count(&self) -> Result<u64> {
        self.repo.adjust_counter(KEY_LOCAL_RECORD_COUNT, -1).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::initialize_database;
    use chrono::Utc;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_store() -> SessionStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        initialize_database(&pool).await.unwrap();

        SessionStore::new(Repository::new(pool))
    }

    #[tokio::test]
    async fn test_user_blob_roundtrip() {
        let store = create_test_store().await;
        assert!(store.load_user().await.unwrap().is_none());

        let user = User {
            id: "u1".to_string(),
            nickname: "小格".to_string(),
            email: None,
            phone: Some("13800138000".to_string()),
            created_at: Utc::now(),
            linked_account: None,
        };
        store.save_user(&user).await.unwrap();
        assert_eq!(store.load_user().await.unwrap(), Some(user));

        store.clear_user().await.unwrap();
        assert!(store.load_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_guest_id_is_stable() {
        let store = create_test_store().await;

        let first = store.ensure_guest_device_id().await.unwrap();
        let second = store.ensure_guest_device_id().await.unwrap();

        assert!(first.starts_with("guest-"));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_record_count_never_negative() {
        let store = create_test_store().await;

        assert_eq!(store.decrement_record_count().await.unwrap(), 0);
        assert_eq!(store.increment_record_count().await.unwrap(), 1);
        assert_eq!(store.increment_record_count().await.unwrap(), 2);
        assert_eq!(store.decrement_record_count().await.unwrap(), 1);
        assert_eq!(store.local_record_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_user_blob_reads_as_signed_out() {
        let store = create_test_store().await;

        store
            .repo
            .set_value(KEY_CURRENT_USER, "{not json")
            .await
            .unwrap();

        assert!(store.load_user().await.unwrap().is_none());
    }
}
