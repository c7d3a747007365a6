//! Key/value session storage.

use chrono::Utc;
use serde::de::DeserializeOwned;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::User;

const USER_KEY: &str = "user";
const TOKEN_KEY: &str = "token";

/// Persists the signed-in user and their session token.
#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn load_user(&self) -> Result<Option<User>, AppError> {
        self.get_json(USER_KEY).await
    }

    pub async fn load_token(&self) -> Result<Option<String>, AppError> {
        self.get_json(TOKEN_KEY).await
    }

    /// Store `user` under `token`, replacing any previous session.
    pub async fn save(&self, user: &User, token: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now().to_rfc3339();
        for (key, value) in [
            (USER_KEY, serde_json::to_string(user)?),
            (TOKEN_KEY, serde_json::to_string(token)?),
        ] {
            sqlx::query(
                r#"
                INSERT INTO session (key, value, updated_at) VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Update the stored user, keeping the token.
    ///
    /// Fails with `Unauthorized` when the session was cleared in the meantime.
    pub async fn save_user(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE session SET value = ?, updated_at = ? WHERE key = ?")
            .bind(serde_json::to_string(user)?)
            .bind(Utc::now().to_rfc3339())
            .bind(USER_KEY)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Unauthorized("Not signed in".to_string()));
        }
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM session")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let row = sqlx::query("SELECT value FROM session WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let value: String = row.get("value");
                serde_json::from_str(&value).map(Some).map_err(|e| {
                    tracing::error!("Corrupt session entry {}: {:?}", key, e);
                    AppError::Internal(format!("Corrupt session entry {}", key))
                })
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    async fn repo() -> (SessionRepository, TempDir) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("test.sqlite")).await.unwrap();
        (SessionRepository::new(pool), dir)
    }

    fn user() -> User {
        User {
            id: "user-1".into(),
            name: "ada".into(),
            email: "ada@example.com".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_save_load_and_clear() {
        let (repo, _dir) = repo().await;
        assert!(repo.load_user().await.unwrap().is_none());

        repo.save(&user(), "tok-1").await.unwrap();
        assert_eq!(repo.load_user().await.unwrap(), Some(user()));
        assert_eq!(repo.load_token().await.unwrap().as_deref(), Some("tok-1"));

        let mut renamed = user();
        renamed.name = "Ada Lovelace".into();
        repo.save_user(&renamed).await.unwrap();
        assert_eq!(repo.load_user().await.unwrap(), Some(renamed));
        assert_eq!(repo.load_token().await.unwrap().as_deref(), Some("tok-1"));

        repo.clear().await.unwrap();
        assert!(repo.load_user().await.unwrap().is_none());
        assert!(repo.load_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_user_after_clear_is_unauthorized() {
        let (repo, _dir) = repo().await;
        repo.save(&user(), "tok-1").await.unwrap();
        repo.clear().await.unwrap();

        let err = repo.save_user(&user()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert!(repo.load_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_session() {
        let (repo, _dir) = repo().await;
        repo.save(&user(), "tok-1").await.unwrap();
        repo.save(&user(), "tok-2").await.unwrap();
        assert_eq!(repo.load_token().await.unwrap().as_deref(), Some("tok-2"));
    }
}
