use chrono::{DateTime, Duration, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::Result;

/// How long a browser stays logged in without logging in again.
pub const LOGIN_TTL_DAYS: i64 = 7;

/// Server-side login records. A token maps to a user until it expires or is deleted.
#[derive(Clone)]
pub struct LoginRepository {
    pool: DbPool,
}

impl LoginRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a login for a user. Returns the token.
    pub async fn create(&self, user_id: &str) -> Result<String> {
        let pool = self.pool.clone();
        let token = Uuid::new_v4().to_string();
        let user_id = user_id.to_string();
        let now = Utc::now();
        let expires_at = now + Duration::days(LOGIN_TTL_DAYS);
        let token_clone = token.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO logins (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
                rusqlite::params![token_clone, user_id, now, expires_at],
            )?;
            Ok(())
        })
        .await??;

        Ok(token)
    }

    /// Resolve a token to `(user_id, username)`.
    /// Expired logins are deleted on the way and resolve to `None`.
    pub async fn find_valid(&self, token: &str) -> Result<Option<(String, String)>> {
        let pool = self.pool.clone();
        let token = token.to_string();
        let now = Utc::now();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let result: Option<(String, String, DateTime<Utc>)> = conn
                .query_row(
                    "SELECT l.user_id, u.username, l.expires_at
                     FROM logins l JOIN users u ON u.id = l.user_id
                     WHERE l.token = ?",
                    [&token],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()?;

            match result {
                Some((_, _, expires_at)) if expires_at <= now => {
                    conn.execute("DELETE FROM logins WHERE token = ?", [&token])?;
                    Ok(None)
                }
                Some((user_id, username, _)) => Ok(Some((user_id, username))),
                None => Ok(None),
            }
        })
        .await?
    }

    pub async fn delete(&self, token: &str) -> Result<()> {
        let pool = self.pool.clone();
        let token = token.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            conn.execute("DELETE FROM logins WHERE token = ?", [&token])?;
            Ok(())
        })
        .await?
    }

    pub async fn cleanup_expired(&self) -> Result<usize> {
        let pool = self.pool.clone();
        let now = Utc::now();

        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "DELETE FROM logins WHERE expires_at <= ?",
                rusqlite::params![now],
            )?;
            Ok(rows)
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_memory_pool;
    use crate::migrations::run_migrations_for_tests;
    use crate::repositories::UserRepository;

    async fn setup() -> (DbPool, String) {
        let pool = create_memory_pool().expect("Failed to create test database");
        run_migrations_for_tests(&pool).expect("Failed to run migrations");
        let user = UserRepository::new(pool.clone())
            .create("alice", "password123")
            .await
            .unwrap();
        (pool, user.id)
    }

    fn expire(pool: &DbPool, token: &str) {
        let conn = pool.get().unwrap();
        conn.execute(
            "UPDATE logins SET expires_at = ? WHERE token = ?",
            rusqlite::params![Utc::now() - Duration::hours(1), token],
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_find_valid() {
        let (pool, user_id) = setup().await;
        let repo = LoginRepository::new(pool);

        let token = repo.create(&user_id).await.unwrap();
        let found = repo.find_valid(&token).await.unwrap();

        assert_eq!(found, Some((user_id, "alice".to_string())));
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (pool, _) = setup().await;
        let repo = LoginRepository::new(pool);

        assert!(repo.find_valid("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_login_is_removed() {
        let (pool, user_id) = setup().await;
        let repo = LoginRepository::new(pool.clone());

        let token = repo.create(&user_id).await.unwrap();
        expire(&pool, &token);

        assert!(repo.find_valid(&token).await.unwrap().is_none());
        assert_eq!(repo.cleanup_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_logs_out() {
        let (pool, user_id) = setup().await;
        let repo = LoginRepository::new(pool);

        let token = repo.create(&user_id).await.unwrap();
        repo.delete(&token).await.unwrap();

        assert!(repo.find_valid(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let (pool, user_id) = setup().await;
        let repo = LoginRepository::new(pool.clone());

        let stale = repo.create(&user_id).await.unwrap();
        let fresh = repo.create(&user_id).await.unwrap();
        expire(&pool, &stale);

        assert_eq!(repo.cleanup_expired().await.unwrap(), 1);
        assert!(repo.find_valid(&fresh).await.unwrap().is_some());
    }
}
