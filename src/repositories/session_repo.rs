use chrono::{NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::Result;
use crate::models::{FromSqliteRow, Session, UpdateSession};

/// Same text form rusqlite writes for `NaiveDate`.
fn date_value(date: NaiveDate) -> Value {
    Value::Text(date.format("%Y-%m-%d").to_string())
}

#[derive(Clone)]
pub struct SessionRepository {
    pool: DbPool,
}

impl SessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn query_sessions(&self, sql: &'static str, args: Vec<Value>) -> Result<Vec<Session>> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(sql)?;
            let sessions = stmt
                .query_map(rusqlite::params_from_iter(args), Session::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(sessions)
        })
        .await?
    }

    pub async fn find_all(&self) -> Result<Vec<Session>> {
        self.query_sessions(
            "SELECT * FROM Session ORDER BY created_at DESC, rowid DESC",
            vec![],
        )
        .await
    }

    pub async fn find_all_for_user(&self, user_id: &str) -> Result<Vec<Session>> {
        self.query_sessions(
            "SELECT * FROM Session WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
            vec![Value::from(user_id.to_string())],
        )
        .await
    }

    /// Sessions scheduled on exactly `date`, newest first.
    pub async fn find_by_date(&self, date: NaiveDate) -> Result<Vec<Session>> {
        self.query_sessions(
            "SELECT * FROM Session WHERE date = ? ORDER BY created_at DESC, rowid DESC",
            vec![date_value(date)],
        )
        .await
    }

    pub async fn find_by_date_for_user(
        &self,
        date: NaiveDate,
        user_id: &str,
    ) -> Result<Vec<Session>> {
        self.query_sessions(
            "SELECT * FROM Session WHERE date = ? AND user_id = ?
             ORDER BY created_at DESC, rowid DESC",
            vec![date_value(date), Value::from(user_id.to_string())],
        )
        .await
    }

    /// Distinct dates in `[from, to]` holding at least one of the user's sessions.
    pub async fn find_dates_in_range(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        let pool = self.pool.clone();
        let user_id = user_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(
                "SELECT DISTINCT date FROM Session
                 WHERE user_id = ? AND date >= ? AND date <= ?
                 ORDER BY date",
            )?;
            let dates = stmt
                .query_map(rusqlite::params![user_id, from, to], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<NaiveDate>>>()?;
            Ok(dates)
        })
        .await?
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Session>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let mut stmt = conn.prepare("SELECT * FROM Session WHERE id = ?")?;
            let result = stmt.query_row([&id], Session::from_row).optional()?;
            Ok(result)
        })
        .await?
    }

    pub async fn create(&self, user_id: Option<&str>, name: &str, date: NaiveDate) -> Result<Session> {
        let session = Session {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            name: name.to_string(),
            date,
            user_id: user_id.map(str::to_string),
        };
        let session_clone = session.clone();

        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO Session (id, created_at, name, date, user_id) VALUES (?, ?, ?, ?, ?)",
                rusqlite::params![
                    session_clone.id,
                    session_clone.created_at,
                    session_clone.name,
                    session_clone.date,
                    session_clone.user_id
                ],
            )?;
            Ok(())
        })
        .await??;

        Ok(session)
    }

    pub async fn update(
        &self,
        id: &str,
        user_id: Option<&str>,
        patch: UpdateSession,
    ) -> Result<Option<Session>> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.map(str::to_string);
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let updated = conn
                .query_row(
                    "UPDATE Session SET
                        name = COALESCE(?1, name),
                        date = COALESCE(?2, date)
                     WHERE id = ?3 AND (?4 IS NULL OR user_id = ?4)
                     RETURNING *",
                    rusqlite::params![patch.name, patch.date, id, user_id],
                    Session::from_row,
                )
                .optional()?;
            Ok(updated)
        })
        .await?
    }

    /// Attached exercises are detached by the cascade.
    pub async fn delete(&self, id: &str, user_id: Option<&str>) -> Result<bool> {
        let pool = self.pool.clone();
        let id = id.to_string();
        let user_id = user_id.map(str::to_string);
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            let rows = conn.execute(
                "DELETE FROM Session WHERE id = ?1 AND (?2 IS NULL OR user_id = ?2)",
                rusqlite::params![id, user_id],
            )?;
            Ok(rows > 0)
        })
        .await?
    }
}
