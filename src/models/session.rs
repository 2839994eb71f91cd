use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

/// A named workout scheduled on a calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub date: NaiveDate,
    pub user_id: Option<String>,
}

impl FromSqliteRow for Session {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            created_at: row.get("created_at")?,
            name: row.get("name")?,
            date: row.get("date")?,
            user_id: row.get("user_id")?,
        })
    }
}

impl Session {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSession {
    pub name: String,
    pub date: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSession {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
}

impl From<CreateSession> for UpdateSession {
    fn from(form: CreateSession) -> Self {
        Self {
            name: Some(form.name),
            date: Some(form.date),
        }
    }
}
