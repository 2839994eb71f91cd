use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::{deserialize_optional_string, FromSqliteRow};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    pub video_url: String,
    pub user_id: Option<String>,
}

impl FromSqliteRow for Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            created_at: row.get("created_at")?,
            name: row.get("name")?,
            description: row.get("description")?,
            image_url: row.get("image_url")?,
            video_url: row.get("video_url")?,
            user_id: row.get("user_id")?,
        })
    }
}

impl Exercise {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }
}

/// The exercise fields inlined into a session entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: String,
    pub video_url: String,
}

impl From<&Exercise> for ExerciseSummary {
    fn from(exercise: &Exercise) -> Self {
        Self {
            id: exercise.id.clone(),
            name: exercise.name.clone(),
            description: exercise.description.clone(),
            image_url: exercise.image_url.clone(),
            video_url: exercise.video_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateExercise {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub video_url: String,
}

/// Partial patch: `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateExercise {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
}

impl From<CreateExercise> for UpdateExercise {
    fn from(form: CreateExercise) -> Self {
        Self {
            name: Some(form.name),
            description: Some(form.description.unwrap_or_default()),
            image_url: Some(form.image_url),
            video_url: Some(form.video_url),
        }
    }
}
