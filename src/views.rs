//! Presentation models shared by several pages.

use crate::media::MediaResolver;
use crate::models::{Exercise, SessionExerciseWithExercise};

/// One row of the tick-card list: picture, title, reps and sets, a
/// completion box and the edit/delete menu.
#[derive(Debug, Clone)]
pub struct TickCard {
    pub id: String,
    pub title: String,
    pub image_url: Option<String>,
    pub reps: i32,
    pub sets: i32,
    pub completed: bool,
    pub href: String,
    pub edit_href: String,
    pub delete_action: String,
    /// Form target for the completion box. Library cards have none.
    pub toggle_action: Option<String>,
}

impl TickCard {
    pub fn for_entry(entry: &SessionExerciseWithExercise, media: &MediaResolver) -> Self {
        let id = &entry.entry.id;
        Self {
            id: id.clone(),
            title: entry.exercise_name().to_string(),
            image_url: entry
                .exercise
                .as_ref()
                .and_then(|e| media.public_url(&e.image_url)),
            reps: entry.entry.reps.unwrap_or(0),
            sets: entry.entry.sets.unwrap_or(0),
            completed: entry.entry.completed,
            href: format!("/entries/{}", id),
            edit_href: format!("/entries/{}/edit", id),
            delete_action: format!("/entries/{}/delete", id),
            toggle_action: Some(format!("/entries/{}/toggle", id)),
        }
    }

    pub fn for_exercise(exercise: &Exercise, media: &MediaResolver) -> Self {
        let id = &exercise.id;
        Self {
            id: id.clone(),
            title: exercise.name.clone(),
            image_url: media.public_url(&exercise.image_url),
            reps: 0,
            sets: 0,
            completed: false,
            href: format!("/exercises/{}", id),
            edit_href: format!("/exercises/{}/edit", id),
            delete_action: format!("/exercises/{}/delete", id),
            toggle_action: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Stat {
    pub label: &'static str,
    pub value: String,
}

/// Full-page viewer for an exercise, optionally with one entry's overrides.
#[derive(Debug, Clone)]
pub struct MediaDetail {
    pub title: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub stats: Vec<Stat>,
    pub back_href: String,
    pub edit_href: String,
}

impl MediaDetail {
    pub fn for_exercise(exercise: &Exercise, media: &MediaResolver) -> Self {
        Self {
            title: exercise.name.clone(),
            description: non_blank(exercise.description.as_deref()),
            notes: None,
            image_url: media.public_url(&exercise.image_url),
            video_url: media.public_url(&exercise.video_url),
            stats: Vec::new(),
            back_href: "/exercises".to_string(),
            edit_href: format!("/exercises/{}/edit", exercise.id),
        }
    }

    pub fn for_entry(
        entry: &SessionExerciseWithExercise,
        back_href: String,
        media: &MediaResolver,
    ) -> Self {
        let exercise = entry.exercise.as_ref();
        let overrides = &entry.entry;

        let mut stats = Vec::new();
        if let Some(sets) = overrides.sets {
            stats.push(Stat {
                label: "Sets",
                value: sets.to_string(),
            });
        }
        if let Some(reps) = overrides.reps {
            stats.push(Stat {
                label: "Reps",
                value: reps.to_string(),
            });
        }
        if let Some(rest) = overrides.rest_seconds {
            stats.push(Stat {
                label: "Rest",
                value: format_seconds(rest),
            });
        }
        if let Some(duration) = overrides.duration_seconds {
            stats.push(Stat {
                label: "Duration",
                value: format_seconds(duration),
            });
        }

        Self {
            title: entry.exercise_name().to_string(),
            description: non_blank(exercise.and_then(|e| e.description.as_deref())),
            notes: non_blank(overrides.notes.as_deref()),
            image_url: exercise.and_then(|e| media.public_url(&e.image_url)),
            video_url: exercise.and_then(|e| media.public_url(&e.video_url)),
            stats,
            back_href,
            edit_href: format!("/entries/{}/edit", overrides.id),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// `45` -> "45 s", `90` -> "1 min 30 s", `120` -> "2 min".
pub fn format_seconds(seconds: i32) -> String {
    let minutes = seconds / 60;
    let rest = seconds % 60;
    match (minutes, rest) {
        (0, s) => format!("{} s", s),
        (m, 0) => format!("{} min", m),
        (m, s) => format!("{} min {} s", m, s),
    }
}
