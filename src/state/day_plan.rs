use chrono::NaiveDate;

use crate::models::{Session, SessionExerciseWithExercise};

use super::{SessionExerciseStore, SessionStore};

/// Where the planner screen stands for the selected date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPhase {
    NoSession,
    SessionWithoutExercises,
    SessionWithExercises,
}

#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub session: Session,
    pub entries: Vec<SessionExerciseWithExercise>,
}

impl SessionPlan {
    pub fn completed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.entry.completed).count()
    }
}

/// Sessions scheduled on one date with their attached exercises.
#[derive(Debug, Clone)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub sessions: Vec<SessionPlan>,
}

impl DayPlan {
    /// Sessions for `date`, then their entries in a single batched read.
    pub async fn load(
        sessions: &mut SessionStore,
        entries: &mut SessionExerciseStore,
        date: NaiveDate,
    ) -> Self {
        let found = sessions.load_date(date).await.to_vec();
        let ids: Vec<String> = found.iter().map(|s| s.id.clone()).collect();
        entries.fetch_many(&ids).await;

        let sessions = found
            .into_iter()
            .map(|session| SessionPlan {
                entries: entries.entries(&session.id).to_vec(),
                session,
            })
            .collect();

        Self { date, sessions }
    }

    pub fn phase(&self) -> DayPhase {
        if self.sessions.is_empty() {
            DayPhase::NoSession
        } else if self.sessions.iter().all(|plan| plan.entries.is_empty()) {
            DayPhase::SessionWithoutExercises
        } else {
            DayPhase::SessionWithExercises
        }
    }
}
