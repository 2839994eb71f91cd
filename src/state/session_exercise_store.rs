use std::collections::HashMap;

use crate::error::Result;
use crate::models::{
    CreateSessionExercise, SessionExercise, SessionExerciseWithExercise, UpdateSessionExercise,
};
use crate::repositories::SessionExerciseRepository;

use super::record_failure;

/// Attached exercises keyed by session id.
pub struct SessionExerciseStore {
    repo: SessionExerciseRepository,
    pub by_session: HashMap<String, Vec<SessionExerciseWithExercise>>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionExerciseStore {
    pub fn new(repo: SessionExerciseRepository) -> Self {
        Self {
            repo,
            by_session: HashMap::new(),
            loading: false,
            error: None,
        }
    }

    pub fn entries(&self, session_id: &str) -> &[SessionExerciseWithExercise] {
        self.by_session
            .get(session_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub async fn fetch(&mut self, session_id: &str) -> Vec<SessionExerciseWithExercise> {
        self.loading = true;
        let result = self.repo.find_by_session(session_id).await;
        self.loading = false;

        let entries = match result {
            Ok(entries) => entries,
            Err(e) => {
                record_failure(&mut self.error, "load session exercises", &e);
                Vec::new()
            }
        };
        self.by_session
            .insert(session_id.to_string(), entries.clone());
        entries
    }

    /// Load several sessions at once. Every requested id ends up in the snapshot.
    pub async fn fetch_many(&mut self, session_ids: &[String]) {
        self.loading = true;
        let result = self.repo.find_by_sessions(session_ids).await;
        self.loading = false;

        match result {
            Ok(grouped) => self.by_session.extend(grouped),
            Err(e) => {
                record_failure(&mut self.error, "load session exercises", &e);
                for id in session_ids {
                    self.by_session.insert(id.clone(), Vec::new());
                }
            }
        }
    }

    pub async fn get(&mut self, id: &str) -> Option<SessionExerciseWithExercise> {
        self.loading = true;
        let result = self.repo.find_by_id(id).await;
        self.loading = false;

        match result {
            Ok(entry) => entry,
            Err(e) => {
                record_failure(&mut self.error, "load session exercise", &e);
                None
            }
        }
    }

    pub async fn add(&mut self, data: CreateSessionExercise) -> Result<SessionExercise> {
        self.loading = true;
        let result = self.repo.add(data).await;
        self.loading = false;

        let entry = result.inspect_err(|e| record_failure(&mut self.error, "add exercise to session", e))?;
        self.fetch(&entry.session_id).await;
        Ok(entry)
    }

    pub async fn add_many(
        &mut self,
        session_id: &str,
        exercise_ids: &[String],
    ) -> Result<Vec<SessionExercise>> {
        self.loading = true;
        let result = self.repo.add_many(session_id, exercise_ids).await;
        self.loading = false;

        let entries = result.inspect_err(|e| record_failure(&mut self.error, "add exercises to session", e))?;
        self.fetch(session_id).await;
        Ok(entries)
    }

    pub async fn update(
        &mut self,
        id: &str,
        patch: UpdateSessionExercise,
    ) -> Result<Option<SessionExercise>> {
        self.loading = true;
        let result = self.repo.update(id, patch).await;
        self.loading = false;

        let updated = result.inspect_err(|e| record_failure(&mut self.error, "update session exercise", e))?;
        if let Some(row) = &updated {
            self.merge(row);
        }
        Ok(updated)
    }

    /// Write the entry form as a whole; blank overrides are cleared.
    pub async fn replace(
        &mut self,
        id: &str,
        overrides: UpdateSessionExercise,
    ) -> Result<Option<SessionExercise>> {
        self.loading = true;
        let result = self.repo.replace(id, overrides).await;
        self.loading = false;

        let updated = result.inspect_err(|e| record_failure(&mut self.error, "update session exercise", e))?;
        if let Some(row) = &updated {
            self.merge(row);
        }
        Ok(updated)
    }

    /// Flip the completion flag of one entry. `None` when the entry is gone.
    pub async fn toggle(&mut self, id: &str) -> Result<Option<SessionExercise>> {
        let current = match self.find_cached(id) {
            Some(completed) => Some(completed),
            None => self
                .repo
                .find_by_id(id)
                .await
                .inspect_err(|e| record_failure(&mut self.error, "toggle session exercise", e))?
                .map(|entry| entry.entry.completed),
        };
        let Some(completed) = current else {
            return Ok(None);
        };
        self.set_completed(id, !completed).await
    }

    pub async fn set_completed(&mut self, id: &str, completed: bool) -> Result<Option<SessionExercise>> {
        self.loading = true;
        let result = self.repo.set_completed(id, completed).await;
        self.loading = false;

        let updated = result.inspect_err(|e| record_failure(&mut self.error, "toggle session exercise", e))?;
        if let Some(row) = &updated {
            self.merge(row);
        }
        Ok(updated)
    }

    /// Detach one entry by its own id.
    pub async fn remove(&mut self, id: &str) -> Result<bool> {
        self.loading = true;
        let result = self.repo.remove(id).await;
        self.loading = false;

        let removed = result.inspect_err(|e| record_failure(&mut self.error, "remove session exercise", e))?;
        if removed {
            for entries in self.by_session.values_mut() {
                entries.retain(|e| e.entry.id != id);
            }
        }
        Ok(removed)
    }

    /// Detach an exercise from every session that uses it.
    pub async fn remove_by_exercise(&mut self, exercise_id: &str) -> Result<usize> {
        self.loading = true;
        let result = self.repo.remove_by_exercise(exercise_id).await;
        self.loading = false;

        let removed = result.inspect_err(|e| record_failure(&mut self.error, "detach exercise", e))?;
        for entries in self.by_session.values_mut() {
            entries.retain(|e| e.entry.exercise_id != exercise_id);
        }
        Ok(removed)
    }

    fn find_cached(&self, id: &str) -> Option<bool> {
        self.by_session
            .values()
            .flatten()
            .find(|e| e.entry.id == id)
            .map(|e| e.entry.completed)
    }

    fn merge(&mut self, row: &SessionExercise) {
        if let Some(entry) = self
            .by_session
            .get_mut(&row.session_id)
            .and_then(|entries| entries.iter_mut().find(|e| e.entry.id == row.id))
        {
            entry.merge(row.clone());
        }
    }
}
