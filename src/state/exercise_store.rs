use crate::error::Result;
use crate::models::{CreateExercise, Exercise, UpdateExercise};
use crate::repositories::ExerciseRepository;

use super::record_failure;

/// Exercise library as seen by one user (or everyone when unscoped).
pub struct ExerciseStore {
    repo: ExerciseRepository,
    user_id: Option<String>,
    pub exercises: Vec<Exercise>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ExerciseStore {
    pub fn new(repo: ExerciseRepository, user_id: Option<&str>) -> Self {
        Self {
            repo,
            user_id: user_id.map(str::to_string),
            exercises: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub async fn refresh(&mut self) -> &[Exercise] {
        self.loading = true;
        let result = match &self.user_id {
            Some(user_id) => self.repo.find_all_for_user(user_id).await,
            None => self.repo.find_all().await,
        };
        self.loading = false;

        match result {
            Ok(exercises) => self.exercises = exercises,
            Err(e) => {
                record_failure(&mut self.error, "load exercises", &e);
                self.exercises.clear();
            }
        }
        &self.exercises
    }

    /// Single exercise by id regardless of owner; `None` when missing or on failure.
    pub async fn get(&mut self, id: &str) -> Option<Exercise> {
        self.loading = true;
        let result = self.repo.find_by_id(id).await;
        self.loading = false;

        match result {
            Ok(exercise) => exercise,
            Err(e) => {
                record_failure(&mut self.error, "load exercise", &e);
                None
            }
        }
    }

    pub async fn create(&mut self, data: CreateExercise) -> Result<Exercise> {
        self.loading = true;
        let result = self.repo.create(self.user_id.as_deref(), data).await;
        self.loading = false;

        let exercise = result.inspect_err(|e| record_failure(&mut self.error, "create exercise", e))?;
        self.exercises.insert(0, exercise.clone());
        Ok(exercise)
    }

    pub async fn update(&mut self, id: &str, patch: UpdateExercise) -> Result<Option<Exercise>> {
        self.loading = true;
        let result = self.repo.update(id, self.user_id.as_deref(), patch).await;
        self.loading = false;

        let updated = result.inspect_err(|e| record_failure(&mut self.error, "update exercise", e))?;
        if let Some(exercise) = &updated {
            if let Some(slot) = self.exercises.iter_mut().find(|e| e.id == exercise.id) {
                *slot = exercise.clone();
            }
        }
        Ok(updated)
    }

    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        self.loading = true;
        let result = self.repo.delete(id, self.user_id.as_deref()).await;
        self.loading = false;

        let deleted = result.inspect_err(|e| record_failure(&mut self.error, "delete exercise", e))?;
        if deleted {
            self.exercises.retain(|e| e.id != id);
        }
        Ok(deleted)
    }
}
