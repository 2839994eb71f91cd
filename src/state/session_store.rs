use std::collections::HashSet;

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{Session, UpdateSession};
use crate::repositories::SessionRepository;

use super::record_failure;

pub struct SessionStore {
    repo: SessionRepository,
    user_id: Option<String>,
    pub sessions: Vec<Session>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionStore {
    pub fn new(repo: SessionRepository, user_id: Option<&str>) -> Self {
        Self {
            repo,
            user_id: user_id.map(str::to_string),
            sessions: Vec::new(),
            loading: false,
            error: None,
        }
    }

    pub async fn refresh(&mut self) -> &[Session] {
        self.loading = true;
        let result = match &self.user_id {
            Some(user_id) => self.repo.find_all_for_user(user_id).await,
            None => self.repo.find_all().await,
        };
        self.loading = false;
        self.replace_snapshot(result, "load sessions");
        &self.sessions
    }

    /// Replace the snapshot with the sessions scheduled on `date`.
    pub async fn load_date(&mut self, date: NaiveDate) -> &[Session] {
        self.loading = true;
        let result = match &self.user_id {
            Some(user_id) => self.repo.find_by_date_for_user(date, user_id).await,
            None => self.repo.find_by_date(date).await,
        };
        self.loading = false;
        self.replace_snapshot(result, "load sessions for date");
        &self.sessions
    }

    fn replace_snapshot(&mut self, result: Result<Vec<Session>>, action: &str) {
        match result {
            Ok(sessions) => self.sessions = sessions,
            Err(e) => {
                record_failure(&mut self.error, action, &e);
                self.sessions.clear();
            }
        }
    }

    /// Dates in `[from, to]` that hold at least one visible session.
    pub async fn marked_dates(&mut self, from: NaiveDate, to: NaiveDate) -> HashSet<NaiveDate> {
        let result = match &self.user_id {
            Some(user_id) => self.repo.find_dates_in_range(user_id, from, to).await,
            None => self.repo.find_all().await.map(|sessions| {
                sessions
                    .into_iter()
                    .map(|s| s.date)
                    .filter(|d| *d >= from && *d <= to)
                    .collect()
            }),
        };

        match result {
            Ok(dates) => dates.into_iter().collect(),
            Err(e) => {
                record_failure(&mut self.error, "load calendar markers", &e);
                HashSet::new()
            }
        }
    }

    /// A session visible to this store's user; foreign sessions read as missing.
    pub async fn get(&mut self, id: &str) -> Option<Session> {
        self.loading = true;
        let result = self.repo.find_by_id(id).await;
        self.loading = false;

        match result {
            Ok(session) => session.filter(|s| match &self.user_id {
                Some(user_id) => s.is_owned_by(user_id),
                None => true,
            }),
            Err(e) => {
                record_failure(&mut self.error, "load session", &e);
                None
            }
        }
    }

    pub async fn create(&mut self, name: &str, date: NaiveDate) -> Result<Session> {
        self.loading = true;
        let result = self.repo.create(self.user_id.as_deref(), name, date).await;
        self.loading = false;

        let session = result.inspect_err(|e| record_failure(&mut self.error, "create session", e))?;
        self.sessions.insert(0, session.clone());
        Ok(session)
    }

    pub async fn update(&mut self, id: &str, patch: UpdateSession) -> Result<Option<Session>> {
        self.loading = true;
        let result = self.repo.update(id, self.user_id.as_deref(), patch).await;
        self.loading = false;

        let updated = result.inspect_err(|e| record_failure(&mut self.error, "update session", e))?;
        if let Some(session) = &updated {
            if let Some(slot) = self.sessions.iter_mut().find(|s| s.id == session.id) {
                *slot = session.clone();
            }
        }
        Ok(updated)
    }

    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        self.loading = true;
        let result = self.repo.delete(id, self.user_id.as_deref()).await;
        self.loading = false;

        let deleted = result.inspect_err(|e| record_failure(&mut self.error, "delete session", e))?;
        if deleted {
            self.sessions.retain(|s| s.id != id);
        }
        Ok(deleted)
    }
}
