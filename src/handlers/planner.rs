use askama::Template;
use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;

use crate::calendar::{self, MonthView};
use crate::error::{AppError, Result};
use crate::media::MediaResolver;
use crate::middleware::AuthUser;
use crate::models::{CreateSession, Session, SessionExerciseWithExercise, UpdateSessionExercise};
use crate::repositories::{ExerciseRepository, SessionExerciseRepository, SessionRepository};
use crate::state::{DayPhase, DayPlan, ExerciseStore, SessionExerciseStore, SessionStore};
use crate::views::{MediaDetail, TickCard};

#[derive(Clone)]
pub struct PlannerState {
    pub session_repo: SessionRepository,
    pub session_exercise_repo: SessionExerciseRepository,
    pub exercise_repo: ExerciseRepository,
    pub media: MediaResolver,
}

impl PlannerState {
    fn sessions(&self, user: &AuthUser) -> SessionStore {
        SessionStore::new(self.session_repo.clone(), Some(&user.id))
    }

    fn entries(&self) -> SessionExerciseStore {
        SessionExerciseStore::new(self.session_exercise_repo.clone())
    }

    fn exercises(&self, user: &AuthUser) -> ExerciseStore {
        ExerciseStore::new(self.exercise_repo.clone(), Some(&user.id))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PlannerQuery {
    pub date: Option<String>,
    pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddExercisesForm {
    #[serde(default)]
    pub exercise_ids: Vec<String>,
}

/// A session on the selected day with its tick-cards.
struct SessionGroup {
    name: String,
    edit_href: String,
    add_href: String,
    delete_action: String,
    cards: Vec<TickCard>,
    progress: String,
}

struct ExerciseOption {
    id: String,
    name: String,
    image_url: Option<String>,
    already_added: bool,
}

// Templates
#[derive(Template)]
#[template(path = "planner/index.html")]
struct PlannerTemplate {
    user: AuthUser,
    active: &'static str,
    calendar: MonthView,
    selected_date: String,
    selected_label: String,
    no_session: bool,
    awaiting_exercises: bool,
    groups: Vec<SessionGroup>,
    form_error: Option<String>,
    load_error: Option<String>,
}

#[derive(Template)]
#[template(path = "planner/edit_session.html")]
struct EditSessionTemplate {
    user: AuthUser,
    active: &'static str,
    action: String,
    name: String,
    date: String,
    back_href: String,
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "planner/add_exercises.html")]
struct AddExercisesTemplate {
    user: AuthUser,
    active: &'static str,
    session_name: String,
    session_label: String,
    action: String,
    back_href: String,
    options: Vec<ExerciseOption>,
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "planner/entry_detail.html")]
struct EntryDetailTemplate {
    user: AuthUser,
    active: &'static str,
    detail: MediaDetail,
    completed: bool,
    toggle_action: String,
}

#[derive(Template)]
#[template(path = "planner/edit_entry.html")]
struct EditEntryTemplate {
    user: AuthUser,
    active: &'static str,
    action: String,
    exercise_name: String,
    sets: String,
    reps: String,
    rest_seconds: String,
    duration_seconds: String,
    notes: String,
    back_href: String,
    error: Option<String>,
}

fn planner_href(date: NaiveDate) -> String {
    format!("/?date={}", date.format("%Y-%m-%d"))
}

fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

fn number_field(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn validate_overrides(form: &UpdateSessionExercise) -> Result<()> {
    let negative = [form.sets, form.reps, form.rest_seconds, form.duration_seconds]
        .iter()
        .flatten()
        .any(|v| *v < 0);
    if negative {
        return Err(AppError::Validation("Values cannot be negative".to_string()));
    }
    Ok(())
}

fn stored_overrides(entry: &SessionExerciseWithExercise) -> UpdateSessionExercise {
    UpdateSessionExercise {
        sets: entry.entry.sets,
        reps: entry.entry.reps,
        rest_seconds: entry.entry.rest_seconds,
        duration_seconds: entry.entry.duration_seconds,
        notes: entry.entry.notes.clone(),
    }
}

async fn render_planner(
    state: &PlannerState,
    user: AuthUser,
    selected: NaiveDate,
    month: NaiveDate,
    form_error: Option<String>,
) -> Result<Html<String>> {
    let mut sessions = state.sessions(&user);
    let mut entries = state.entries();

    let marked = sessions
        .marked_dates(calendar::first_of_month(month), calendar::last_of_month(month))
        .await;
    let today = Local::now().date_naive();
    let calendar = MonthView::build(month, selected, today, &marked);

    let plan = DayPlan::load(&mut sessions, &mut entries, selected).await;
    let phase = plan.phase();
    let groups: Vec<SessionGroup> = plan
        .sessions
        .iter()
        .map(|session_plan| {
            let id = &session_plan.session.id;
            SessionGroup {
                name: session_plan.session.name.clone(),
                edit_href: format!("/sessions/{}/edit", id),
                add_href: format!("/sessions/{}/exercises/new", id),
                delete_action: format!("/sessions/{}/delete", id),
                cards: session_plan
                    .entries
                    .iter()
                    .map(|entry| TickCard::for_entry(entry, &state.media))
                    .collect(),
                progress: format!(
                    "{}/{} done",
                    session_plan.completed_count(),
                    session_plan.entries.len()
                ),
            }
        })
        .collect();

    let template = PlannerTemplate {
        user,
        active: "planner",
        calendar,
        selected_date: selected.format("%Y-%m-%d").to_string(),
        selected_label: long_date(selected),
        no_session: phase == DayPhase::NoSession,
        awaiting_exercises: phase == DayPhase::SessionWithoutExercises,
        groups,
        form_error,
        load_error: sessions.error.or(entries.error),
    };

    Ok(Html(template.render()?))
}

/// Load a session the user owns; anything else is a 404.
async fn owned_session(state: &PlannerState, user: &AuthUser, id: &str) -> Result<Session> {
    state
        .sessions(user)
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
}

/// Load an entry whose session the user owns; anything else is a 404.
async fn owned_entry(
    state: &PlannerState,
    user: &AuthUser,
    id: &str,
) -> Result<(SessionExerciseWithExercise, Session)> {
    let entry = state
        .entries()
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;
    let session = state
        .sessions(user)
        .get(&entry.entry.session_id)
        .await
        .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;
    Ok((entry, session))
}

// Handlers
pub async fn index(
    State(state): State<PlannerState>,
    auth_user: AuthUser,
    Query(query): Query<PlannerQuery>,
) -> Result<Response> {
    let selected = query
        .date
        .as_deref()
        .and_then(calendar::parse_date)
        .unwrap_or_else(|| Local::now().date_naive());
    let month = query
        .month
        .as_deref()
        .and_then(calendar::parse_month)
        .unwrap_or_else(|| calendar::first_of_month(selected));

    Ok(render_planner(&state, auth_user, selected, month, None)
        .await?
        .into_response())
}

pub async fn create_session(
    State(state): State<PlannerState>,
    auth_user: AuthUser,
    form: std::result::Result<Form<CreateSession>, FormRejection>,
) -> Result<Response> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!("Rejected session form: {}", rejection);
            let today = Local::now().date_naive();
            return Ok(render_planner(
                &state,
                auth_user,
                today,
                calendar::first_of_month(today),
                Some("Choose a valid date for the session".to_string()),
            )
            .await?
            .into_response());
        }
    };

    let name = form.name.trim();
    if name.is_empty() {
        let month = calendar::first_of_month(form.date);
        return Ok(render_planner(
            &state,
            auth_user,
            form.date,
            month,
            Some("Session name is required".to_string()),
        )
        .await?
        .into_response());
    }

    let session = state.sessions(&auth_user).create(name, form.date).await?;
    tracing::debug!("Created session {} on {}", session.id, session.date);

    Ok(Redirect::to(&planner_href(session.date)).into_response())
}

pub async fn edit_session_page(
    State(state): State<PlannerState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let session = owned_session(&state, &auth_user, &id).await?;

    let template = edit_session_template(auth_user, session, None);

    Ok(Html(template.render()?).into_response())
}

fn edit_session_template(user: AuthUser, session: Session, error: Option<&str>) -> EditSessionTemplate {
    EditSessionTemplate {
        user,
        active: "planner",
        action: format!("/sessions/{}", session.id),
        back_href: planner_href(session.date),
        date: session.date.format("%Y-%m-%d").to_string(),
        name: session.name,
        error: error.map(str::to_string),
    }
}

pub async fn update_session(
    State(state): State<PlannerState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    form: std::result::Result<Form<CreateSession>, FormRejection>,
) -> Result<Response> {
    let session = owned_session(&state, &auth_user, &id).await?;

    let form = match form {
        Ok(Form(form)) if !form.name.trim().is_empty() => form,
        Ok(_) => {
            let template = edit_session_template(auth_user, session, Some("Session name is required"));
            return Ok(Html(template.render()?).into_response());
        }
        Err(rejection) => {
            tracing::debug!("Rejected session form: {}", rejection);
            let template =
                edit_session_template(auth_user, session, Some("Choose a valid date for the session"));
            return Ok(Html(template.render()?).into_response());
        }
    };

    let form = CreateSession {
        name: form.name.trim().to_string(),
        date: form.date,
    };
    let updated = state
        .sessions(&auth_user)
        .update(&id, form.into())
        .await?
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

    Ok(Redirect::to(&planner_href(updated.date)).into_response())
}

pub async fn delete_session(
    State(state): State<PlannerState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let session = owned_session(&state, &auth_user, &id).await?;

    if !state.sessions(&auth_user).delete(&id).await? {
        return Err(AppError::NotFound("Session not found".to_string()));
    }

    Ok(Redirect::to(&planner_href(session.date)).into_response())
}

async fn render_add_exercises(
    state: &PlannerState,
    user: AuthUser,
    session: Session,
    error: Option<String>,
) -> Result<Html<String>> {
    let mut exercises = state.exercises(&user);
    let mut entries = state.entries();
    let attached = entries.fetch(&session.id).await;

    let options: Vec<ExerciseOption> = exercises
        .refresh()
        .await
        .iter()
        .map(|exercise| ExerciseOption {
            id: exercise.id.clone(),
            name: exercise.name.clone(),
            image_url: state.media.public_url(&exercise.image_url),
            already_added: attached.iter().any(|e| e.entry.exercise_id == exercise.id),
        })
        .collect();

    let template = AddExercisesTemplate {
        user,
        active: "planner",
        session_label: long_date(session.date),
        action: format!("/sessions/{}/exercises", session.id),
        back_href: planner_href(session.date),
        session_name: session.name,
        options,
        error: error.or(exercises.error),
    };

    Ok(Html(template.render()?))
}

pub async fn add_exercises_page(
    State(state): State<PlannerState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let session = owned_session(&state, &auth_user, &id).await?;

    Ok(render_add_exercises(&state, auth_user, session, None)
        .await?
        .into_response())
}

pub async fn add_exercises(
    State(state): State<PlannerState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    axum_extra::extract::Form(form): axum_extra::extract::Form<AddExercisesForm>,
) -> Result<Response> {
    let session = owned_session(&state, &auth_user, &id).await?;

    if form.exercise_ids.is_empty() {
        return Ok(render_add_exercises(
            &state,
            auth_user,
            session,
            Some("Select at least one exercise".to_string()),
        )
        .await?
        .into_response());
    }

    let mut exercises = state.exercises(&auth_user);
    let available = exercises.refresh().await;
    if let Some(unknown) = form
        .exercise_ids
        .iter()
        .find(|id| !available.iter().any(|e| &e.id == *id))
    {
        return Err(AppError::BadRequest(format!("Unknown exercise: {}", unknown)));
    }

    let added = state
        .entries()
        .add_many(&session.id, &form.exercise_ids)
        .await?;
    tracing::debug!("Attached {} exercises to session {}", added.len(), session.id);

    Ok(Redirect::to(&planner_href(session.date)).into_response())
}

pub async fn show_entry(
    State(state): State<PlannerState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let (entry, session) = owned_entry(&state, &auth_user, &id).await?;

    let template = EntryDetailTemplate {
        user: auth_user,
        active: "planner",
        detail: MediaDetail::for_entry(&entry, planner_href(session.date), &state.media),
        completed: entry.entry.completed,
        toggle_action: format!("/entries/{}/toggle", entry.entry.id),
    };

    Ok(Html(template.render()?).into_response())
}

fn edit_entry_template(
    user: AuthUser,
    entry: &SessionExerciseWithExercise,
    session: &Session,
    values: &UpdateSessionExercise,
    error: Option<String>,
) -> EditEntryTemplate {
    EditEntryTemplate {
        user,
        active: "planner",
        action: format!("/entries/{}", entry.entry.id),
        exercise_name: entry.exercise_name().to_string(),
        sets: number_field(values.sets),
        reps: number_field(values.reps),
        rest_seconds: number_field(values.rest_seconds),
        duration_seconds: number_field(values.duration_seconds),
        notes: values.notes.clone().unwrap_or_default(),
        back_href: planner_href(session.date),
        error,
    }
}

pub async fn edit_entry_page(
    State(state): State<PlannerState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let (entry, session) = owned_entry(&state, &auth_user, &id).await?;

    let current = stored_overrides(&entry);
    let template = edit_entry_template(auth_user, &entry, &session, &current, None);

    Ok(Html(template.render()?).into_response())
}

pub async fn update_entry(
    State(state): State<PlannerState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    form: std::result::Result<Form<UpdateSessionExercise>, FormRejection>,
) -> Result<Response> {
    let (entry, session) = owned_entry(&state, &auth_user, &id).await?;

    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!("Rejected entry form: {}", rejection);
            let template = edit_entry_template(
                auth_user,
                &entry,
                &session,
                &stored_overrides(&entry),
                Some("Values must be whole numbers".to_string()),
            );
            return Ok(Html(template.render()?).into_response());
        }
    };

    match validate_overrides(&form) {
        Ok(()) => {}
        Err(AppError::Validation(message)) => {
            let template = edit_entry_template(auth_user, &entry, &session, &form, Some(message));
            return Ok(Html(template.render()?).into_response());
        }
        Err(e) => return Err(e),
    }

    // The form carries every override, so blank fields clear the stored value
    state
        .entries()
        .replace(&id, form)
        .await?
        .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;

    Ok(Redirect::to(&planner_href(session.date)).into_response())
}

pub async fn toggle_entry(
    State(state): State<PlannerState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let (_, session) = owned_entry(&state, &auth_user, &id).await?;

    state
        .entries()
        .toggle(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;

    Ok(Redirect::to(&planner_href(session.date)).into_response())
}

pub async fn delete_entry(
    State(state): State<PlannerState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let (_, session) = owned_entry(&state, &auth_user, &id).await?;

    if !state.entries().remove(&id).await? {
        return Err(AppError::NotFound("Entry not found".to_string()));
    }

    Ok(Redirect::to(&planner_href(session.date)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_overrides() {
        let ok = UpdateSessionExercise {
            sets: Some(3),
            reps: Some(0),
            ..Default::default()
        };
        assert!(validate_overrides(&ok).is_ok());

        let negative = UpdateSessionExercise {
            rest_seconds: Some(-30),
            ..Default::default()
        };
        assert!(matches!(
            validate_overrides(&negative),
            Err(AppError::Validation(message)) if message == "Values cannot be negative"
        ));
    }

    #[test]
    fn test_long_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(long_date(date), "Wednesday, January 10, 2024");
        assert_eq!(planner_href(date), "/?date=2024-01-10");
    }
}
