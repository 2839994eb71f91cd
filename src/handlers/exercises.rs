use askama::Template;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};

use crate::error::{AppError, Result};
use crate::media::MediaResolver;
use crate::middleware::AuthUser;
use crate::models::{CreateExercise, Exercise};
use crate::repositories::{ExerciseRepository, SessionExerciseRepository};
use crate::state::{ExerciseStore, SessionExerciseStore};
use crate::views::{MediaDetail, TickCard};

#[derive(Clone)]
pub struct ExercisesState {
    pub exercise_repo: ExerciseRepository,
    pub session_exercise_repo: SessionExerciseRepository,
    pub media: MediaResolver,
}

impl ExercisesState {
    fn store(&self, user: &AuthUser) -> ExerciseStore {
        ExerciseStore::new(self.exercise_repo.clone(), Some(&user.id))
    }
}

#[derive(Template)]
#[template(path = "exercises/list.html")]
struct ExercisesListTemplate {
    user: AuthUser,
    active: &'static str,
    cards: Vec<TickCard>,
    error: Option<String>,
}

/// Shared by the create and edit dialogs.
#[derive(Template)]
#[template(path = "exercises/form.html")]
struct ExerciseFormTemplate {
    user: AuthUser,
    active: &'static str,
    heading: &'static str,
    action: String,
    name: String,
    description: String,
    image_url: String,
    video_url: String,
    preview_url: Option<String>,
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "exercises/detail.html")]
struct ExerciseDetailTemplate {
    user: AuthUser,
    active: &'static str,
    detail: MediaDetail,
}

impl ExerciseFormTemplate {
    fn new_exercise(user: AuthUser, form: &CreateExercise, media: &MediaResolver) -> Self {
        Self {
            user,
            active: "exercises",
            heading: "New exercise",
            action: "/exercises".to_string(),
            name: form.name.clone(),
            description: form.description.clone().unwrap_or_default(),
            image_url: form.image_url.clone(),
            video_url: form.video_url.clone(),
            preview_url: media.public_url(&form.image_url),
            error: None,
        }
    }

    fn edit_exercise(user: AuthUser, exercise: &Exercise, media: &MediaResolver) -> Self {
        Self {
            user,
            active: "exercises",
            heading: "Edit exercise",
            action: format!("/exercises/{}", exercise.id),
            name: exercise.name.clone(),
            description: exercise.description.clone().unwrap_or_default(),
            image_url: exercise.image_url.clone(),
            video_url: exercise.video_url.clone(),
            preview_url: media.public_url(&exercise.image_url),
            error: None,
        }
    }
}

/// Load an exercise the user may change: missing is a 404, foreign is a 403.
async fn owned_exercise(
    state: &ExercisesState,
    user: &AuthUser,
    id: &str,
    action: &str,
) -> Result<Exercise> {
    let exercise = state
        .store(user)
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound("Exercise not found".to_string()))?;

    if !exercise.is_owned_by(&user.id) {
        return Err(AppError::Forbidden(format!(
            "You can only {} your own exercises",
            action
        )));
    }

    Ok(exercise)
}

fn trimmed(form: CreateExercise) -> CreateExercise {
    CreateExercise {
        name: form.name.trim().to_string(),
        description: form.description,
        image_url: form.image_url.trim().to_string(),
        video_url: form.video_url.trim().to_string(),
    }
}

pub async fn list(State(state): State<ExercisesState>, auth_user: AuthUser) -> Result<Response> {
    let mut store = state.store(&auth_user);
    let cards: Vec<TickCard> = store
        .refresh()
        .await
        .iter()
        .map(|exercise| TickCard::for_exercise(exercise, &state.media))
        .collect();

    let template = ExercisesListTemplate {
        user: auth_user,
        active: "exercises",
        cards,
        error: store.error,
    };

    Ok(Html(template.render()?).into_response())
}

pub async fn new_page(State(state): State<ExercisesState>, auth_user: AuthUser) -> Result<Response> {
    let template =
        ExerciseFormTemplate::new_exercise(auth_user, &CreateExercise::default(), &state.media);

    Ok(Html(template.render()?).into_response())
}

pub async fn create(
    State(state): State<ExercisesState>,
    auth_user: AuthUser,
    Form(form): Form<CreateExercise>,
) -> Result<Response> {
    let form = trimmed(form);
    if form.name.is_empty() {
        let mut template = ExerciseFormTemplate::new_exercise(auth_user, &form, &state.media);
        template.error = Some("Exercise name is required".to_string());
        return Ok(Html(template.render()?).into_response());
    }

    let exercise = state.store(&auth_user).create(form).await?;
    tracing::debug!("Created exercise {} ({})", exercise.name, exercise.id);

    Ok(Redirect::to("/exercises").into_response())
}

pub async fn show(
    State(state): State<ExercisesState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let exercise = owned_exercise(&state, &auth_user, &id, "view").await?;

    let template = ExerciseDetailTemplate {
        user: auth_user,
        active: "exercises",
        detail: MediaDetail::for_exercise(&exercise, &state.media),
    };

    Ok(Html(template.render()?).into_response())
}

pub async fn edit_page(
    State(state): State<ExercisesState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    let exercise = owned_exercise(&state, &auth_user, &id, "edit").await?;

    let template = ExerciseFormTemplate::edit_exercise(auth_user, &exercise, &state.media);

    Ok(Html(template.render()?).into_response())
}

pub async fn update(
    State(state): State<ExercisesState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Form(form): Form<CreateExercise>,
) -> Result<Response> {
    let exercise = owned_exercise(&state, &auth_user, &id, "edit").await?;

    let form = trimmed(form);
    if form.name.is_empty() {
        let mut template = ExerciseFormTemplate::edit_exercise(auth_user, &exercise, &state.media);
        template.error = Some("Exercise name is required".to_string());
        return Ok(Html(template.render()?).into_response());
    }

    state
        .store(&auth_user)
        .update(&id, form.into())
        .await?
        .ok_or_else(|| AppError::NotFound("Exercise not found".to_string()))?;

    Ok(Redirect::to("/exercises").into_response())
}

pub async fn delete(
    State(state): State<ExercisesState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response> {
    owned_exercise(&state, &auth_user, &id, "delete").await?;

    // Detach it from every planned session first
    let detached = SessionExerciseStore::new(state.session_exercise_repo.clone())
        .remove_by_exercise(&id)
        .await?;
    if detached > 0 {
        tracing::debug!("Detached exercise {} from {} planned entries", id, detached);
    }

    state.store(&auth_user).delete(&id).await?;

    Ok(Redirect::to("/exercises").into_response())
}
