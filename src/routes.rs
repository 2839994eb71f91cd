use axum::{
    routing::{get, post},
    Extension, Router,
};

use crate::handlers::{auth, exercises, health, planner};
use crate::repositories::LoginRepository;

pub fn create_router(
    auth_state: auth::AuthState,
    planner_state: planner::PlannerState,
    exercises_state: exercises::ExercisesState,
) -> Router {
    // Resolves the `session` cookie for the AuthUser extractor
    let login_repo: LoginRepository = auth_state.login_repo.clone();

    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Planner
        .route("/", get(planner::index))
        .route("/sessions", post(planner::create_session))
        .route("/sessions/{id}", post(planner::update_session))
        .route("/sessions/{id}/edit", get(planner::edit_session_page))
        .route("/sessions/{id}/delete", post(planner::delete_session))
        .route(
            "/sessions/{id}/exercises",
            post(planner::add_exercises),
        )
        .route(
            "/sessions/{id}/exercises/new",
            get(planner::add_exercises_page),
        )
        // Session entries
        .route(
            "/entries/{id}",
            get(planner::show_entry).post(planner::update_entry),
        )
        .route("/entries/{id}/edit", get(planner::edit_entry_page))
        .route("/entries/{id}/toggle", post(planner::toggle_entry))
        .route("/entries/{id}/delete", post(planner::delete_entry))
        .with_state(planner_state)
        // Auth routes
        .route(
            "/auth/login",
            get(auth::login_page).post(auth::login_submit),
        )
        .route(
            "/auth/setup",
            get(auth::setup_page).post(auth::setup_submit),
        )
        .route("/auth/logout", post(auth::logout))
        .with_state(auth_state)
        // Exercise routes
        .route("/exercises", get(exercises::list).post(exercises::create))
        .route("/exercises/new", get(exercises::new_page))
        .route(
            "/exercises/{id}",
            get(exercises::show).post(exercises::update),
        )
        .route("/exercises/{id}/edit", get(exercises::edit_page))
        .route("/exercises/{id}/delete", post(exercises::delete))
        .with_state(exercises_state)
        .layer(Extension(login_repo))
}
