#![allow(dead_code)]

use axum::Router;
use chrono::NaiveDate;

use fitplan::db::{create_memory_pool, DbPool};
use fitplan::handlers::{auth, exercises, planner};
use fitplan::media::MediaResolver;
use fitplan::migrations::run_migrations_for_tests;
use fitplan::models::{CreateExercise, Exercise, Session, SessionExercise, User};
use fitplan::repositories::{
    ExerciseRepository, LoginRepository, SessionExerciseRepository, SessionRepository,
    UserRepository,
};

pub const STORAGE_URL: &str = "https://storage.example.com";

pub fn setup_test_db() -> DbPool {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations_for_tests(&pool).expect("Failed to run migrations");
    pool
}

pub fn create_test_app(pool: DbPool) -> Router {
    let user_repo = UserRepository::new(pool.clone());
    let login_repo = LoginRepository::new(pool.clone());
    let exercise_repo = ExerciseRepository::new(pool.clone());
    let session_repo = SessionRepository::new(pool.clone());
    let session_exercise_repo = SessionExerciseRepository::new(pool.clone());
    let media = MediaResolver::new(STORAGE_URL, "fitness-exercise");

    let auth_state = auth::AuthState {
        user_repo,
        login_repo,
    };
    let planner_state = planner::PlannerState {
        session_repo,
        session_exercise_repo: session_exercise_repo.clone(),
        exercise_repo: exercise_repo.clone(),
        media: media.clone(),
    };
    let exercises_state = exercises::ExercisesState {
        exercise_repo,
        session_exercise_repo,
        media,
    };

    fitplan::routes::create_router(auth_state, planner_state, exercises_state)
}

pub async fn create_test_user(pool: &DbPool, username: &str, password: &str) -> User {
    let user_repo = UserRepository::new(pool.clone());
    user_repo.create(username, password).await.unwrap()
}

/// `Cookie` header value for a fresh login of `user`.
pub async fn create_session_cookie(pool: &DbPool, user: &User) -> String {
    let login_repo = LoginRepository::new(pool.clone());
    let token = login_repo.create(&user.id).await.unwrap();
    format!("session={}", token)
}

pub fn extract_cookie_header(set_cookie: &str) -> String {
    // Extract just the cookie name=value part for use in Cookie header
    set_cookie.split(';').next().unwrap_or("").to_string()
}

// Test data creation helpers
pub async fn create_test_exercise(pool: &DbPool, user_id: &str, name: &str) -> Exercise {
    let exercise_repo = ExerciseRepository::new(pool.clone());
    exercise_repo
        .create(
            Some(user_id),
            CreateExercise {
                name: name.to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

pub async fn create_test_session(pool: &DbPool, user_id: &str, name: &str, date: &str) -> Session {
    let session_repo = SessionRepository::new(pool.clone());
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    session_repo.create(Some(user_id), name, date).await.unwrap()
}

pub async fn attach_exercises(
    pool: &DbPool,
    session_id: &str,
    exercise_ids: &[String],
) -> Vec<SessionExercise> {
    let repo = SessionExerciseRepository::new(pool.clone());
    repo.add_many(session_id, exercise_ids).await.unwrap()
}

// Request helpers
pub async fn get(app: Router, uri: &str, cookie: &str) -> axum::response::Response {
    use tower::ServiceExt;

    app.oneshot(
        axum::http::Request::builder()
            .uri(uri)
            .header(axum::http::header::COOKIE, cookie)
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_form(
    app: Router,
    uri: &str,
    cookie: &str,
    body: &str,
) -> axum::response::Response {
    use tower::ServiceExt;

    app.oneshot(
        axum::http::Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                axum::http::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .header(axum::http::header::COOKIE, cookie)
            .body(axum::body::Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_string(response: axum::response::Response) -> String {
    use http_body_util::BodyExt;

    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&body).to_string()
}

pub fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
