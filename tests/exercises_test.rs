mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use fitplan::repositories::{ExerciseRepository, SessionExerciseRepository};
use tower::ServiceExt;

// Auth tests

#[tokio::test]
async fn test_exercises_list_requires_auth() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/exercises")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get("location").unwrap(), "/auth/login");
}

#[tokio::test]
async fn test_create_exercise_requires_auth() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/exercises")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("name=Push%20Ups"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get("location").unwrap(), "/auth/login");
    assert!(ExerciseRepository::new(pool).find_all().await.unwrap().is_empty());
}

// CRUD tests

#[tokio::test]
async fn test_create_exercise_success() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "testuser", "password123").await;
    let cookie = common::create_session_cookie(&pool, &user).await;

    let response = common::post_form(
        common::create_test_app(pool.clone()),
        "/exercises",
        &cookie,
        "name=%20Push%20Ups%20&description=Chest%20to%20floor&image_url=push-ups.png&video_url=",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/exercises");

    let exercises = ExerciseRepository::new(pool)
        .find_all_for_user(&user.id)
        .await
        .unwrap();
    assert_eq!(exercises.len(), 1);
    assert_eq!(exercises[0].name, "Push Ups");
    assert_eq!(exercises[0].description.as_deref(), Some("Chest to floor"));
    assert_eq!(exercises[0].image_url, "push-ups.png");
    assert_eq!(exercises[0].video_url, "");
}

#[tokio::test]
async fn test_create_exercise_requires_name() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "testuser", "password123").await;
    let cookie = common::create_session_cookie(&pool, &user).await;

    let response = common::post_form(
        common::create_test_app(pool.clone()),
        "/exercises",
        &cookie,
        "name=&image_url=push-ups.png",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_string(response).await;
    assert!(body.contains("Exercise name is required"));
    // The dialog keeps what was typed
    assert!(body.contains("push-ups.png"));
    assert!(ExerciseRepository::new(pool).find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_exercises_list_newest_first() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "testuser", "password123").await;
    let cookie = common::create_session_cookie(&pool, &user).await;

    common::create_test_exercise(&pool, &user.id, "Squat").await;
    common::create_test_exercise(&pool, &user.id, "Plank").await;

    let response = common::get(common::create_test_app(pool), "/exercises", &cookie).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_string(response).await;
    let plank = body.find("Plank").unwrap();
    let squat = body.find("Squat").unwrap();
    assert!(plank < squat);
}

#[tokio::test]
async fn test_exercises_list_hides_other_users() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "testuser", "password123").await;
    let other = common::create_test_user(&pool, "other", "password123").await;
    let cookie = common::create_session_cookie(&pool, &user).await;

    common::create_test_exercise(&pool, &other.id, "Secret Move").await;

    let response = common::get(common::create_test_app(pool), "/exercises", &cookie).await;

    let body = common::body_string(response).await;
    assert!(!body.contains("Secret Move"));
    assert!(body.contains("No exercises yet"));
}

#[tokio::test]
async fn test_exercise_detail_renders() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "testuser", "password123").await;
    let cookie = common::create_session_cookie(&pool, &user).await;
    let exercise = common::create_test_exercise(&pool, &user.id, "Squat").await;

    let response = common::get(
        common::create_test_app(pool),
        &format!("/exercises/{}", exercise.id),
        &cookie,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_string(response).await;
    assert!(body.contains("Squat"));
    assert!(body.contains("No description yet."));
}

#[tokio::test]
async fn test_update_exercise() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "testuser", "password123").await;
    let cookie = common::create_session_cookie(&pool, &user).await;
    let exercise = common::create_test_exercise(&pool, &user.id, "Squat").await;

    let page = common::get(
        common::create_test_app(pool.clone()),
        &format!("/exercises/{}/edit", exercise.id),
        &cookie,
    )
    .await;
    assert_eq!(page.status(), StatusCode::OK);
    assert!(common::body_string(page).await.contains("Edit exercise"));

    let response = common::post_form(
        common::create_test_app(pool.clone()),
        &format!("/exercises/{}", exercise.id),
        &cookie,
        "name=Front%20Squat&description=&image_url=https%3A%2F%2Fcdn.example.com%2Fsquat.png&video_url=",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let updated = ExerciseRepository::new(pool)
        .find_by_id(&exercise.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Front Squat");
    assert_eq!(updated.image_url, "https://cdn.example.com/squat.png");
}

#[tokio::test]
async fn test_update_exercise_requires_name() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "testuser", "password123").await;
    let cookie = common::create_session_cookie(&pool, &user).await;
    let exercise = common::create_test_exercise(&pool, &user.id, "Squat").await;

    let response = common::post_form(
        common::create_test_app(pool.clone()),
        &format!("/exercises/{}", exercise.id),
        &cookie,
        "name=%20",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::body_string(response).await.contains("Exercise name is required"));
    let unchanged = ExerciseRepository::new(pool)
        .find_by_id(&exercise.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.name, "Squat");
}

#[tokio::test]
async fn test_foreign_exercise_is_forbidden() {
    let pool = common::setup_test_db();
    let owner = common::create_test_user(&pool, "owner", "password123").await;
    let other = common::create_test_user(&pool, "other", "password123").await;
    let cookie = common::create_session_cookie(&pool, &other).await;
    let exercise = common::create_test_exercise(&pool, &owner.id, "Squat").await;

    let response = common::get(
        common::create_test_app(pool.clone()),
        &format!("/exercises/{}/edit", exercise.id),
        &cookie,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = common::post_form(
        common::create_test_app(pool.clone()),
        &format!("/exercises/{}/delete", exercise.id),
        &cookie,
        "",
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(ExerciseRepository::new(pool).find_by_id(&exercise.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_missing_exercise_is_not_found() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "testuser", "password123").await;
    let cookie = common::create_session_cookie(&pool, &user).await;

    let response = common::get(common::create_test_app(pool), "/exercises/nonexistent", &cookie).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_exercise_detaches_from_sessions() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "testuser", "password123").await;
    let cookie = common::create_session_cookie(&pool, &user).await;
    let exercise = common::create_test_exercise(&pool, &user.id, "Squat").await;
    let monday = common::create_test_session(&pool, &user.id, "Monday", "2024-01-08").await;
    let friday = common::create_test_session(&pool, &user.id, "Friday", "2024-01-12").await;
    common::attach_exercises(&pool, &monday.id, &[exercise.id.clone()]).await;
    common::attach_exercises(&pool, &friday.id, &[exercise.id.clone()]).await;

    let response = common::post_form(
        common::create_test_app(pool.clone()),
        &format!("/exercises/{}/delete", exercise.id),
        &cookie,
        "",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&response), "/exercises");

    let exercises = ExerciseRepository::new(pool.clone());
    assert!(exercises.find_all().await.unwrap().is_empty());
    assert!(exercises.find_by_id(&exercise.id).await.unwrap().is_none());

    let entries = SessionExerciseRepository::new(pool);
    assert!(entries.find_by_exercise(&exercise.id).await.unwrap().is_empty());
}
