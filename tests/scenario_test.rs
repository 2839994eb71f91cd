mod common;

use chrono::NaiveDate;
use fitplan::models::CreateExercise;
use fitplan::repositories::{ExerciseRepository, SessionExerciseRepository, SessionRepository};
use fitplan::state::{DayPhase, DayPlan, SessionExerciseStore, SessionStore};

#[tokio::test]
async fn test_plan_a_leg_day() {
    let pool = common::setup_test_db();
    let exercises = ExerciseRepository::new(pool.clone());
    let sessions = SessionRepository::new(pool.clone());
    let entries = SessionExerciseRepository::new(pool.clone());
    let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

    let push_ups = exercises
        .create(
            None,
            CreateExercise {
                name: "Push Ups".to_string(),
                description: None,
                image_url: String::new(),
                video_url: String::new(),
            },
        )
        .await
        .unwrap();
    let leg_day = sessions.create(None, "Leg Day", date).await.unwrap();

    let by_date = sessions.find_by_date(date).await.unwrap();
    assert!(by_date.iter().any(|s| s.id == leg_day.id));

    entries
        .add_many(&leg_day.id, &[push_ups.id.clone()])
        .await
        .unwrap();

    let attached = entries.find_by_session(&leg_day.id).await.unwrap();
    assert_eq!(attached.len(), 1);
    let exercise = attached[0].exercise.as_ref().unwrap();
    assert_eq!(exercise.name, "Push Ups");
    assert_eq!(exercise.image_url, "");
    assert_eq!(exercise.video_url, "");
}

#[tokio::test]
async fn test_day_plan_walks_through_phases() {
    let pool = common::setup_test_db();
    let user = common::create_test_user(&pool, "athlete", "password123").await;
    let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

    let mut sessions = SessionStore::new(SessionRepository::new(pool.clone()), Some(&user.id));
    let mut entries = SessionExerciseStore::new(SessionExerciseRepository::new(pool.clone()));

    let plan = DayPlan::load(&mut sessions, &mut entries, date).await;
    assert_eq!(plan.phase(), DayPhase::NoSession);

    let session = sessions.create("Leg Day", date).await.unwrap();
    let plan = DayPlan::load(&mut sessions, &mut entries, date).await;
    assert_eq!(plan.phase(), DayPhase::SessionWithoutExercises);

    let squat = common::create_test_exercise(&pool, &user.id, "Squat").await;
    let lunge = common::create_test_exercise(&pool, &user.id, "Lunge").await;
    let added = entries
        .add_many(&session.id, &[squat.id, lunge.id])
        .await
        .unwrap();
    entries.toggle(&added[0].id).await.unwrap();

    let plan = DayPlan::load(&mut sessions, &mut entries, date).await;
    assert_eq!(plan.phase(), DayPhase::SessionWithExercises);
    assert_eq!(plan.sessions[0].entries.len(), 2);
    assert_eq!(plan.sessions[0].completed_count(), 1);
}

#[tokio::test]
async fn test_deleted_exercise_leaves_list() {
    let pool = common::setup_test_db();
    let exercises = ExerciseRepository::new(pool);

    let squat = exercises
        .create(
            None,
            CreateExercise {
                name: "Squat".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(exercises.delete(&squat.id, None).await.unwrap());

    assert!(exercises.find_all().await.unwrap().iter().all(|e| e.id != squat.id));
    assert!(exercises.find_by_id(&squat.id).await.unwrap().is_none());
}
