use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fitplan::config::Config;
use fitplan::handlers::{auth, exercises, planner};
use fitplan::media::MediaResolver;
use fitplan::repositories::{
    ExerciseRepository, LoginRepository, SessionExerciseRepository, SessionRepository,
    UserRepository,
};
use fitplan::{db, migrations, routes, version};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fitplan=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!("Starting fitplan {}", version::GIT_VERSION);
    tracing::info!("Connecting to database: {}", config.database_url);

    let pool = db::create_pool(&config.database_url)?;
    migrations::run_migrations(&pool)?;

    // Create repositories
    let user_repo = UserRepository::new(pool.clone());
    let login_repo = LoginRepository::new(pool.clone());
    let exercise_repo = ExerciseRepository::new(pool.clone());
    let session_repo = SessionRepository::new(pool.clone());
    let session_exercise_repo = SessionExerciseRepository::new(pool.clone());

    let expired = login_repo.cleanup_expired().await?;
    if expired > 0 {
        tracing::info!("Removed {} expired logins", expired);
    }

    if config.storage_url.is_empty() {
        tracing::warn!("STORAGE_URL is not set; only absolute media URLs will resolve");
    }
    let media = MediaResolver::new(&config.storage_url, &config.media_bucket);

    // Create handler states
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

    let app = routes::create_router(auth_state, planner_state, exercises_state);

    let addr = config.server_addr();
    tracing::info!("Starting server at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
