pub mod exercise_repo;
pub mod login_repo;
pub mod session_exercise_repo;
pub mod session_repo;
pub mod user_repo;

pub use exercise_repo::ExerciseRepository;
pub use login_repo::LoginRepository;
pub use session_exercise_repo::SessionExerciseRepository;
pub use session_repo::SessionRepository;
pub use user_repo::UserRepository;
