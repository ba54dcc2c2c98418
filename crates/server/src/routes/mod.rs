use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

mod new_user;
pub use new_user::*;

mod users;
pub use users::*;

mod add_exercise;
pub use add_exercise::*;

mod log;
pub use log::*;

/// The API surface. Static assets and middleware are layered on in main so
/// tests can drive the bare router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/exercise/new-user", post(create_user))
        .route("/api/exercise/users", get(list_users))
        .route("/api/exercise/add", post(add_exercise))
        .route("/api/exercise/log", get(exercise_log))
        .with_state(state)
}
