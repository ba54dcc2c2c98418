use axum::Json;
use tracing::instrument;

use crate::{
    db::{model::User, DatabaseConnection},
    AppError,
};

#[instrument]
pub async fn list_users(
    DatabaseConnection(conn): DatabaseConnection,
) -> Result<Json<Vec<User>>, AppError> {
    let users = conn
        .interact(|conn| Ok::<_, AppError>(User::fetch_all(conn)?))
        .await??;

    Ok(Json(users))
}
