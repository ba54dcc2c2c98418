use axum::{Form, Json};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    db::{
        is_unique_violation,
        model::{NewUser, User},
        DatabaseConnection,
    },
    AppError,
};

#[derive(Debug, Deserialize)]
pub struct NewUserForm {
    #[serde(default)]
    pub username: String,
}

#[instrument]
pub async fn create_user(
    DatabaseConnection(conn): DatabaseConnection,
    Form(form): Form<NewUserForm>,
) -> Result<Json<User>, AppError> {
    let username = form.username;
    if username.is_empty() {
        return Err(AppError::validation("Username is required."));
    }

    let user = conn
        .interact(move |conn| {
            let conflict = |u: &str| {
                AppError::validation(format!("{u} already exists in database."))
            };

            if User::fetch_by_username(conn, &username)?.is_some() {
                return Err(conflict(&username));
            }

            match User::create(conn, NewUser::new(username.clone())) {
                // Two racing registrations can both pass the probe above; the
                // unique constraint on username picks the winner
                Err(e) if is_unique_violation(&e) => Err(conflict(&username)),
                r => Ok(r?),
            }
        })
        .await??;

    Ok(Json(user))
}
