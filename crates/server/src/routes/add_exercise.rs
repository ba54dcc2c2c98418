use axum::{Form, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    db::{
        model::{Exercise, NewExercise, User},
        DatabaseConnection,
    },
    resolve_date, AppError,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddExerciseForm {
    #[serde(default)]
    pub user_id: String,
    pub description: Option<String>,
    pub duration: Option<f64>,
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddExerciseResponse {
    pub username: String,
    pub id: i64,
    pub description: String,
    pub duration: f64,
    pub date: NaiveDate,
}

#[instrument]
pub async fn add_exercise(
    DatabaseConnection(conn): DatabaseConnection,
    Form(form): Form<AddExerciseForm>,
) -> Result<Json<AddExerciseResponse>, AppError> {
    let response = conn
        .interact(move |conn| {
            let user = User::fetch_by_id(conn, &form.user_id)?
                .ok_or_else(|| AppError::validation("Invalid userId."))?;

            let description = form
                .description
                .ok_or_else(|| AppError::validation("Description required."))?;
            let duration = form
                .duration
                .ok_or_else(|| AppError::validation("Duration required."))?;
            if duration <= 0.0 {
                return Err(AppError::validation("Duration must be greater than 0."));
            }

            let date = resolve_date(form.date.as_deref())
                .map_err(|e| AppError::validation(e.to_string()))?;

            let exercise = Exercise::create(conn, NewExercise {
                user_id: user.id,
                description,
                duration,
                date,
            })?;

            Ok::<_, AppError>(AddExerciseResponse {
                username: user.username,
                id: exercise.id,
                description: exercise.description,
                duration: exercise.duration,
                date: exercise.date,
            })
        })
        .await??;

    Ok(Json(response))
}
