use axum::{extract::Query, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    db::{
        model::{Exercise, LogFilter, User},
        DatabaseConnection,
    },
    parse_bound, AppError,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogParams {
    #[serde(default)]
    pub user_id: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct LogEntry {
    pub description: String,
    pub duration: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct LogResponse {
    pub username: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    pub count: usize,
    pub log: Vec<LogEntry>,
}

/// Splits a raw range bound into its echoed and parsed forms; unparseable
/// bounds are dropped from both
fn bound(raw: Option<String>) -> (Option<String>, Option<NaiveDate>) {
    match raw {
        Some(raw) => match parse_bound(&raw) {
            Some(date) => (Some(raw), Some(date)),
            None => (None, None),
        },
        None => (None, None),
    }
}

#[instrument]
pub async fn exercise_log(
    DatabaseConnection(conn): DatabaseConnection,
    Query(params): Query<LogParams>,
) -> Result<Json<LogResponse>, AppError> {
    let response = conn
        .interact(move |conn| {
            let user = User::fetch_by_id(conn, &params.user_id)?
                .ok_or_else(|| AppError::validation("Invalid userId."))?;

            let (from_echo, from) = bound(params.from);
            let (to_echo, to) = bound(params.to);
            let filter = LogFilter { from, to, limit: params.limit };
            debug!(username = %user.username, ?filter, "querying exercise log");

            let log: Vec<LogEntry> = Exercise::fetch_log(conn, &user.id, filter)?
                .into_iter()
                .map(|e| LogEntry {
                    description: e.description,
                    duration: e.duration,
                    date: e.date,
                })
                .collect();

            Ok::<_, AppError>(LogResponse {
                username: user.username,
                id: user.id,
                from: from_echo,
                to: to_echo,
                limit: filter.limit,
                count: log.len(),
                log,
            })
        })
        .await??;

    Ok(Json(response))
}
