use chrono::NaiveDate;
use exemplar::Model;
use rusqlite::Connection;
use sea_query::{enum_def, Expr, Query, SqliteQueryBuilder};
use sea_query_rusqlite::RusqliteBinder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Model, Serialize, Deserialize)]
#[table("exercise")]
#[check("../../../migrations/002-exercise/up.sql")]
#[enum_def]
pub struct Exercise {
    pub id: i64,
    pub user_id: String,
    pub description: String,
    pub duration: f64,
    pub date: NaiveDate,
}

// No #[check] here: the schema check wants a field for every column and
// NewExercise leaves the autoincrement id to the store
#[derive(Debug, Clone, PartialEq, Model)]
#[table("exercise")]
pub struct NewExercise {
    pub user_id: String,
    pub description: String,
    pub duration: f64,
    pub date: NaiveDate,
}

/// Optional narrowing of the log query
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u64>,
}

impl Exercise {
    pub fn fetch_by_id(conn: &Connection, id: i64) -> Result<Exercise, rusqlite::Error> {
        let (sql, values) = Query::select()
            .columns([
                ExerciseIden::Id,
                ExerciseIden::UserId,
                ExerciseIden::Description,
                ExerciseIden::Duration,
                ExerciseIden::Date,
            ])
            .from(ExerciseIden::Table)
            .and_where(Expr::col(ExerciseIden::Id).eq(id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let exercise = stmt.query_row(&*values.as_params(), Exercise::from_row)?;
        Ok(exercise)
    }

    pub fn create(
        conn: &mut Connection,
        new_exercise: NewExercise,
    ) -> Result<Exercise, rusqlite::Error> {
        let tx = conn.transaction()?;
        let exercise = {
            new_exercise.insert(&tx)?;
            Exercise::fetch_by_id(&tx, tx.last_insert_rowid())?
        };
        tx.commit()?;

        Ok(exercise)
    }

    /// All of a user's exercises, optionally narrowed by date range and
    /// capped to `limit` rows, in insertion order
    pub fn fetch_log(
        conn: &Connection,
        user_id: &str,
        filter: LogFilter,
    ) -> Result<Vec<Exercise>, rusqlite::Error> {
        let mut query = Query::select();
        query
            .columns([
                ExerciseIden::Id,
                ExerciseIden::UserId,
                ExerciseIden::Description,
                ExerciseIden::Duration,
                ExerciseIden::Date,
            ])
            .from(ExerciseIden::Table)
            .and_where(Expr::col(ExerciseIden::UserId).eq(user_id));

        if let Some(from) = filter.from {
            query.and_where(Expr::col(ExerciseIden::Date).gte(from));
        }
        if let Some(to) = filter.to {
            query.and_where(Expr::col(ExerciseIden::Date).lte(to));
        }
        if let Some(limit) = filter.limit {
            query.limit(limit);
        }

        let (sql, values) = query.build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let log = stmt
            .query_map(&*values.as_params(), Exercise::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(log)
    }
}
