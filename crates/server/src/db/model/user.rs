use exemplar::Model;
use rand::Rng;
use rusqlite::{Connection, OptionalExtension};
use sea_query::{enum_def, Expr, Query, SqliteQueryBuilder};
use sea_query_rusqlite::RusqliteBinder;
use serde::{Deserialize, Serialize};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LENGTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Model, Serialize, Deserialize)]
#[table("user")]
#[check("../../../migrations/001-user/up.sql")]
#[enum_def]
pub struct User {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Model)]
#[table("user")]
#[check("../../../migrations/001-user/up.sql")]
pub struct NewUser {
    pub id: String,
    pub username: String,
}

impl NewUser {
    /// Pairs `username` with a freshly generated opaque id
    pub fn new(username: String) -> Self {
        NewUser { id: generate_id(), username }
    }
}

/// 8 random base-36 characters. Collisions are negligible at this scale and
/// would surface as a primary key violation rather than silent corruption.
fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

impl User {
    pub fn fetch_by_id(conn: &Connection, id: &str) -> Result<Option<User>, rusqlite::Error> {
        let (sql, values) = Query::select()
            .columns([UserIden::Id, UserIden::Username])
            .from(UserIden::Table)
            .and_where(Expr::col(UserIden::Id).eq(id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let user = stmt.query_row(&*values.as_params(), User::from_row).optional()?;
        Ok(user)
    }

    pub fn fetch_by_username(
        conn: &Connection,
        username: &str,
    ) -> Result<Option<User>, rusqlite::Error> {
        let (sql, values) = Query::select()
            .columns([UserIden::Id, UserIden::Username])
            .from(UserIden::Table)
            .and_where(Expr::col(UserIden::Username).eq(username))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let user = stmt.query_row(&*values.as_params(), User::from_row).optional()?;
        Ok(user)
    }

    pub fn fetch_all(conn: &Connection) -> Result<Vec<User>, rusqlite::Error> {
        let (sql, values) = Query::select()
            .columns([UserIden::Id, UserIden::Username])
            .from(UserIden::Table)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let users = stmt
            .query_map(&*values.as_params(), User::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(users)
    }

    pub fn create(conn: &Connection, new_user: NewUser) -> Result<User, rusqlite::Error> {
        new_user.insert(conn)?;
        let NewUser { id, username } = new_user;
        Ok(User { id, username })
    }
}
