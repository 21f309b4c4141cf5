//! Walks the containment chain card → list → board → owner.

use std::fmt;

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

/// Something a user can act on, identified by its row id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Resource {
    Board(i64),
    List(i64),
    Card(i64),
}

impl Resource {
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Board(_) => "board",
            Resource::List(_) => "list",
            Resource::Card(_) => "card",
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            Resource::Board(id) | Resource::List(id) | Resource::Card(id) => id,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// The board a resource lives on and the user who owns that board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct Ownership {
    pub board_id: i64,
    pub owner_id: i64,
}

impl Ownership {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }
}

pub struct OwnershipResolver<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OwnershipResolver<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Resolve the owning board and owner of `resource` in one statement.
    ///
    /// Returns `None` when the id is missing at any level of the chain.
    pub async fn resolve(&self, resource: Resource) -> Result<Option<Ownership>, sqlx::Error> {
        let sql = match resource {
            Resource::Board(_) => {
                r#"SELECT b.id AS board_id, b.owner_id AS owner_id
                   FROM boards b
                   WHERE b.id = $1"#
            }
            Resource::List(_) => {
                r#"SELECT b.id AS board_id, b.owner_id AS owner_id
                   FROM lists l
                   JOIN boards b ON b.id = l.board_id
                   WHERE l.id = $1"#
            }
            Resource::Card(_) => {
                r#"SELECT b.id AS board_id, b.owner_id AS owner_id
                   FROM cards c
                   JOIN lists l ON l.id = c.list_id
                   JOIN boards b ON b.id = l.board_id
                   WHERE c.id = $1"#
            }
        };

        sqlx::query_as::<_, Ownership>(sql)
            .bind(resource.id())
            .fetch_optional(self.pool)
            .await
    }
}
