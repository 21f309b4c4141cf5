use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite};
use ts_rs::TS;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct List {
    #[ts(type = "number")]
    pub id: i64,
    pub title: String,
    /// Zero-based, dense within the board
    #[ts(type = "number")]
    pub position: i64,
    #[ts(type = "number")]
    pub board_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateList {
    pub title: String,
    #[ts(type = "number")]
    pub board_id: i64,
    /// Omit to append at the end of the board
    #[serde(default)]
    #[ts(type = "number | null")]
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateList {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    #[ts(type = "number | null")]
    pub position: Option<i64>,
}

impl List {
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, List>(
            r#"SELECT id, title, position, board_id, created_at, updated_at
            FROM lists
            WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// All lists of a board in position order.
    pub async fn find_by_board<'e, E>(executor: E, board_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, List>(
            r#"SELECT id, title, position, board_id, created_at, updated_at
            FROM lists
            WHERE board_id = $1
            ORDER BY position ASC, id ASC"#,
        )
        .bind(board_id)
        .fetch_all(executor)
        .await
    }

    /// Insert at `position`. The caller must have opened the slot first.
    pub async fn insert<'e, E>(
        executor: E,
        board_id: i64,
        title: &str,
        position: i64,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, List>(
            r#"INSERT INTO lists (title, position, board_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, position, board_id, created_at, updated_at"#,
        )
        .bind(title)
        .bind(position)
        .bind(board_id)
        .fetch_one(executor)
        .await
    }

    pub async fn update_title<'e, E>(executor: E, id: i64, title: &str) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"UPDATE lists
            SET title = $1, updated_at = datetime('now', 'subsec')
            WHERE id = $2"#,
        )
        .bind(title)
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
