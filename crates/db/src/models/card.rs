use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{Executor, FromRow, Sqlite};
use ts_rs::TS;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    #[ts(type = "number")]
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Zero-based, dense within the list
    #[ts(type = "number")]
    pub position: i64,
    #[ts(type = "number")]
    pub list_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateCard {
    pub title: String,
    #[ts(type = "number")]
    pub list_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    /// Omit to append at the end of the list
    #[serde(default)]
    #[ts(type = "number | null")]
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCard {
    #[serde(default)]
    pub title: Option<String>,
    /// Absent leaves the description alone, `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    #[ts(type = "string | null")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    #[ts(type = "number | null")]
    pub position: Option<i64>,
    /// Destination list for a move; may equal the current list.
    #[serde(default)]
    #[ts(type = "number | null")]
    pub list_id: Option<i64>,
}

/// Distinguishes an explicit `null` from a missing field.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl Card {
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Card>(
            r#"SELECT id, title, description, position, list_id, created_at, updated_at
            FROM cards
            WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// All cards of a list in position order.
    pub async fn find_by_list<'e, E>(executor: E, list_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Card>(
            r#"SELECT id, title, description, position, list_id, created_at, updated_at
            FROM cards
            WHERE list_id = $1
            ORDER BY position ASC, id ASC"#,
        )
        .bind(list_id)
        .fetch_all(executor)
        .await
    }

    /// Every card on a board, ordered by list position then card position.
    pub async fn find_by_board<'e, E>(executor: E, board_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Card>(
            r#"SELECT c.id, c.title, c.description, c.position, c.list_id,
                      c.created_at, c.updated_at
            FROM cards c
            JOIN lists l ON l.id = c.list_id
            WHERE l.board_id = $1
            ORDER BY l.position ASC, c.position ASC, c.id ASC"#,
        )
        .bind(board_id)
        .fetch_all(executor)
        .await
    }

    /// Insert at `position`. The caller must have opened the slot first.
    pub async fn insert<'e, E>(
        executor: E,
        list_id: i64,
        title: &str,
        description: Option<&str>,
        position: i64,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Card>(
            r#"INSERT INTO cards (title, description, position, list_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, position, list_id, created_at, updated_at"#,
        )
        .bind(title)
        .bind(description)
        .bind(position)
        .bind(list_id)
        .fetch_one(executor)
        .await
    }

    pub async fn update_content<'e, E>(
        executor: E,
        id: i64,
        title: &str,
        description: Option<&str>,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"UPDATE cards
            SET title = $1, description = $2, updated_at = datetime('now', 'subsec')
            WHERE id = $3"#,
        )
        .bind(title)
        .bind(description)
        .bind(id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
