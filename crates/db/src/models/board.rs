use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite};
use ts_rs::TS;

use super::{card::Card, list::List};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[ts(type = "number")]
    pub id: i64,
    pub title: String,
    #[ts(type = "number")]
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoard {
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoard {
    pub title: Option<String>,
}

/// A list together with its cards, both in position order.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ListWithCards {
    #[serde(flatten)]
    pub list: List,
    pub cards: Vec<Card>,
}

/// Full board snapshot for rendering.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct BoardDetail {
    #[serde(flatten)]
    pub board: Board,
    pub lists: Vec<ListWithCards>,
}

impl BoardDetail {
    /// Group `cards` under their lists. Both inputs are expected in position
    /// order; cards whose list is not in `lists` are dropped.
    pub fn assemble(board: Board, lists: Vec<List>, cards: Vec<Card>) -> Self {
        let mut lists: Vec<ListWithCards> = lists
            .into_iter()
            .map(|list| ListWithCards {
                list,
                cards: Vec::new(),
            })
            .collect();

        for card in cards {
            if let Some(entry) = lists.iter_mut().find(|entry| entry.list.id == card.list_id) {
                entry.cards.push(card);
            }
        }

        Self { board, lists }
    }
}

impl Board {
    pub async fn find_by_id<'e, E>(executor: E, id: i64) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Board>(
            r#"SELECT id, title, owner_id, created_at, updated_at
            FROM boards
            WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    pub async fn find_by_owner<'e, E>(executor: E, owner_id: i64) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Board>(
            r#"SELECT id, title, owner_id, created_at, updated_at
            FROM boards
            WHERE owner_id = $1
            ORDER BY created_at ASC, id ASC"#,
        )
        .bind(owner_id)
        .fetch_all(executor)
        .await
    }

    pub async fn create<'e, E>(executor: E, owner_id: i64, title: &str) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Board>(
            r#"INSERT INTO boards (title, owner_id)
            VALUES ($1, $2)
            RETURNING id, title, owner_id, created_at, updated_at"#,
        )
        .bind(title)
        .bind(owner_id)
        .fetch_one(executor)
        .await
    }

    pub async fn update_title<'e, E>(
        executor: E,
        id: i64,
        title: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Board>(
            r#"UPDATE boards
            SET title = $1, updated_at = datetime('now', 'subsec')
            WHERE id = $2
            RETURNING id, title, owner_id, created_at, updated_at"#,
        )
        .bind(title)
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// Lists, cards and activity go with it via `ON DELETE CASCADE`.
    pub async fn delete<'e, E>(executor: E, id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
