use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ActivityAction {
    BoardCreated,
    BoardUpdated,
    ListCreated,
    ListUpdated,
    ListMoved,
    ListDeleted,
    CardCreated,
    CardUpdated,
    CardMoved,
    CardDeleted,
}

/// One append-only log row.
#[derive(Debug, Clone, FromRow, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[ts(type = "number")]
    pub id: i64,
    #[ts(type = "number")]
    pub user_id: i64,
    #[ts(type = "number")]
    pub board_id: i64,
    #[ts(type = "number | null")]
    pub list_id: Option<i64>,
    #[ts(type = "number | null")]
    pub card_id: Option<i64>,
    pub action: ActivityAction,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct NewActivity {
    pub user_id: i64,
    pub board_id: i64,
    pub list_id: Option<i64>,
    pub card_id: Option<i64>,
    pub action: ActivityAction,
}

impl NewActivity {
    pub fn board(user_id: i64, board_id: i64, action: ActivityAction) -> Self {
        Self {
            user_id,
            board_id,
            list_id: None,
            card_id: None,
            action,
        }
    }

    pub fn list(user_id: i64, board_id: i64, list_id: i64, action: ActivityAction) -> Self {
        Self {
            list_id: Some(list_id),
            ..Self::board(user_id, board_id, action)
        }
    }

    pub fn card(
        user_id: i64,
        board_id: i64,
        list_id: i64,
        card_id: i64,
        action: ActivityAction,
    ) -> Self {
        Self {
            card_id: Some(card_id),
            ..Self::list(user_id, board_id, list_id, action)
        }
    }
}

impl Activity {
    pub async fn record<'e, E>(executor: E, entry: &NewActivity) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"INSERT INTO activities (user_id, board_id, list_id, card_id, action)
            VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(entry.user_id)
        .bind(entry.board_id)
        .bind(entry.list_id)
        .bind(entry.card_id)
        .bind(entry.action)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Newest first.
    pub async fn find_by_board<'e, E>(
        executor: E,
        board_id: i64,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Activity>(
            r#"SELECT id, user_id, board_id, list_id, card_id, action, created_at
            FROM activities
            WHERE board_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2"#,
        )
        .bind(board_id)
        .bind(limit)
        .fetch_all(executor)
        .await
    }
}
