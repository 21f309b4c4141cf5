//! Test database pools.
//!
//! The first caller builds a template database with migrations applied; every
//! test then copies that file into its own temp dir, which is much faster
//! than migrating each time.

use std::{str::FromStr, sync::OnceLock, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tempfile::TempDir;
use tokio::sync::OnceCell;

use crate::{
    DBService,
    models::{board::Board, card::Card, list::List, user::User},
};

static TEMPLATE_DIR: OnceLock<TempDir> = OnceLock::new();
static TEMPLATE_READY: OnceCell<()> = OnceCell::const_new();

fn get_template_dir() -> &'static TempDir {
    TEMPLATE_DIR.get_or_init(|| TempDir::new().expect("Failed to create template temp dir"))
}

async fn ensure_template_ready() {
    TEMPLATE_READY
        .get_or_init(|| async {
            let template_path = get_template_dir().path().join("template.db");

            let options =
                SqliteConnectOptions::from_str(&format!("sqlite://{}", template_path.display()))
                    .expect("Invalid template database URL")
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Delete);

            let pool = SqlitePoolOptions::new()
                .min_connections(0)
                .max_connections(1)
                .connect_with(options)
                .await
                .expect("Failed to create template pool");

            crate::migrate(&pool)
                .await
                .expect("Failed to run migrations on template");

            // Close the pool to release the file
            pool.close().await;
        })
        .await;
}

/// Create a test database pool with migrations applied.
///
/// Returns the pool and a TempDir that must be kept alive for the duration of
/// the test.
pub async fn create_test_pool() -> (SqlitePool, TempDir) {
    ensure_template_ready().await;

    let temp_dir = TempDir::new().expect("Failed to create test temp dir");
    let db_path = temp_dir.path().join("test.db");

    let template_path = get_template_dir().path().join("template.db");
    std::fs::copy(&template_path, &db_path).expect("Failed to copy template database");

    let options = crate::connect_options(&format!("sqlite://{}", db_path.display()))
        .expect("Invalid test database URL");

    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .expect("Failed to create test pool");

    (pool, temp_dir)
}

/// Same as [`create_test_pool`] wrapped in a [`DBService`].
pub async fn create_test_db() -> (DBService, TempDir) {
    let (pool, temp_dir) = create_test_pool().await;
    (DBService::from_pool(pool), temp_dir)
}

pub async fn seed_user(pool: &SqlitePool, email: &str) -> User {
    User::create(pool, email, "Test User", "not-a-real-hash")
        .await
        .expect("Failed to seed user")
}

pub async fn seed_board(pool: &SqlitePool, owner_id: i64, title: &str) -> Board {
    Board::create(pool, owner_id, title)
        .await
        .expect("Failed to seed board")
}

/// Append lists titled `titles` to `board_id` at positions 0..n.
pub async fn seed_lists(pool: &SqlitePool, board_id: i64, titles: &[&str]) -> Vec<List> {
    let start = List::find_by_board(pool, board_id)
        .await
        .expect("Failed to read lists")
        .len() as i64;
    let mut lists = Vec::with_capacity(titles.len());
    for (offset, title) in titles.iter().enumerate() {
        let list = List::insert(pool, board_id, title, start + offset as i64)
            .await
            .expect("Failed to seed list");
        lists.push(list);
    }
    lists
}

/// Append cards titled `titles` to `list_id` at positions 0..n.
pub async fn seed_cards(pool: &SqlitePool, list_id: i64, titles: &[&str]) -> Vec<Card> {
    let start = Card::find_by_list(pool, list_id)
        .await
        .expect("Failed to read cards")
        .len() as i64;
    let mut cards = Vec::with_capacity(titles.len());
    for (offset, title) in titles.iter().enumerate() {
        let card = Card::insert(pool, list_id, title, None, start + offset as i64)
            .await
            .expect("Failed to seed card");
        cards.push(card);
    }
    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_test_pool() {
        let (pool, _temp_dir) = create_test_pool().await;

        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM boards")
            .fetch_one(&pool)
            .await
            .expect("Failed to query boards table");

        assert_eq!(result.0, 0);
    }

    #[tokio::test]
    async fn test_template_reuse() {
        let (pool1, _temp1) = create_test_pool().await;
        let (pool2, _temp2) = create_test_pool().await;

        seed_user(&pool1, "one@example.com").await;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool2)
            .await
            .expect("Pool 2 should work");
        assert_eq!(count, 0, "test databases must not share rows");
    }
}
