use std::str::FromStr;

use db::{
    OwnershipResolver, Resource,
    models::{board::Board, card::Card, list::List, user::User},
};
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use tempfile::TempDir;

async fn setup_test_pool() -> (SqlitePool, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    let options =
        SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.to_string_lossy()))
            .expect("Invalid database URL")
            .create_if_missing(true)
            .foreign_keys(true);

    let pool = SqlitePool::connect_with(options)
        .await
        .expect("Failed to create pool");
    db::migrate(&pool).await.expect("Failed to run migrations");

    (pool, temp_dir)
}

struct Fixture {
    owner: User,
    board: Board,
    list: List,
    card: Card,
}

async fn fixture(pool: &SqlitePool) -> Fixture {
    let owner = User::create(pool, "owner@example.com", "Owner", "hash")
        .await
        .unwrap();
    let board = Board::create(pool, owner.id, "Roadmap").await.unwrap();
    let list = List::insert(pool, board.id, "Todo", 0).await.unwrap();
    let card = Card::insert(pool, list.id, "Ship it", None, 0)
        .await
        .unwrap();
    Fixture {
        owner,
        board,
        list,
        card,
    }
}

#[tokio::test]
async fn test_resolves_every_level_to_the_same_board() {
    let (pool, _temp_dir) = setup_test_pool().await;
    let f = fixture(&pool).await;
    let resolver = OwnershipResolver::new(&pool);

    for resource in [
        Resource::Board(f.board.id),
        Resource::List(f.list.id),
        Resource::Card(f.card.id),
    ] {
        let ownership = resolver
            .resolve(resource)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("{resource} should resolve"));
        assert_eq!(ownership.board_id, f.board.id);
        assert!(ownership.is_owned_by(f.owner.id));
    }
}

#[tokio::test]
async fn test_missing_ids_resolve_to_none() {
    let (pool, _temp_dir) = setup_test_pool().await;
    fixture(&pool).await;
    let resolver = OwnershipResolver::new(&pool);

    assert!(resolver.resolve(Resource::Board(999)).await.unwrap().is_none());
    assert!(resolver.resolve(Resource::List(999)).await.unwrap().is_none());
    assert!(resolver.resolve(Resource::Card(999)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_other_users_board_is_not_owned() {
    let (pool, _temp_dir) = setup_test_pool().await;
    let f = fixture(&pool).await;
    let intruder = User::create(&pool, "intruder@example.com", "Intruder", "hash")
        .await
        .unwrap();

    let ownership = OwnershipResolver::new(&pool)
        .resolve(Resource::Card(f.card.id))
        .await
        .unwrap()
        .unwrap();

    assert!(!ownership.is_owned_by(intruder.id));
}

#[tokio::test]
async fn test_card_stops_resolving_after_its_board_is_deleted() {
    let (pool, _temp_dir) = setup_test_pool().await;
    let f = fixture(&pool).await;

    assert_eq!(Board::delete(&pool, f.board.id).await.unwrap(), 1);

    let resolver = OwnershipResolver::new(&pool);
    assert!(resolver.resolve(Resource::List(f.list.id)).await.unwrap().is_none());
    assert!(resolver.resolve(Resource::Card(f.card.id)).await.unwrap().is_none());
}
