use db::{
    DBService, Resource,
    models::{
        activity::{Activity, ActivityAction, NewActivity},
        board::{Board, BoardDetail, CreateBoard, UpdateBoard},
        card::Card,
        list::List,
    },
};
use tracing::{info, instrument};

use super::{authorization::authorize, error::ServiceError, validation::Validator};

/// Board CRUD. Boards have no siblings to keep in order, so every mutation
/// is a single row write plus its activity entry.
#[derive(Clone)]
pub struct BoardService {
    db: DBService,
}

impl BoardService {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    #[instrument(name = "boards.create", skip(self, payload))]
    pub async fn create(&self, user_id: i64, payload: &CreateBoard) -> Result<Board, ServiceError> {
        Validator::new().title("title", &payload.title).finish()?;

        let mut tx = self.db.begin_write().await?;
        let board = Board::create(&mut *tx, user_id, payload.title.trim()).await?;
        Activity::record(
            &mut *tx,
            &NewActivity::board(user_id, board.id, ActivityAction::BoardCreated),
        )
        .await?;
        tx.commit().await?;

        info!(board_id = board.id, "board created");
        Ok(board)
    }

    #[instrument(name = "boards.list", skip(self))]
    pub async fn list_for_owner(&self, user_id: i64) -> Result<Vec<Board>, ServiceError> {
        Ok(Board::find_by_owner(self.db.pool(), user_id).await?)
    }

    #[instrument(name = "boards.get", skip(self))]
    pub async fn get(&self, user_id: i64, board_id: i64) -> Result<Board, ServiceError> {
        authorize(self.db.pool(), user_id, Resource::Board(board_id)).await?;
        Board::find_by_id(self.db.pool(), board_id)
            .await?
            .ok_or(ServiceError::NotFound("board"))
    }

    /// The board with its lists and each list's cards, read from one
    /// snapshot.
    #[instrument(name = "boards.detail", skip(self))]
    pub async fn get_detail(&self, user_id: i64, board_id: i64) -> Result<BoardDetail, ServiceError> {
        authorize(self.db.pool(), user_id, Resource::Board(board_id)).await?;

        let mut tx = self.db.begin().await?;
        let board = Board::find_by_id(&mut *tx, board_id)
            .await?
            .ok_or(ServiceError::NotFound("board"))?;
        let lists = List::find_by_board(&mut *tx, board_id).await?;
        let cards = Card::find_by_board(&mut *tx, board_id).await?;
        tx.commit().await?;

        Ok(BoardDetail::assemble(board, lists, cards))
    }

    #[instrument(name = "boards.update", skip(self, payload))]
    pub async fn update(
        &self,
        user_id: i64,
        board_id: i64,
        payload: &UpdateBoard,
    ) -> Result<Board, ServiceError> {
        Validator::new()
            .optional_title("title", payload.title.as_deref())
            .finish()?;
        authorize(self.db.pool(), user_id, Resource::Board(board_id)).await?;

        let Some(title) = payload.title.as_deref() else {
            return Board::find_by_id(self.db.pool(), board_id)
                .await?
                .ok_or(ServiceError::NotFound("board"));
        };

        let mut tx = self.db.begin_write().await?;
        let board = Board::update_title(&mut *tx, board_id, title.trim())
            .await?
            .ok_or(ServiceError::NotFound("board"))?;
        Activity::record(
            &mut *tx,
            &NewActivity::board(user_id, board_id, ActivityAction::BoardUpdated),
        )
        .await?;
        tx.commit().await?;

        Ok(board)
    }

    /// Lists, cards and the board's activity go with it.
    #[instrument(name = "boards.delete", skip(self))]
    pub async fn delete(&self, user_id: i64, board_id: i64) -> Result<(), ServiceError> {
        authorize(self.db.pool(), user_id, Resource::Board(board_id)).await?;

        if Board::delete(self.db.pool(), board_id).await? == 0 {
            return Err(ServiceError::NotFound("board"));
        }

        info!("board deleted");
        Ok(())
    }
}
