use db::{
    DBService, PositionSequencer, Resource,
    models::{
        activity::{Activity, ActivityAction, NewActivity},
        list::{CreateList, List, UpdateList},
    },
};
use tracing::{info, instrument};

use super::{authorization::authorize, error::ServiceError, validation::Validator};

/// Lists within a board, kept in dense position order.
#[derive(Clone)]
pub struct ListService {
    db: DBService,
    sequencer: PositionSequencer,
}

impl ListService {
    pub fn new(db: DBService) -> Self {
        Self {
            db,
            sequencer: PositionSequencer::lists(),
        }
    }

    /// Insert at the requested position, or append when none is given.
    #[instrument(
        name = "lists.create",
        skip(self, payload),
        fields(board_id = payload.board_id)
    )]
    pub async fn create(&self, user_id: i64, payload: &CreateList) -> Result<List, ServiceError> {
        Validator::new()
            .title("title", &payload.title)
            .position("position", payload.position)
            .finish()?;
        authorize(self.db.pool(), user_id, Resource::Board(payload.board_id)).await?;

        let mut tx = self.db.begin_write().await?;
        let position = self
            .sequencer
            .open_slot(&mut tx, payload.board_id, payload.position)
            .await?;
        let list = List::insert(&mut *tx, payload.board_id, payload.title.trim(), position).await?;
        Activity::record(
            &mut *tx,
            &NewActivity::list(user_id, list.board_id, list.id, ActivityAction::ListCreated),
        )
        .await?;
        tx.commit().await?;

        info!(list_id = list.id, position, "list created");
        Ok(list)
    }

    #[instrument(name = "lists.get", skip(self))]
    pub async fn get(&self, user_id: i64, list_id: i64) -> Result<List, ServiceError> {
        authorize(self.db.pool(), user_id, Resource::List(list_id)).await?;
        List::find_by_id(self.db.pool(), list_id)
            .await?
            .ok_or(ServiceError::NotFound("list"))
    }

    #[instrument(name = "lists.for_board", skip(self))]
    pub async fn list_for_board(&self, user_id: i64, board_id: i64) -> Result<Vec<List>, ServiceError> {
        authorize(self.db.pool(), user_id, Resource::Board(board_id)).await?;
        Ok(List::find_by_board(self.db.pool(), board_id).await?)
    }

    /// Rename and/or reposition within the board. Both happen in one
    /// transaction.
    #[instrument(name = "lists.update", skip(self, payload))]
    pub async fn update(
        &self,
        user_id: i64,
        list_id: i64,
        payload: &UpdateList,
    ) -> Result<List, ServiceError> {
        Validator::new()
            .optional_title("title", payload.title.as_deref())
            .position("position", payload.position)
            .finish()?;
        authorize(self.db.pool(), user_id, Resource::List(list_id)).await?;

        let mut tx = self.db.begin_write().await?;
        let current = List::find_by_id(&mut *tx, list_id)
            .await?
            .ok_or(ServiceError::NotFound("list"))?;

        if let Some(title) = payload.title.as_deref() {
            List::update_title(&mut *tx, list_id, title.trim()).await?;
            Activity::record(
                &mut *tx,
                &NewActivity::list(user_id, current.board_id, list_id, ActivityAction::ListUpdated),
            )
            .await?;
        }

        if let Some(requested) = payload.position {
            let position = self
                .sequencer
                .reposition(&mut tx, current.board_id, list_id, current.position, requested)
                .await?;
            if position != current.position {
                Activity::record(
                    &mut *tx,
                    &NewActivity::list(user_id, current.board_id, list_id, ActivityAction::ListMoved),
                )
                .await?;
                info!(from = current.position, to = position, "list moved");
            }
        }

        let list = List::find_by_id(&mut *tx, list_id)
            .await?
            .ok_or(ServiceError::NotFound("list"))?;
        tx.commit().await?;

        Ok(list)
    }

    /// Delete the list and its cards, closing the gap among its siblings.
    #[instrument(name = "lists.delete", skip(self))]
    pub async fn delete(&self, user_id: i64, list_id: i64) -> Result<(), ServiceError> {
        let ownership = authorize(self.db.pool(), user_id, Resource::List(list_id)).await?;

        let mut tx = self.db.begin_write().await?;
        let position = self
            .sequencer
            .remove(&mut tx, ownership.board_id, list_id)
            .await?
            .ok_or(ServiceError::NotFound("list"))?;
        Activity::record(
            &mut *tx,
            &NewActivity::list(user_id, ownership.board_id, list_id, ActivityAction::ListDeleted),
        )
        .await?;
        tx.commit().await?;

        info!(position, "list deleted");
        Ok(())
    }
}
