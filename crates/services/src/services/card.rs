use db::{
    DBService, PositionSequencer, Resource,
    models::{
        activity::{Activity, ActivityAction, NewActivity},
        card::{Card, CreateCard, UpdateCard},
    },
};
use tracing::{info, instrument};

use super::{authorization::authorize, error::ServiceError, validation::Validator};

/// Cards within a list, kept in dense position order. Cards can also move to
/// another list, which renumbers both.
#[derive(Clone)]
pub struct CardService {
    db: DBService,
    sequencer: PositionSequencer,
}

impl CardService {
    pub fn new(db: DBService) -> Self {
        Self {
            db,
            sequencer: PositionSequencer::cards(),
        }
    }

    #[instrument(
        name = "cards.create",
        skip(self, payload),
        fields(list_id = payload.list_id)
    )]
    pub async fn create(&self, user_id: i64, payload: &CreateCard) -> Result<Card, ServiceError> {
        Validator::new()
            .title("title", &payload.title)
            .description("description", payload.description.as_deref())
            .position("position", payload.position)
            .finish()?;
        let ownership = authorize(self.db.pool(), user_id, Resource::List(payload.list_id)).await?;

        let mut tx = self.db.begin_write().await?;
        let position = self
            .sequencer
            .open_slot(&mut tx, payload.list_id, payload.position)
            .await?;
        let card = Card::insert(
            &mut *tx,
            payload.list_id,
            payload.title.trim(),
            payload.description.as_deref(),
            position,
        )
        .await?;
        Activity::record(
            &mut *tx,
            &NewActivity::card(
                user_id,
                ownership.board_id,
                card.list_id,
                card.id,
                ActivityAction::CardCreated,
            ),
        )
        .await?;
        tx.commit().await?;

        info!(card_id = card.id, position, "card created");
        Ok(card)
    }

    #[instrument(name = "cards.get", skip(self))]
    pub async fn get(&self, user_id: i64, card_id: i64) -> Result<Card, ServiceError> {
        authorize(self.db.pool(), user_id, Resource::Card(card_id)).await?;
        Card::find_by_id(self.db.pool(), card_id)
            .await?
            .ok_or(ServiceError::NotFound("card"))
    }

    #[instrument(name = "cards.for_list", skip(self))]
    pub async fn list_for_list(&self, user_id: i64, list_id: i64) -> Result<Vec<Card>, ServiceError> {
        authorize(self.db.pool(), user_id, Resource::List(list_id)).await?;
        Ok(Card::find_by_list(self.db.pool(), list_id).await?)
    }

    /// Edit content, reposition within the list, or move to another list.
    ///
    /// A `list_id`, when given, must also belong to the caller; both checks
    /// finish before anything is written. Whether that makes the update a
    /// move is decided against the card as read inside the transaction.
    #[instrument(name = "cards.update", skip(self, payload))]
    pub async fn update(
        &self,
        user_id: i64,
        card_id: i64,
        payload: &UpdateCard,
    ) -> Result<Card, ServiceError> {
        Validator::new()
            .optional_title("title", payload.title.as_deref())
            .description(
                "description",
                payload.description.as_ref().and_then(|d| d.as_deref()),
            )
            .position("position", payload.position)
            .finish()?;

        let source = authorize(self.db.pool(), user_id, Resource::Card(card_id)).await?;
        let destination = match payload.list_id {
            Some(list_id) => Some((
                list_id,
                authorize(self.db.pool(), user_id, Resource::List(list_id)).await?,
            )),
            None => None,
        };

        let mut tx = self.db.begin_write().await?;
        let current = Card::find_by_id(&mut *tx, card_id)
            .await?
            .ok_or(ServiceError::NotFound("card"))?;

        if payload.title.is_some() || payload.description.is_some() {
            let title = payload
                .title
                .as_deref()
                .map(str::trim)
                .unwrap_or(&current.title);
            let description = match &payload.description {
                Some(description) => description.as_deref(),
                None => current.description.as_deref(),
            };
            Card::update_content(&mut *tx, card_id, title, description).await?;
            Activity::record(
                &mut *tx,
                &NewActivity::card(
                    user_id,
                    source.board_id,
                    current.list_id,
                    card_id,
                    ActivityAction::CardUpdated,
                ),
            )
            .await?;
        }

        match destination {
            Some((list_id, dest)) if list_id != current.list_id => {
                let position = self
                    .sequencer
                    .move_across(
                        &mut tx,
                        card_id,
                        current.list_id,
                        list_id,
                        current.position,
                        payload.position,
                    )
                    .await?;
                Activity::record(
                    &mut *tx,
                    &NewActivity::card(
                        user_id,
                        dest.board_id,
                        list_id,
                        card_id,
                        ActivityAction::CardMoved,
                    ),
                )
                .await?;
                info!(
                    from_list = current.list_id,
                    to_list = list_id,
                    position,
                    "card moved across lists"
                );
            }
            _ => {
                if let Some(requested) = payload.position {
                    let position = self
                        .sequencer
                        .reposition(
                            &mut tx,
                            current.list_id,
                            card_id,
                            current.position,
                            requested,
                        )
                        .await?;
                    if position != current.position {
                        Activity::record(
                            &mut *tx,
                            &NewActivity::card(
                                user_id,
                                source.board_id,
                                current.list_id,
                                card_id,
                                ActivityAction::CardMoved,
                            ),
                        )
                        .await?;
                        info!(from = current.position, to = position, "card moved");
                    }
                }
            }
        }

        let card = Card::find_by_id(&mut *tx, card_id)
            .await?
            .ok_or(ServiceError::NotFound("card"))?;
        tx.commit().await?;

        Ok(card)
    }

    #[instrument(name = "cards.delete", skip(self))]
    pub async fn delete(&self, user_id: i64, card_id: i64) -> Result<(), ServiceError> {
        let ownership = authorize(self.db.pool(), user_id, Resource::Card(card_id)).await?;

        let mut tx = self.db.begin_write().await?;
        let card = Card::find_by_id(&mut *tx, card_id)
            .await?
            .ok_or(ServiceError::NotFound("card"))?;
        let position = self
            .sequencer
            .remove(&mut tx, card.list_id, card_id)
            .await?
            .ok_or(ServiceError::NotFound("card"))?;
        Activity::record(
            &mut *tx,
            &NewActivity::card(
                user_id,
                ownership.board_id,
                card.list_id,
                card_id,
                ActivityAction::CardDeleted,
            ),
        )
        .await?;
        tx.commit().await?;

        info!(position, "card deleted");
        Ok(())
    }
}
