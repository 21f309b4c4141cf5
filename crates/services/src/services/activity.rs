use db::{DBService, Resource, models::activity::Activity};
use tracing::instrument;

use super::{authorization::authorize, error::ServiceError};

pub const DEFAULT_ACTIVITY_LIMIT: i64 = 50;
pub const MAX_ACTIVITY_LIMIT: i64 = 200;

/// Read side of the board activity log. Entries are written by the other
/// services inside their own transactions.
#[derive(Clone)]
pub struct ActivityService {
    db: DBService,
}

impl ActivityService {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    /// Newest first. `limit` defaults to 50 and is clamped to `1..=200`.
    #[instrument(name = "activity.for_board", skip(self))]
    pub async fn list_for_board(
        &self,
        user_id: i64,
        board_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Activity>, ServiceError> {
        authorize(self.db.pool(), user_id, Resource::Board(board_id)).await?;

        let limit = effective_limit(limit);
        Ok(Activity::find_by_board(self.db.pool(), board_id, limit).await?)
    }
}

fn effective_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .clamp(1, MAX_ACTIVITY_LIMIT)
}
