//! Dense ordering of sibling rows.
//!
//! Lists are ordered within their board and cards within their list. For any
//! container the positions of its children are always `0..n-1`. Every
//! operation here takes the caller's open transaction so the read of current
//! positions, the bulk shift of siblings and the write of the target row
//! commit or roll back together.
//!
//! Out-of-range targets are clamped: inserting past the end appends, moving
//! past the last slot lands on the last slot.

use sqlx::{Error, sqlite::SqliteConnection};
use tracing::debug;

/// Which sibling set a sequencer operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionScope {
    /// Lists within a board.
    ListsInBoard,
    /// Cards within a list.
    CardsInList,
}

impl PositionScope {
    pub const fn table(self) -> &'static str {
        match self {
            PositionScope::ListsInBoard => "lists",
            PositionScope::CardsInList => "cards",
        }
    }

    pub const fn container_column(self) -> &'static str {
        match self {
            PositionScope::ListsInBoard => "board_id",
            PositionScope::CardsInList => "list_id",
        }
    }
}

/// Inclusive range of positions to shift. `end = None` means "to the end".
#[derive(Debug, Clone, Copy)]
struct ShiftRange {
    start: i64,
    end: Option<i64>,
}

impl ShiftRange {
    fn from(start: i64) -> Self {
        Self { start, end: None }
    }

    fn between(start: i64, end: i64) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PositionSequencer {
    scope: PositionScope,
}

impl PositionSequencer {
    pub const fn new(scope: PositionScope) -> Self {
        Self { scope }
    }

    pub const fn lists() -> Self {
        Self::new(PositionScope::ListsInBoard)
    }

    pub const fn cards() -> Self {
        Self::new(PositionScope::CardsInList)
    }

    pub fn scope(&self) -> PositionScope {
        self.scope
    }

    pub async fn sibling_count(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
    ) -> Result<i64, Error> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {} = $1",
            self.scope.table(),
            self.scope.container_column()
        );
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(container_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// `max(position) + 1`, or `0` for an empty container.
    pub async fn next_position(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
    ) -> Result<i64, Error> {
        let sql = format!(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM {} WHERE {} = $1",
            self.scope.table(),
            self.scope.container_column()
        );
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(container_id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Current position of `entity_id`, provided it lives in `container_id`.
    pub async fn current_position(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        entity_id: i64,
    ) -> Result<Option<i64>, Error> {
        let sql = format!(
            "SELECT position FROM {} WHERE id = $1 AND {} = $2",
            self.scope.table(),
            self.scope.container_column()
        );
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(entity_id)
            .bind(container_id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// `(id, position)` pairs of every child, ordered by position.
    pub async fn positions(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
    ) -> Result<Vec<(i64, i64)>, Error> {
        let sql = format!(
            "SELECT id, position FROM {} WHERE {} = $1 ORDER BY position ASC, id ASC",
            self.scope.table(),
            self.scope.container_column()
        );
        sqlx::query_as::<_, (i64, i64)>(&sql)
            .bind(container_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Make room for a new child and return the position it must be
    /// inserted at.
    ///
    /// With no requested position the child goes to the end and nothing
    /// moves. Otherwise every sibling at or after the requested slot shifts
    /// down by one.
    pub async fn open_slot(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        requested: Option<i64>,
    ) -> Result<i64, Error> {
        let Some(requested) = requested else {
            return self.next_position(conn, container_id).await;
        };

        let count = self.sibling_count(conn, container_id).await?;
        let position = requested.clamp(0, count);
        if position != requested {
            debug!(
                scope = ?self.scope,
                container_id,
                requested,
                position,
                "clamped insert position"
            );
        }

        if position < count {
            self.shift(conn, container_id, ShiftRange::from(position), 1)
                .await?;
        }

        Ok(position)
    }

    /// Move `entity_id` from `old` to `new` within one container, rotating
    /// the siblings in between. Returns the final position.
    pub async fn reposition(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        entity_id: i64,
        old: i64,
        new: i64,
    ) -> Result<i64, Error> {
        let count = self.sibling_count(conn, container_id).await?;
        let last = (count - 1).max(0);
        let new = new.clamp(0, last);

        if new == old {
            return Ok(old);
        }

        if new > old {
            self.shift(conn, container_id, ShiftRange::between(old + 1, new), -1)
                .await?;
        } else {
            self.shift(conn, container_id, ShiftRange::between(new, old - 1), 1)
                .await?;
        }

        self.place(conn, entity_id, container_id, new).await?;
        Ok(new)
    }

    /// Move `entity_id` out of `source` and into `dest`.
    ///
    /// Closes the gap in the source, opens a slot in the destination (at the
    /// end when `new` is `None`), then rewrites the entity's container and
    /// position. Returns the final position.
    pub async fn move_across(
        &self,
        conn: &mut SqliteConnection,
        entity_id: i64,
        source_id: i64,
        dest_id: i64,
        old: i64,
        new: Option<i64>,
    ) -> Result<i64, Error> {
        if source_id == dest_id {
            return match new {
                Some(new) => {
                    self.reposition(conn, source_id, entity_id, old, new)
                        .await
                }
                None => Ok(old),
            };
        }

        self.shift(conn, source_id, ShiftRange::from(old + 1), -1)
            .await?;
        let position = self.open_slot(conn, dest_id, new).await?;
        self.place(conn, entity_id, dest_id, position).await?;

        debug!(
            scope = ?self.scope,
            entity_id,
            source_id,
            dest_id,
            position,
            "moved across containers"
        );

        Ok(position)
    }

    /// Delete `entity_id` and close the gap it leaves. Returns the position
    /// it held, or `None` if it is not a child of `container_id`.
    pub async fn remove(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        entity_id: i64,
    ) -> Result<Option<i64>, Error> {
        let Some(position) = self
            .current_position(conn, container_id, entity_id)
            .await?
        else {
            return Ok(None);
        };

        let sql = format!(
            "DELETE FROM {} WHERE id = $1 AND {} = $2",
            self.scope.table(),
            self.scope.container_column()
        );
        sqlx::query(&sql)
            .bind(entity_id)
            .bind(container_id)
            .execute(&mut *conn)
            .await?;

        self.shift(conn, container_id, ShiftRange::from(position + 1), -1)
            .await?;

        Ok(Some(position))
    }

    /// Add `delta` to the position of every child in `range`, in one
    /// statement.
    async fn shift(
        &self,
        conn: &mut SqliteConnection,
        container_id: i64,
        range: ShiftRange,
        delta: i64,
    ) -> Result<u64, Error> {
        let table = self.scope.table();
        let column = self.scope.container_column();

        let result = match range.end {
            Some(end) => {
                let sql = format!(
                    "UPDATE {table} SET position = position + $1 \
                     WHERE {column} = $2 AND position >= $3 AND position <= $4"
                );
                sqlx::query(&sql)
                    .bind(delta)
                    .bind(container_id)
                    .bind(range.start)
                    .bind(end)
                    .execute(&mut *conn)
                    .await?
            }
            None => {
                let sql = format!(
                    "UPDATE {table} SET position = position + $1 \
                     WHERE {column} = $2 AND position >= $3"
                );
                sqlx::query(&sql)
                    .bind(delta)
                    .bind(container_id)
                    .bind(range.start)
                    .execute(&mut *conn)
                    .await?
            }
        };

        debug!(
            scope = ?self.scope,
            container_id,
            start = range.start,
            end = ?range.end,
            delta,
            rows = result.rows_affected(),
            "shifted sibling positions"
        );

        Ok(result.rows_affected())
    }

    /// Write the entity's final container and position.
    async fn place(
        &self,
        conn: &mut SqliteConnection,
        entity_id: i64,
        container_id: i64,
        position: i64,
    ) -> Result<(), Error> {
        let sql = format!(
            "UPDATE {} SET {} = $1, position = $2, updated_at = datetime('now', 'subsec') \
             WHERE id = $3",
            self.scope.table(),
            self.scope.container_column()
        );
        let result = sqlx::query(&sql)
            .bind(container_id)
            .bind(position)
            .bind(entity_id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }
}
