use db::{Ownership, OwnershipResolver, Resource};
use sqlx::SqlitePool;
use tracing::warn;

use super::error::ServiceError;

/// Resolve `resource` up to its board and check that `user_id` owns it.
///
/// A missing resource is `NotFound`; one owned by someone else is
/// `Forbidden`. Nothing is written either way.
pub async fn authorize(
    pool: &SqlitePool,
    user_id: i64,
    resource: Resource,
) -> Result<Ownership, ServiceError> {
    let ownership = OwnershipResolver::new(pool)
        .resolve(resource)
        .await?
        .ok_or(ServiceError::NotFound(resource.kind()))?;

    if !ownership.is_owned_by(user_id) {
        warn!(
            user_id,
            %resource,
            owner_id = ownership.owner_id,
            "access denied"
        );
        return Err(ServiceError::Forbidden);
    }

    Ok(ownership)
}
