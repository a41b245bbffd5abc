//! Group resolution: every transaction belongs to exactly one group, rooted
//! at the single member without a parent (the anchor). The tree is never
//! deeper than one level, so resolution is a single hop.

use model::entities::transaction;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::instrument;

use crate::error::{EngineError, Result};

/// Loads a transaction or fails with `NotFound`.
pub async fn find_required<C: ConnectionTrait>(db: &C, id: i32) -> Result<transaction::Model> {
    transaction::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("transaction with id {} does not exist", id)))
}

/// Returns the group root for any member: the row itself when it has no
/// parent, otherwise the row its `parent_id` references.
#[instrument(skip(db))]
pub async fn resolve_anchor<C: ConnectionTrait>(
    db: &C,
    transaction_id: i32,
) -> Result<transaction::Model> {
    let row = find_required(db, transaction_id).await?;
    match row.parent_id {
        None => Ok(row),
        Some(parent_id) => find_required(db, parent_id).await,
    }
}

/// All members pointing at `anchor_id`, in promotion order: ascending
/// `installment_number`, ties broken by ascending id. The underlying store
/// has no contractual row order, so the ordering is always spelled out here.
pub async fn siblings<C: ConnectionTrait>(
    db: &C,
    anchor_id: i32,
) -> Result<Vec<transaction::Model>> {
    Ok(transaction::Entity::find()
        .filter(transaction::Column::ParentId.eq(anchor_id))
        .order_by_asc(transaction::Column::InstallmentNumber)
        .order_by_asc(transaction::Column::Id)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{dt, insert_row, seed_user, setup_db};

    #[tokio::test]
    async fn anchor_of_an_anchor_is_itself() {
        let db = setup_db().await;
        let user = seed_user(&db, "anchor@example.com").await;
        let anchor = insert_row(&db, user.id, "50.00", dt(2024, 1, 10), 1, 1, None).await;

        let resolved = resolve_anchor(&db, anchor.id).await.unwrap();
        assert_eq!(resolved.id, anchor.id);
    }

    #[tokio::test]
    async fn anchor_of_a_child_is_one_hop_away() {
        let db = setup_db().await;
        let user = seed_user(&db, "hop@example.com").await;
        let anchor = insert_row(&db, user.id, "50.00", dt(2024, 1, 10), 2, 1, None).await;
        let child = insert_row(&db, user.id, "50.00", dt(2024, 2, 10), 2, 2, Some(anchor.id)).await;

        let resolved = resolve_anchor(&db, child.id).await.unwrap();
        assert_eq!(resolved.id, anchor.id);
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let db = setup_db().await;
        let err = resolve_anchor(&db, 9999).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn siblings_are_ordered_by_installment_number_then_id() {
        let db = setup_db().await;
        let user = seed_user(&db, "order@example.com").await;
        let anchor = insert_row(&db, user.id, "10.00", dt(2024, 1, 1), 4, 1, None).await;
        // Insert out of order on purpose; the query must not rely on
        // insertion order.
        let third = insert_row(&db, user.id, "10.00", dt(2024, 3, 1), 4, 3, Some(anchor.id)).await;
        let second = insert_row(&db, user.id, "10.00", dt(2024, 2, 1), 4, 2, Some(anchor.id)).await;
        let fourth = insert_row(&db, user.id, "10.00", dt(2024, 4, 1), 4, 4, Some(anchor.id)).await;

        let members = siblings(&db, anchor.id).await.unwrap();
        let ids: Vec<i32> = members.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![second.id, third.id, fourth.id]);
    }
}
