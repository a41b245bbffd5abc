//! Structurally consistent removal of transactions. A delete may target one
//! occurrence, the occurrence of a given month, or a whole group; whenever
//! the group's anchor goes away while members survive, one of them is
//! promoted so the single-anchor invariant holds after commit.

use chrono::Datelike;
use common::DeleteScope;
use model::entities::transaction;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait, Value,
};
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::resolver;

/// Removes the transaction identified by `transaction_id` under the given
/// scope and returns the row the operation targeted. Every branch runs
/// inside a single store transaction: a failure mid-protocol rolls the
/// group back to its pre-delete state.
#[instrument(skip(db))]
pub async fn delete_transaction(
    db: &DatabaseConnection,
    transaction_id: i32,
    scope: DeleteScope,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<transaction::Model> {
    let txn = db.begin().await?;
    let target = resolver::find_required(&txn, transaction_id).await?;

    let removed = match scope {
        DeleteScope::All => delete_whole_group(&txn, target).await?,
        DeleteScope::Single => match (month, year) {
            (Some(month), Some(year)) => {
                delete_month_occurrence(&txn, target, month, year).await?
            }
            _ => delete_one(&txn, target).await?,
        },
    };

    txn.commit().await?;
    Ok(removed)
}

/// Deletes entire subtrees for each id: children of any doomed anchor first,
/// then the rows themselves. No promotion runs here; bulk delete is an
/// explicit "remove the whole subtree" operation. Returns the number of
/// directly targeted rows that existed.
#[instrument(skip(db))]
pub async fn delete_transactions(db: &DatabaseConnection, ids: &[i32]) -> Result<u64> {
    if ids.is_empty() {
        return Ok(0);
    }

    let txn = db.begin().await?;

    transaction::Entity::delete_many()
        .filter(transaction::Column::ParentId.is_in(ids.to_vec()))
        .exec(&txn)
        .await?;

    let result = transaction::Entity::delete_many()
        .filter(transaction::Column::Id.is_in(ids.to_vec()))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    info!(rows = result.rows_affected, "bulk delete committed");
    Ok(result.rows_affected)
}

/// scope = all: the anchor and every member go away together. The returned
/// row is the one the caller referenced, even when that was a child.
async fn delete_whole_group(
    txn: &DatabaseTransaction,
    target: transaction::Model,
) -> Result<transaction::Model> {
    let anchor_id = target.parent_id.unwrap_or(target.id);

    transaction::Entity::delete_many()
        .filter(transaction::Column::ParentId.eq(anchor_id))
        .exec(txn)
        .await?;
    transaction::Entity::delete_by_id(anchor_id).exec(txn).await?;

    debug!(anchor_id, "whole group removed");
    Ok(target)
}

/// scope = single with a month/year: the group member whose effective date
/// falls in that month is the real target. When no member matches, the
/// referenced row itself is removed as a bare occurrence.
async fn delete_month_occurrence(
    txn: &DatabaseTransaction,
    target: transaction::Model,
    month: u32,
    year: i32,
) -> Result<transaction::Model> {
    let anchor = match target.parent_id {
        Some(parent_id) => resolver::find_required(txn, parent_id).await?,
        None => target.clone(),
    };

    let mut group = vec![anchor.clone()];
    group.extend(resolver::siblings(txn, anchor.id).await?);

    let matched = group.into_iter().find(|member| {
        let effective = member.effective_date();
        effective.month() == month && effective.year() == year
    });

    match matched {
        Some(hit) => {
            debug!(hit = hit.id, month, year, "deleting month occurrence");
            delete_one(txn, hit).await
        }
        None => {
            // Nothing in the group lives in that month; fall back to the row
            // the caller actually referenced.
            debug!(target = target.id, month, year, "no occurrence in month, deleting referenced row");
            delete_one(txn, target).await
        }
    }
}

/// Removes exactly one row. An anchor with surviving members first hands the
/// group over via the promotion protocol; a child shrinks its anchor's
/// installment count on the way out.
async fn delete_one(
    txn: &DatabaseTransaction,
    target: transaction::Model,
) -> Result<transaction::Model> {
    let children = resolver::siblings(txn, target.id).await?;

    if children.is_empty() {
        if let Some(parent_id) = target.parent_id {
            decrement_installment_count(txn, parent_id).await?;
        }
        transaction::Entity::delete_by_id(target.id).exec(txn).await?;
    } else {
        promote_and_remove(txn, &target, children).await?;
    }

    Ok(target)
}

/// The promotion protocol. Given the doomed anchor and its members in
/// promotion order (installment_number, then id):
///
/// 1. the first member becomes the new anchor,
/// 2. all members are detached from the old anchor,
/// 3. the successor inherits the group identity (`is_recurring`,
///    `recurrence_period`) and the decremented installment count,
/// 4. the remaining members are re-linked to the successor,
/// 5. the old anchor is deleted.
///
/// Runs entirely inside the caller's open transaction.
async fn promote_and_remove(
    txn: &DatabaseTransaction,
    old_anchor: &transaction::Model,
    children: Vec<transaction::Model>,
) -> Result<()> {
    let Some(successor) = children.first().cloned() else {
        return Ok(());
    };
    info!(
        old_anchor = old_anchor.id,
        new_anchor = successor.id,
        "promoting successor to group anchor"
    );

    // Detach everyone so nothing references the row about to be deleted.
    transaction::Entity::update_many()
        .col_expr(transaction::Column::ParentId, Expr::value(Value::Int(None)))
        .filter(transaction::Column::ParentId.eq(old_anchor.id))
        .exec(txn)
        .await?;

    let new_count = if old_anchor.installment_count > 1 {
        old_anchor.installment_count - 1
    } else {
        old_anchor.installment_count
    };

    let mut promoted: transaction::ActiveModel = successor.clone().into();
    promoted.parent_id = Set(None);
    promoted.is_recurring = Set(old_anchor.is_recurring);
    promoted.recurrence_period = Set(old_anchor.recurrence_period);
    promoted.installment_count = Set(new_count);
    promoted.update(txn).await?;

    let rest: Vec<i32> = children.iter().skip(1).map(|member| member.id).collect();
    if !rest.is_empty() {
        transaction::Entity::update_many()
            .col_expr(transaction::Column::ParentId, Expr::value(successor.id))
            .filter(transaction::Column::Id.is_in(rest))
            .exec(txn)
            .await?;
    }

    transaction::Entity::delete_by_id(old_anchor.id).exec(txn).await?;
    Ok(())
}

/// Shrinks an anchor's installment count after a member was removed. Counts
/// at or below 1 stay untouched.
async fn decrement_installment_count(txn: &DatabaseTransaction, anchor_id: i32) -> Result<()> {
    let anchor = resolver::find_required(txn, anchor_id).await?;
    if anchor.installment_count > 1 {
        let next = anchor.installment_count - 1;
        let mut active: transaction::ActiveModel = anchor.into();
        active.installment_count = Set(next);
        active.update(txn).await?;
    }
    Ok(())
}
