//! Read-side projection of the ledger. The summary view renders one row per
//! group by filtering on `parent_id IS NULL`; the statement view shows every
//! stored occurrence. Both share the person-scoped visibility rules.

use std::collections::HashMap;

use common::PersonFilter;
use model::entities::{category, transaction, workspace_member};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait, SimpleExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::generator::shift_months;

/// Parameters of a list request.
#[derive(Debug, Clone)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: u64,
    pub limit: u64,
    /// One row per group instead of one row per occurrence.
    pub summary_view: bool,
    pub filter_by: Option<PersonFilter>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 100,
            summary_view: false,
            filter_by: None,
        }
    }
}

/// One projected row: the stored transaction, its joined category, and the
/// derived face value of the group it represents.
#[derive(Debug, Clone)]
pub struct GroupRow {
    pub transaction: transaction::Model,
    pub category: Option<category::Model>,
    /// `amount + Σ(children)` for installment anchors in summary view,
    /// otherwise the row's own amount. Recomputed on every read.
    pub total_value: Decimal,
}

/// `COALESCE(due_date, date)`: the ordering date for scheduled items.
fn effective_date_expr() -> SimpleExpr {
    Expr::cust("COALESCE(due_date, date)")
}

/// Restricts a transaction query to what the caller may see, including the
/// person filter inside workspaces.
async fn apply_visibility<Q: QueryFilter>(
    db: &DatabaseConnection,
    mut query: Q,
    user_id: i32,
    workspace_id: Option<i32>,
    filter_by: Option<PersonFilter>,
) -> Result<Q> {
    match workspace_id {
        Some(workspace_id) => {
            query = query.filter(transaction::Column::WorkspaceId.eq(workspace_id));
            match filter_by {
                Some(PersonFilter::Mine) => {
                    query = query.filter(transaction::Column::CreatedByUserId.eq(user_id));
                }
                Some(PersonFilter::Partner) => {
                    let partner_ids: Vec<i32> = workspace_member::Entity::find()
                        .filter(workspace_member::Column::WorkspaceId.eq(workspace_id))
                        .filter(workspace_member::Column::UserId.ne(user_id))
                        .filter(
                            workspace_member::Column::Status
                                .eq(workspace_member::MemberStatus::Active),
                        )
                        .all(db)
                        .await?
                        .into_iter()
                        .map(|member| member.user_id)
                        .collect();
                    query =
                        query.filter(transaction::Column::CreatedByUserId.is_in(partner_ids));
                }
                Some(PersonFilter::Joint) => {
                    query = query.filter(transaction::Column::IsJoint.eq(true));
                }
                Some(PersonFilter::All) | None => {}
            }
        }
        None => {
            query = query.filter(transaction::Column::UserId.eq(user_id));
        }
    }
    Ok(query)
}

/// Lists transactions for the caller. Summary view returns anchors only in
/// insertion order (most recent first); statement view returns every
/// occurrence ordered by date descending.
#[instrument(skip(db, query))]
pub async fn list_transactions(
    db: &DatabaseConnection,
    user_id: i32,
    workspace_id: Option<i32>,
    query: &ListQuery,
) -> Result<Vec<GroupRow>> {
    let mut select = transaction::Entity::find().find_also_related(category::Entity);
    select = apply_visibility(db, select, user_id, workspace_id, query.filter_by).await?;

    select = if query.summary_view {
        select
            .filter(transaction::Column::ParentId.is_null())
            .order_by_desc(transaction::Column::Id)
    } else {
        select.order_by_desc(transaction::Column::Date)
    };

    let page = query.page.max(1);
    let rows = select
        .paginate(db, query.limit)
        .fetch_page(page - 1)
        .await?;
    debug!(rows = rows.len(), summary = query.summary_view, "projected transaction page");

    // Installment anchors derive their face value from the whole group.
    let mut child_sums: HashMap<i32, Decimal> = HashMap::new();
    if query.summary_view {
        let anchor_ids: Vec<i32> = rows
            .iter()
            .filter(|(row, _)| row.installment_count > 1)
            .map(|(row, _)| row.id)
            .collect();
        if !anchor_ids.is_empty() {
            let children = transaction::Entity::find()
                .filter(transaction::Column::ParentId.is_in(anchor_ids))
                .all(db)
                .await?;
            for child in children {
                if let Some(parent_id) = child.parent_id {
                    *child_sums.entry(parent_id).or_insert(Decimal::ZERO) += child.amount;
                }
            }
        }
    }

    Ok(rows
        .into_iter()
        .map(|(row, category)| {
            let total_value = if query.summary_view && row.installment_count > 1 {
                (row.amount + child_sums.get(&row.id).copied().unwrap_or(Decimal::ZERO))
                    .round_dp(2)
            } else {
                row.amount
            };
            GroupRow {
                transaction: row,
                category,
                total_value,
            }
        })
        .collect())
}

/// Pending items ordered by ascending effective date, optionally windowed to
/// one month. Feeds the "upcoming bills" view.
#[instrument(skip(db))]
pub async fn upcoming_transactions(
    db: &DatabaseConnection,
    user_id: i32,
    workspace_id: Option<i32>,
    limit: u64,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<Vec<transaction::Model>> {
    let mut select = transaction::Entity::find()
        .filter(transaction::Column::Status.eq(transaction::TransactionStatus::Pending));
    select = apply_visibility(db, select, user_id, workspace_id, None).await?;

    if let (Some(month), Some(year)) = (month, year) {
        if let Some(start) = chrono::NaiveDate::from_ymd_opt(year, month, 1) {
            let start = start.and_time(chrono::NaiveTime::MIN);
            let end = shift_months(start, 1);
            select = select
                .filter(effective_date_expr().gte(start))
                .filter(effective_date_expr().lt(end));
        }
        // An invalid month/year silently skips the window, matching the
        // permissive read-path behavior of the rest of the views.
    }

    Ok(select
        .order_by(effective_date_expr(), Order::Asc)
        .limit(limit)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::create_transaction;
    use crate::testing::{dt, expense_request, row, seed_user, seed_workspace, setup_db};
    use model::entities::transaction::TransactionStatus;
    use sea_orm::{ActiveModelTrait, Set};
    use std::str::FromStr;

    #[tokio::test]
    async fn summary_shows_one_row_per_group_most_recent_first() {
        let db = setup_db().await;
        let user = seed_user(&db, "summary@example.com").await;

        let mut plan = expense_request("Fridge", "100.00");
        plan.installment_count = 3;
        let plan_anchor = create_transaction(&db, plan, user.id, None).await.unwrap();

        let single = create_transaction(&db, expense_request("Coffee", "4.00"), user.id, None)
            .await
            .unwrap();

        let rows = list_transactions(
            &db,
            user.id,
            None,
            &ListQuery {
                summary_view: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let ids: Vec<i32> = rows.iter().map(|r| r.transaction.id).collect();
        assert_eq!(ids, vec![single.id, plan_anchor.id]);
    }

    #[tokio::test]
    async fn statement_shows_every_occurrence_by_date() {
        let db = setup_db().await;
        let user = seed_user(&db, "statement@example.com").await;

        let mut plan = expense_request("Fridge", "100.00");
        plan.date = dt(2024, 1, 15);
        plan.installment_count = 3;
        create_transaction(&db, plan, user.id, None).await.unwrap();

        let rows = list_transactions(&db, user.id, None, &ListQuery::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);

        let dates: Vec<_> = rows.iter().map(|r| r.transaction.date).collect();
        assert_eq!(dates, vec![dt(2024, 3, 15), dt(2024, 2, 15), dt(2024, 1, 15)]);
    }

    #[tokio::test]
    async fn installment_anchor_projects_group_face_value() {
        let db = setup_db().await;
        let user = seed_user(&db, "facevalue@example.com").await;

        let anchor = row(user.id, "100.00", dt(2024, 1, 1));
        let anchor = transaction::ActiveModel {
            installment_count: Set(3),
            ..anchor
        }
        .insert(&db)
        .await
        .unwrap();
        for month in [2, 3] {
            transaction::ActiveModel {
                installment_count: Set(3),
                installment_number: Set(month as i32),
                parent_id: Set(Some(anchor.id)),
                ..row(user.id, "50.00", dt(2024, month, 1))
            }
            .insert(&db)
            .await
            .unwrap();
        }

        let rows = list_transactions(
            &db,
            user.id,
            None,
            &ListQuery {
                summary_view: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_value, Decimal::from_str("200.00").unwrap());
    }

    #[tokio::test]
    async fn recurring_summary_row_keeps_its_own_amount() {
        let db = setup_db().await;
        let user = seed_user(&db, "subscription@example.com").await;

        let mut request = expense_request("Gym", "30.00");
        request.is_recurring = true;
        request.recurrence_period =
            Some(model::entities::transaction::RecurrencePeriod::Monthly);
        create_transaction(&db, request, user.id, None).await.unwrap();

        let rows = list_transactions(
            &db,
            user.id,
            None,
            &ListQuery {
                summary_view: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        // Subscription groups show the per-occurrence amount, not 12x
        assert_eq!(rows[0].total_value, Decimal::from_str("30.00").unwrap());
    }

    #[tokio::test]
    async fn person_filters_scope_workspace_views() {
        let db = setup_db().await;
        let alice = seed_user(&db, "alice@example.com").await;
        let bob = seed_user(&db, "bob@example.com").await;
        let ws = seed_workspace(&db, "Shared", &[alice.id, bob.id], "10000.00").await;

        let mine = transaction::ActiveModel {
            workspace_id: Set(Some(ws.id)),
            ..row(alice.id, "10.00", dt(2024, 1, 1))
        }
        .insert(&db)
        .await
        .unwrap();
        let partners = transaction::ActiveModel {
            workspace_id: Set(Some(ws.id)),
            ..row(bob.id, "20.00", dt(2024, 1, 2))
        }
        .insert(&db)
        .await
        .unwrap();
        let joint = transaction::ActiveModel {
            workspace_id: Set(Some(ws.id)),
            is_joint: Set(true),
            ..row(alice.id, "30.00", dt(2024, 1, 3))
        }
        .insert(&db)
        .await
        .unwrap();

        async fn fetch_ids(
            db: &DatabaseConnection,
            user_id: i32,
            workspace_id: i32,
            filter: PersonFilter,
        ) -> Vec<i32> {
            list_transactions(
                db,
                user_id,
                Some(workspace_id),
                &ListQuery {
                    filter_by: Some(filter),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .iter()
            .map(|r| r.transaction.id)
            .collect()
        }

        let mine_ids = fetch_ids(&db, alice.id, ws.id, PersonFilter::Mine).await;
        assert!(mine_ids.contains(&mine.id) && mine_ids.contains(&joint.id));
        assert!(!mine_ids.contains(&partners.id));

        let partner_ids = fetch_ids(&db, alice.id, ws.id, PersonFilter::Partner).await;
        assert_eq!(partner_ids, vec![partners.id]);

        let joint_ids = fetch_ids(&db, alice.id, ws.id, PersonFilter::Joint).await;
        assert_eq!(joint_ids, vec![joint.id]);

        let all_ids = fetch_ids(&db, alice.id, ws.id, PersonFilter::All).await;
        assert_eq!(all_ids.len(), 3);
    }

    #[tokio::test]
    async fn upcoming_orders_by_effective_date() {
        let db = setup_db().await;
        let user = seed_user(&db, "upcoming@example.com").await;

        // Dated early but due late: the due date decides the order
        let due_late = transaction::ActiveModel {
            status: Set(TransactionStatus::Pending),
            due_date: Set(Some(dt(2024, 3, 20))),
            ..row(user.id, "10.00", dt(2024, 1, 1))
        }
        .insert(&db)
        .await
        .unwrap();
        let due_soon = transaction::ActiveModel {
            status: Set(TransactionStatus::Pending),
            ..row(user.id, "20.00", dt(2024, 2, 5))
        }
        .insert(&db)
        .await
        .unwrap();
        // Paid rows never show up in upcoming
        transaction::ActiveModel {
            ..row(user.id, "99.00", dt(2024, 1, 2))
        }
        .insert(&db)
        .await
        .unwrap();

        let upcoming = upcoming_transactions(&db, user.id, None, 10, None, None)
            .await
            .unwrap();
        let ids: Vec<i32> = upcoming.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![due_soon.id, due_late.id]);
    }

    #[tokio::test]
    async fn upcoming_month_window_filters_on_effective_date() {
        let db = setup_db().await;
        let user = seed_user(&db, "window@example.com").await;

        let march = transaction::ActiveModel {
            status: Set(TransactionStatus::Pending),
            due_date: Set(Some(dt(2024, 3, 10))),
            ..row(user.id, "10.00", dt(2024, 2, 25))
        }
        .insert(&db)
        .await
        .unwrap();
        transaction::ActiveModel {
            status: Set(TransactionStatus::Pending),
            ..row(user.id, "20.00", dt(2024, 4, 2))
        }
        .insert(&db)
        .await
        .unwrap();

        let upcoming = upcoming_transactions(&db, user.id, None, 10, Some(3), Some(2024))
            .await
            .unwrap();
        let ids: Vec<i32> = upcoming.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![march.id]);
    }
}
