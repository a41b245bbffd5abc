//! Dashboard read-model: paid totals for a target month, a small trend
//! window around it, and per-category breakdowns. Everything here is derived
//! on read; nothing is persisted.

use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use common::{CategoryBreakdown, DashboardSummary, TrendPoint};
use model::entities::{category, transaction};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::instrument;

use crate::error::{EngineError, Result};

/// Trend window: one month back, two months ahead of the target month.
const TREND_BACK: u32 = 1;
const TREND_AHEAD: u32 = 2;

struct TrendBucket {
    label: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    income: Decimal,
    expenses: Decimal,
}

/// Computes the dashboard summary for the given month (defaulting to the
/// current one). Only `paid` rows count; pending and unapproved items stay
/// out of the totals.
#[instrument(skip(db))]
pub async fn dashboard_summary(
    db: &DatabaseConnection,
    user_id: i32,
    workspace_id: Option<i32>,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<DashboardSummary> {
    let today = Utc::now().date_naive();
    let target_month = month.unwrap_or_else(|| today.month());
    let target_year = year.unwrap_or_else(|| today.year());

    let target_start = NaiveDate::from_ymd_opt(target_year, target_month, 1)
        .ok_or_else(|| {
            EngineError::Validation(format!(
                "invalid report month {}/{}",
                target_month, target_year
            ))
        })?
        .and_time(NaiveTime::MIN);

    let mut buckets = Vec::new();
    for offset in 0..=(TREND_BACK + TREND_AHEAD) {
        // offset 0 is TREND_BACK months before the target
        let start = target_start
            .checked_sub_months(Months::new(TREND_BACK))
            .and_then(|s| s.checked_add_months(Months::new(offset)))
            .unwrap_or(target_start);
        let end = start
            .checked_add_months(Months::new(1))
            .unwrap_or(start);
        buckets.push(TrendBucket {
            label: start.format("%b %Y").to_string(),
            start,
            end,
            income: Decimal::ZERO,
            expenses: Decimal::ZERO,
        });
    }
    let window_start = buckets.first().map(|b| b.start).unwrap_or(target_start);
    let window_end = buckets.last().map(|b| b.end).unwrap_or(target_start);

    let mut select = transaction::Entity::find()
        .find_also_related(category::Entity)
        .filter(transaction::Column::Status.eq(transaction::TransactionStatus::Paid))
        .filter(transaction::Column::Date.gte(window_start))
        .filter(transaction::Column::Date.lt(window_end));
    select = match workspace_id {
        Some(workspace_id) => select.filter(transaction::Column::WorkspaceId.eq(workspace_id)),
        None => select.filter(transaction::Column::UserId.eq(user_id)),
    };
    let rows = select.all(db).await?;

    let target_end = target_start
        .checked_add_months(Months::new(1))
        .unwrap_or(target_start);

    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;
    // category_id -> (name, icon, budget limit, accumulated value)
    let mut expense_slices: HashMap<Option<i32>, (String, Option<String>, Decimal, Decimal)> =
        HashMap::new();
    let mut income_slices: HashMap<Option<i32>, (String, Option<String>, Decimal, Decimal)> =
        HashMap::new();

    for (row, joined_category) in &rows {
        for bucket in &mut buckets {
            if row.date >= bucket.start && row.date < bucket.end {
                match row.kind {
                    transaction::TransactionKind::Income => bucket.income += row.amount,
                    transaction::TransactionKind::Expense => bucket.expenses += row.amount,
                }
            }
        }

        if row.date < target_start || row.date >= target_end {
            continue;
        }
        match row.kind {
            transaction::TransactionKind::Income => total_income += row.amount,
            transaction::TransactionKind::Expense => total_expenses += row.amount,
        }

        let slices = match row.kind {
            transaction::TransactionKind::Income => &mut income_slices,
            transaction::TransactionKind::Expense => &mut expense_slices,
        };
        let entry = slices.entry(row.category_id).or_insert_with(|| {
            match joined_category {
                Some(cat) => (cat.name.clone(), cat.icon.clone(), cat.budget_limit, Decimal::ZERO),
                None => ("Other".to_string(), None, Decimal::ZERO, Decimal::ZERO),
            }
        });
        entry.3 += row.amount;
    }

    let income_trend = buckets
        .iter()
        .map(|b| TrendPoint {
            name: b.label.clone(),
            value: b.income,
        })
        .collect();
    let expense_trend = buckets
        .iter()
        .map(|b| TrendPoint {
            name: b.label.clone(),
            value: b.expenses,
        })
        .collect();

    Ok(DashboardSummary {
        total_balance: total_income - total_expenses,
        total_income,
        total_expenses,
        income_trend,
        expense_trend,
        category_breakdown: into_breakdown(expense_slices, total_expenses),
        income_category_breakdown: into_breakdown(income_slices, total_income),
    })
}

/// Turns accumulated category sums into breakdown rows with one-decimal
/// percentage shares, largest slice first.
fn into_breakdown(
    slices: HashMap<Option<i32>, (String, Option<String>, Decimal, Decimal)>,
    total: Decimal,
) -> Vec<CategoryBreakdown> {
    let total = total.to_f64().unwrap_or(0.0);
    let mut breakdown: Vec<CategoryBreakdown> = slices
        .into_values()
        .map(|(name, icon, limit, value)| {
            let share = if total > 0.0 {
                value.to_f64().unwrap_or(0.0) / total * 100.0
            } else {
                0.0
            };
            CategoryBreakdown {
                name,
                value,
                percentage: (share * 10.0).round() / 10.0,
                limit,
                icon,
            }
        })
        .collect();
    breakdown.sort_by(|a, b| b.value.cmp(&a.value));
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{dt, row, seed_user, setup_db};
    use model::entities::transaction::{TransactionKind, TransactionStatus};
    use sea_orm::{ActiveModelTrait, Set};
    use std::str::FromStr;

    async fn seed_category(
        db: &DatabaseConnection,
        user_id: i32,
        name: &str,
        limit: &str,
    ) -> category::Model {
        category::ActiveModel {
            name: Set(name.to_string()),
            kind: Set(TransactionKind::Expense),
            color: Set("#888888".to_string()),
            icon: Set(Some("Tag".to_string())),
            budget_limit: Set(Decimal::from_str(limit).unwrap()),
            user_id: Set(user_id),
            workspace_id: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn totals_cover_only_paid_rows_of_the_target_month() {
        let db = setup_db().await;
        let user = seed_user(&db, "totals@example.com").await;

        transaction::ActiveModel {
            kind: Set(TransactionKind::Income),
            ..row(user.id, "1000.00", dt(2024, 3, 5))
        }
        .insert(&db)
        .await
        .unwrap();
        transaction::ActiveModel {
            ..row(user.id, "300.00", dt(2024, 3, 10))
        }
        .insert(&db)
        .await
        .unwrap();
        // Pending expense is ignored
        transaction::ActiveModel {
            status: Set(TransactionStatus::Pending),
            ..row(user.id, "500.00", dt(2024, 3, 12))
        }
        .insert(&db)
        .await
        .unwrap();
        // Wrong month is ignored in the totals
        transaction::ActiveModel {
            ..row(user.id, "77.00", dt(2024, 5, 1))
        }
        .insert(&db)
        .await
        .unwrap();

        let summary = dashboard_summary(&db, user.id, None, Some(3), Some(2024))
            .await
            .unwrap();
        assert_eq!(summary.total_income, Decimal::from_str("1000.00").unwrap());
        assert_eq!(summary.total_expenses, Decimal::from_str("300.00").unwrap());
        assert_eq!(summary.total_balance, Decimal::from_str("700.00").unwrap());
    }

    #[tokio::test]
    async fn trend_window_spans_previous_to_second_next_month() {
        let db = setup_db().await;
        let user = seed_user(&db, "trend@example.com").await;

        transaction::ActiveModel {
            ..row(user.id, "10.00", dt(2024, 2, 20))
        }
        .insert(&db)
        .await
        .unwrap();
        transaction::ActiveModel {
            ..row(user.id, "20.00", dt(2024, 3, 8))
        }
        .insert(&db)
        .await
        .unwrap();
        transaction::ActiveModel {
            ..row(user.id, "40.00", dt(2024, 5, 2))
        }
        .insert(&db)
        .await
        .unwrap();

        let summary = dashboard_summary(&db, user.id, None, Some(3), Some(2024))
            .await
            .unwrap();
        let labels: Vec<&str> = summary
            .expense_trend
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(labels, vec!["Feb 2024", "Mar 2024", "Apr 2024", "May 2024"]);

        let values: Vec<Decimal> = summary.expense_trend.iter().map(|p| p.value).collect();
        assert_eq!(
            values,
            vec![
                Decimal::from_str("10.00").unwrap(),
                Decimal::from_str("20.00").unwrap(),
                Decimal::ZERO,
                Decimal::from_str("40.00").unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn category_breakdown_carries_shares_and_limits() {
        let db = setup_db().await;
        let user = seed_user(&db, "slices@example.com").await;
        let food = seed_category(&db, user.id, "Food", "400.00").await;

        transaction::ActiveModel {
            category_id: Set(Some(food.id)),
            ..row(user.id, "75.00", dt(2024, 3, 3))
        }
        .insert(&db)
        .await
        .unwrap();
        transaction::ActiveModel {
            ..row(user.id, "25.00", dt(2024, 3, 4))
        }
        .insert(&db)
        .await
        .unwrap();

        let summary = dashboard_summary(&db, user.id, None, Some(3), Some(2024))
            .await
            .unwrap();
        assert_eq!(summary.category_breakdown.len(), 2);

        let top = &summary.category_breakdown[0];
        assert_eq!(top.name, "Food");
        assert_eq!(top.value, Decimal::from_str("75.00").unwrap());
        assert_eq!(top.percentage, 75.0);
        assert_eq!(top.limit, Decimal::from_str("400.00").unwrap());

        let uncategorized = &summary.category_breakdown[1];
        assert_eq!(uncategorized.name, "Other");
        assert_eq!(uncategorized.percentage, 25.0);
    }
}
