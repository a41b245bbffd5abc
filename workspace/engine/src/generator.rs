//! Materializes a transaction request into its stored family: a single row,
//! an installment plan, or an eagerly generated monthly series. The whole
//! batch is written inside one store transaction so a failing insert never
//! leaves a partial group behind.

use chrono::{Months, NaiveDateTime, Utc};
use model::entities::{approval_request, transaction, workspace_member, workspace_settings};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use tracing::{debug, info, instrument};

use crate::error::{EngineError, Result};

/// Number of occurrences an eagerly materialized monthly series gets.
/// Fixed policy: the series is bounded, never an open-ended generator.
pub const RECURRENCE_HORIZON: u32 = 12;

/// Everything a caller provides to enter a transaction into the ledger.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub description: String,
    /// Positive magnitude; the balance direction comes from `kind`.
    pub amount: Decimal,
    pub kind: transaction::TransactionKind,
    pub date: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
    /// Requested settlement state; defaults to paid. Overridden to
    /// pending_approval by the workspace threshold rule.
    pub status: Option<transaction::TransactionStatus>,
    pub payment_method: Option<String>,
    pub category_id: Option<i32>,
    pub is_joint: bool,
    pub is_recurring: bool,
    pub recurrence_period: Option<transaction::RecurrencePeriod>,
    pub installment_count: i32,
}

/// Splits `total` into `count` two-decimal shares. Every share equals the
/// rounded base except the last, which absorbs the rounding remainder so the
/// shares always sum back to `total` exactly.
pub fn split_amount(total: Decimal, count: i32) -> Vec<Decimal> {
    let base = (total / Decimal::from(count))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let last = (total - base * Decimal::from(count - 1))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    let mut shares = vec![base; count as usize];
    if let Some(tail) = shares.last_mut() {
        *tail = last;
    }
    shares
}

/// Shifts a timestamp forward by whole calendar months. The day-of-month is
/// preserved unless the target month is shorter, in which case it clamps to
/// the month's last valid day (Jan 31 + 1 month = Feb 28/29).
pub fn shift_months(date: NaiveDateTime, months: u32) -> NaiveDateTime {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

/// Creates the requested transaction family and returns its anchor.
#[instrument(skip(db, request), fields(installments = request.installment_count, recurring = request.is_recurring))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    request: NewTransaction,
    user_id: i32,
    workspace_id: Option<i32>,
) -> Result<transaction::Model> {
    if request.amount <= Decimal::ZERO {
        return Err(EngineError::Validation(
            "amount must be positive".to_string(),
        ));
    }
    if request.installment_count < 1 {
        return Err(EngineError::Validation(
            "installment_count must be at least 1".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let (status, approver_id) =
        resolve_status(&txn, &request, user_id, workspace_id).await?;
    let now = Utc::now().naive_utc();

    let anchor = if request.installment_count > 1 {
        insert_installment_plan(&txn, &request, user_id, workspace_id, status, now).await?
    } else if request.is_recurring
        && request.recurrence_period == Some(transaction::RecurrencePeriod::Monthly)
    {
        insert_monthly_series(&txn, &request, user_id, workspace_id, status, now).await?
    } else {
        row_template(&request, user_id, workspace_id, status, now)
            .insert(&txn)
            .await?
    };

    if let Some(approver_user_id) = approver_id {
        approval_request::ActiveModel {
            transaction_id: Set(anchor.id),
            requested_by_user_id: Set(user_id),
            approver_user_id: Set(approver_user_id),
            status: Set(approval_request::ApprovalStatus::Pending),
            created_at: Set(now),
            responded_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        debug!(
            anchor_id = anchor.id,
            approver = approver_user_id,
            "approval request attached"
        );
    }

    txn.commit().await?;
    info!(anchor_id = anchor.id, "transaction group created");
    Ok(anchor)
}

/// Applies the workspace approval rule: an expense above the configured
/// threshold enters as pending_approval, routed to another active member.
/// Returns the effective status and the chosen approver, if any.
async fn resolve_status(
    txn: &DatabaseTransaction,
    request: &NewTransaction,
    user_id: i32,
    workspace_id: Option<i32>,
) -> Result<(transaction::TransactionStatus, Option<i32>)> {
    let requested = request
        .status
        .unwrap_or(transaction::TransactionStatus::Paid);

    let Some(workspace_id) = workspace_id else {
        return Ok((requested, None));
    };
    if request.kind != transaction::TransactionKind::Expense {
        return Ok((requested, None));
    }

    let settings = workspace_settings::Entity::find()
        .filter(workspace_settings::Column::WorkspaceId.eq(workspace_id))
        .one(txn)
        .await?;
    let Some(settings) = settings else {
        return Ok((requested, None));
    };
    if request.amount <= settings.approval_threshold {
        return Ok((requested, None));
    }

    // First active member who is not the creator approves.
    let partner = workspace_member::Entity::find()
        .filter(workspace_member::Column::WorkspaceId.eq(workspace_id))
        .filter(workspace_member::Column::UserId.ne(user_id))
        .filter(workspace_member::Column::Status.eq(workspace_member::MemberStatus::Active))
        .one(txn)
        .await?;

    match partner {
        Some(partner) => Ok((
            transaction::TransactionStatus::PendingApproval,
            Some(partner.user_id),
        )),
        None => Ok((requested, None)),
    }
}

/// Base active model shared by every generated row; callers override the
/// per-occurrence fields before inserting.
fn row_template(
    request: &NewTransaction,
    user_id: i32,
    workspace_id: Option<i32>,
    status: transaction::TransactionStatus,
    now: NaiveDateTime,
) -> transaction::ActiveModel {
    transaction::ActiveModel {
        description: Set(request.description.clone()),
        amount: Set(request.amount),
        kind: Set(request.kind),
        date: Set(request.date),
        due_date: Set(request.due_date),
        status: Set(status),
        paid_at: Set(None),
        payment_method: Set(request.payment_method.clone()),
        category_id: Set(request.category_id),
        user_id: Set(user_id),
        created_by_user_id: Set(Some(user_id)),
        workspace_id: Set(workspace_id),
        is_joint: Set(request.is_joint),
        is_recurring: Set(request.is_recurring),
        recurrence_period: Set(request.recurrence_period),
        installment_count: Set(request.installment_count),
        installment_number: Set(1),
        parent_id: Set(None),
        created_at: Set(now),
        ..Default::default()
    }
}

/// Writes the N rows of an installment plan. Row 1 becomes the anchor; rows
/// 2..N reference it. Amounts come from `split_amount`, dates shift one
/// calendar month per installment.
async fn insert_installment_plan(
    txn: &DatabaseTransaction,
    request: &NewTransaction,
    user_id: i32,
    workspace_id: Option<i32>,
    status: transaction::TransactionStatus,
    now: NaiveDateTime,
) -> Result<transaction::Model> {
    let shares = split_amount(request.amount, request.installment_count);
    let mut anchor: Option<transaction::Model> = None;

    for (index, share) in shares.iter().enumerate() {
        let offset = index as u32;
        let mut row = row_template(request, user_id, workspace_id, status, now);
        row.amount = Set(*share);
        row.date = Set(shift_months(request.date, offset));
        row.due_date = Set(request.due_date.map(|due| shift_months(due, offset)));
        row.installment_number = Set(index as i32 + 1);
        row.parent_id = Set(anchor.as_ref().map(|a| a.id));

        let inserted = row.insert(txn).await?;
        if anchor.is_none() {
            anchor = Some(inserted);
        }
    }

    anchor.ok_or_else(|| {
        EngineError::Validation("installment plan produced no rows".to_string())
    })
}

/// Writes the twelve occurrences of a monthly series. Amounts stay
/// identical; only the dates walk forward. Installment numbering is not used
/// on this path.
async fn insert_monthly_series(
    txn: &DatabaseTransaction,
    request: &NewTransaction,
    user_id: i32,
    workspace_id: Option<i32>,
    status: transaction::TransactionStatus,
    now: NaiveDateTime,
) -> Result<transaction::Model> {
    let mut anchor: Option<transaction::Model> = None;

    for offset in 0..RECURRENCE_HORIZON {
        let mut row = row_template(request, user_id, workspace_id, status, now);
        row.date = Set(shift_months(request.date, offset));
        row.due_date = Set(request.due_date.map(|due| shift_months(due, offset)));
        row.parent_id = Set(anchor.as_ref().map(|a| a.id));

        let inserted = row.insert(txn).await?;
        if anchor.is_none() {
            anchor = Some(inserted);
        }
    }

    anchor.ok_or_else(|| {
        EngineError::Validation("recurring series produced no rows".to_string())
    })
}
