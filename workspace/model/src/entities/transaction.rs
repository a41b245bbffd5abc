use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::{category, user, workspace};

/// Balance effect of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TransactionKind {
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// Settlement state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(24))")]
pub enum TransactionStatus {
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "pending_approval")]
    PendingApproval,
    #[sea_orm(string_value = "overdue")]
    Overdue,
}

/// Enum for recurrence periods of a simple (non-installment) series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum RecurrencePeriod {
    #[sea_orm(string_value = "daily")]
    Daily,
    #[sea_orm(string_value = "weekly")]
    Weekly,
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "yearly")]
    Yearly,
}

/// A single ledger row. Installment plans and recurring series are stored as
/// one row per occurrence, linked into a group through `parent_id`.
///
/// Group invariant: exactly one member of a group has `parent_id = NULL`
/// (the anchor); every other member points at the anchor's id. The tree is
/// never deeper than one level.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub description: String,
    /// Magnitude of the transaction. Always positive; the balance effect
    /// comes from `kind`.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub kind: TransactionKind,
    /// Nominal occurrence date.
    pub date: NaiveDateTime,
    /// Scheduling date for unpaid items.
    pub due_date: Option<NaiveDateTime>,
    pub status: TransactionStatus,
    pub paid_at: Option<NaiveDateTime>,
    pub payment_method: Option<String>,
    pub category_id: Option<i32>,
    pub user_id: i32,
    /// Who entered the row; differs from `user_id` in shared workspaces.
    pub created_by_user_id: Option<i32>,
    pub workspace_id: Option<i32>,
    pub is_joint: bool,
    pub is_recurring: bool,
    pub recurrence_period: Option<RecurrencePeriod>,
    /// Total number of members of an installment plan (1 outside a plan).
    pub installment_count: i32,
    /// 1-based position within an installment plan.
    pub installment_number: i32,
    /// Link to the group anchor. `None` marks the anchor itself.
    pub parent_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Self-referencing link from a group member to its anchor.
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::ParentId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    Parent,
    #[sea_orm(
        belongs_to = "category::Entity",
        from = "Column::CategoryId",
        to = "category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::UserId",
        to = "user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "user::Entity",
        from = "Column::CreatedByUserId",
        to = "user::Column::Id"
    )]
    CreatedBy,
    #[sea_orm(
        belongs_to = "workspace::Entity",
        from = "Column::WorkspaceId",
        to = "workspace::Column::Id"
    )]
    Workspace,
}

impl Related<category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<workspace::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspace.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Ordering/matching date: `due_date` when present, `date` otherwise.
    pub fn effective_date(&self) -> NaiveDateTime {
        self.due_date.unwrap_or(self.date)
    }

    /// A row with no parent is the root of its group.
    pub fn is_anchor(&self) -> bool {
        self.parent_id.is_none()
    }
}
