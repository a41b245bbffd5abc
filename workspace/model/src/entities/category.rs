use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::transaction::TransactionKind;

/// A spending or income bucket. Categories are scoped either to a single
/// user or to a workspace, and carry an optional monthly budget limit.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub kind: TransactionKind,
    pub color: String,
    /// Icon name understood by the client (e.g. "Home", "Car").
    pub icon: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub budget_limit: Decimal,
    pub user_id: i32,
    pub workspace_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(
        belongs_to = "super::workspace::Entity",
        from = "Column::WorkspaceId",
        to = "super::workspace::Column::Id"
    )]
    Workspace,
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
