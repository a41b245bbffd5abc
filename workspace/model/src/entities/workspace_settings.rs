use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// Per-workspace knobs consumed by the transaction generator. Expenses above
/// `approval_threshold` enter the ledger as `pending_approval`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "workspace_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub workspace_id: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub approval_threshold: Decimal,
    pub require_both_approval: bool,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub monthly_savings_goal: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::workspace::Entity",
        from = "Column::WorkspaceId",
        to = "super::workspace::Column::Id",
        on_delete = "Cascade"
    )]
    Workspace,
}

impl Related<super::workspace::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workspace.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
