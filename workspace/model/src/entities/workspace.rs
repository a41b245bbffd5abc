use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

/// Flavor of a shared workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum WorkspaceKind {
    #[sea_orm(string_value = "personal")]
    Personal,
    #[sea_orm(string_value = "family")]
    Family,
    #[sea_orm(string_value = "business")]
    Business,
}

/// A shared ledger scope. Transactions carrying a `workspace_id` are visible
/// to every member instead of just their owner.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "workspaces")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub kind: WorkspaceKind,
    pub created_at: NaiveDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,
    #[sea_orm(has_many = "super::workspace_member::Entity")]
    Member,
    #[sea_orm(has_one = "super::workspace_settings::Entity")]
    Settings,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::workspace_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl Related<super::workspace_settings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Settings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
