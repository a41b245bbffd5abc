use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Email).unique_key())
                    .col(string_null(Users::FullName))
                    .col(boolean(Users::IsActive).default(true))
                    .to_owned(),
            )
            .await?;

        // Create workspaces table
        manager
            .create_table(
                Table::create()
                    .table(Workspaces::Table)
                    .if_not_exists()
                    .col(pk_auto(Workspaces::Id))
                    .col(string(Workspaces::Name))
                    .col(string_len(Workspaces::Kind, 16))
                    .col(date_time(Workspaces::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // Create workspace_members table (join table)
        manager
            .create_table(
                Table::create()
                    .table(WorkspaceMembers::Table)
                    .if_not_exists()
                    .col(integer(WorkspaceMembers::UserId))
                    .col(integer(WorkspaceMembers::WorkspaceId))
                    .col(string_len(WorkspaceMembers::Role, 16))
                    .col(string_len(WorkspaceMembers::Status, 16))
                    .primary_key(
                        Index::create()
                            .name("pk_workspace_members")
                            .col(WorkspaceMembers::UserId)
                            .col(WorkspaceMembers::WorkspaceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workspace_members_user")
                            .from(WorkspaceMembers::Table, WorkspaceMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workspace_members_workspace")
                            .from(WorkspaceMembers::Table, WorkspaceMembers::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create workspace_settings table
        manager
            .create_table(
                Table::create()
                    .table(WorkspaceSettings::Table)
                    .if_not_exists()
                    .col(pk_auto(WorkspaceSettings::Id))
                    .col(integer(WorkspaceSettings::WorkspaceId).unique_key())
                    .col(decimal_len(WorkspaceSettings::ApprovalThreshold, 16, 4))
                    .col(boolean(WorkspaceSettings::RequireBothApproval).default(false))
                    .col(decimal_len(WorkspaceSettings::MonthlySavingsGoal, 16, 4))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workspace_settings_workspace")
                            .from(WorkspaceSettings::Table, WorkspaceSettings::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create categories table
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(pk_auto(Categories::Id))
                    .col(string(Categories::Name))
                    .col(string_len(Categories::Kind, 16))
                    .col(string(Categories::Color))
                    .col(string_null(Categories::Icon))
                    .col(decimal_len(Categories::BudgetLimit, 16, 4))
                    .col(integer(Categories::UserId))
                    .col(integer_null(Categories::WorkspaceId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_categories_user")
                            .from(Categories::Table, Categories::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_categories_workspace")
                            .from(Categories::Table, Categories::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create transactions table. The self-referencing parent link builds
        // the depth-one group tree the lifecycle engine maintains.
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(pk_auto(Transactions::Id))
                    .col(string(Transactions::Description))
                    .col(decimal_len(Transactions::Amount, 16, 4))
                    .col(string_len(Transactions::Kind, 16))
                    .col(date_time(Transactions::Date))
                    .col(date_time_null(Transactions::DueDate))
                    .col(string_len(Transactions::Status, 24))
                    .col(date_time_null(Transactions::PaidAt))
                    .col(string_null(Transactions::PaymentMethod))
                    .col(integer_null(Transactions::CategoryId))
                    .col(integer(Transactions::UserId))
                    .col(integer_null(Transactions::CreatedByUserId))
                    .col(integer_null(Transactions::WorkspaceId))
                    .col(boolean(Transactions::IsJoint).default(false))
                    .col(boolean(Transactions::IsRecurring).default(false))
                    .col(string_len_null(Transactions::RecurrencePeriod, 16))
                    .col(integer(Transactions::InstallmentCount).default(1))
                    .col(integer(Transactions::InstallmentNumber).default(1))
                    .col(integer_null(Transactions::ParentId))
                    .col(date_time(Transactions::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_parent")
                            .from(Transactions::Table, Transactions::ParentId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_category")
                            .from(Transactions::Table, Transactions::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_user")
                            .from(Transactions::Table, Transactions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_created_by")
                            .from(Transactions::Table, Transactions::CreatedByUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_workspace")
                            .from(Transactions::Table, Transactions::WorkspaceId)
                            .to(Workspaces::Table, Workspaces::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Group membership lookups filter on parent_id constantly
        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_parent_id")
                    .table(Transactions::Table)
                    .col(Transactions::ParentId)
                    .to_owned(),
            )
            .await?;

        // Create approval_requests table
        manager
            .create_table(
                Table::create()
                    .table(ApprovalRequests::Table)
                    .if_not_exists()
                    .col(pk_auto(ApprovalRequests::Id))
                    .col(integer(ApprovalRequests::TransactionId))
                    .col(integer(ApprovalRequests::RequestedByUserId))
                    .col(integer(ApprovalRequests::ApproverUserId))
                    .col(string_len(ApprovalRequests::Status, 16))
                    .col(date_time(ApprovalRequests::CreatedAt))
                    .col(date_time_null(ApprovalRequests::RespondedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approval_requests_transaction")
                            .from(ApprovalRequests::Table, ApprovalRequests::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approval_requests_requested_by")
                            .from(ApprovalRequests::Table, ApprovalRequests::RequestedByUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approval_requests_approver")
                            .from(ApprovalRequests::Table, ApprovalRequests::ApproverUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(ApprovalRequests::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(WorkspaceSettings::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(WorkspaceMembers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Workspaces::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

// Define identifiers for all tables

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    FullName,
    IsActive,
}

#[derive(DeriveIden)]
enum Workspaces {
    Table,
    Id,
    Name,
    Kind,
    CreatedAt,
}

#[derive(DeriveIden)]
enum WorkspaceMembers {
    Table,
    UserId,
    WorkspaceId,
    Role,
    Status,
}

#[derive(DeriveIden)]
enum WorkspaceSettings {
    Table,
    Id,
    WorkspaceId,
    ApprovalThreshold,
    RequireBothApproval,
    MonthlySavingsGoal,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Kind,
    Color,
    Icon,
    BudgetLimit,
    UserId,
    WorkspaceId,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    Description,
    Amount,
    Kind,
    Date,
    DueDate,
    Status,
    PaidAt,
    PaymentMethod,
    CategoryId,
    UserId,
    CreatedByUserId,
    WorkspaceId,
    IsJoint,
    IsRecurring,
    RecurrencePeriod,
    InstallmentCount,
    InstallmentNumber,
    ParentId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ApprovalRequests {
    Table,
    Id,
    TransactionId,
    RequestedByUserId,
    ApproverUserId,
    Status,
    CreatedAt,
    RespondedAt,
}
