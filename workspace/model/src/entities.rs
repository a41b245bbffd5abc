//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the finance tracking application here.
//! The schema mirrors the relational layout the lifecycle engine expects:
//! transactions form depth-one groups through a self-referencing parent
//! link, and the remaining tables scope ownership and approvals.

pub mod approval_request;
pub mod category;
pub mod transaction;
pub mod user;
pub mod workspace;
pub mod workspace_member;
pub mod workspace_settings;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::approval_request::Entity as ApprovalRequest;
    pub use super::category::Entity as Category;
    pub use super::transaction::Entity as Transaction;
    pub use super::user::Entity as User;
    pub use super::workspace::Entity as Workspace;
    pub use super::workspace_member::Entity as WorkspaceMember;
    pub use super::workspace_settings::Entity as WorkspaceSettings;
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        // Connect to the SQLite database
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        // Try to apply migrations first
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        // Setup database
        let db = setup_db().await?;

        // Create users
        let user1 = user::ActiveModel {
            email: Set("alice@example.com".to_string()),
            full_name: Set(Some("Alice".to_string())),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let user2 = user::ActiveModel {
            email: Set("bob@example.com".to_string()),
            full_name: Set(None),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Create a shared workspace with both users as members
        let ws = workspace::ActiveModel {
            name: Set("Household".to_string()),
            kind: Set(workspace::WorkspaceKind::Family),
            created_at: Set(NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        for uid in [user1.id, user2.id] {
            workspace_member::ActiveModel {
                user_id: Set(uid),
                workspace_id: Set(ws.id),
                role: Set(workspace_member::MemberRole::Member),
                status: Set(workspace_member::MemberStatus::Active),
            }
            .insert(&db)
            .await?;
        }

        let settings = workspace_settings::ActiveModel {
            workspace_id: Set(ws.id),
            approval_threshold: Set(Decimal::new(50000, 2)), // 500.00
            require_both_approval: Set(false),
            monthly_savings_goal: Set(Decimal::new(500000, 2)),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Create a category
        let groceries = category::ActiveModel {
            name: Set("Groceries".to_string()),
            kind: Set(transaction::TransactionKind::Expense),
            color: Set("#22c55e".to_string()),
            icon: Set(Some("ShoppingCart".to_string())),
            budget_limit: Set(Decimal::new(80000, 2)),
            user_id: Set(user1.id),
            workspace_id: Set(Some(ws.id)),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Create an anchor transaction with one child installment
        let date = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        let anchor = transaction::ActiveModel {
            description: Set("Fridge".to_string()),
            amount: Set(Decimal::new(5000, 2)), // 50.00
            kind: Set(transaction::TransactionKind::Expense),
            date: Set(date),
            due_date: Set(None),
            status: Set(transaction::TransactionStatus::Paid),
            category_id: Set(Some(groceries.id)),
            user_id: Set(user1.id),
            created_by_user_id: Set(Some(user1.id)),
            workspace_id: Set(Some(ws.id)),
            is_joint: Set(false),
            is_recurring: Set(false),
            recurrence_period: Set(None),
            installment_count: Set(2),
            installment_number: Set(1),
            parent_id: Set(None),
            created_at: Set(date),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let child = transaction::ActiveModel {
            description: Set("Fridge".to_string()),
            amount: Set(Decimal::new(5000, 2)),
            kind: Set(transaction::TransactionKind::Expense),
            date: Set(date),
            due_date: Set(Some(
                NaiveDate::from_ymd_opt(2024, 4, 15)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
            )),
            status: Set(transaction::TransactionStatus::Pending),
            category_id: Set(Some(groceries.id)),
            user_id: Set(user1.id),
            created_by_user_id: Set(Some(user1.id)),
            workspace_id: Set(Some(ws.id)),
            is_joint: Set(false),
            is_recurring: Set(false),
            recurrence_period: Set(None),
            installment_count: Set(2),
            installment_number: Set(2),
            parent_id: Set(Some(anchor.id)),
            created_at: Set(date),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Attach an approval request to the anchor
        approval_request::ActiveModel {
            transaction_id: Set(anchor.id),
            requested_by_user_id: Set(user1.id),
            approver_user_id: Set(user2.id),
            status: Set(approval_request::ApprovalStatus::Pending),
            created_at: Set(date),
            responded_at: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Read back and verify data
        let users = User::find().all(&db).await?;
        assert_eq!(users.len(), 2);

        let members = WorkspaceMember::find()
            .filter(workspace_member::Column::WorkspaceId.eq(ws.id))
            .all(&db)
            .await?;
        assert_eq!(members.len(), 2);

        let stored_settings = WorkspaceSettings::find()
            .filter(workspace_settings::Column::WorkspaceId.eq(ws.id))
            .one(&db)
            .await?
            .unwrap();
        assert_eq!(stored_settings.id, settings.id);
        assert_eq!(stored_settings.approval_threshold, Decimal::new(50000, 2));

        // Verify the group shape: one anchor, one child pointing at it
        assert!(anchor.is_anchor());
        assert!(!child.is_anchor());
        let children = Transaction::find()
            .filter(transaction::Column::ParentId.eq(anchor.id))
            .all(&db)
            .await?;
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, child.id);
        assert_eq!(children[0].installment_number, 2);

        // Effective date prefers due_date when present
        assert_eq!(anchor.effective_date(), anchor.date);
        assert_eq!(child.effective_date(), child.due_date.unwrap());

        // Verify the approval request landed on the anchor
        let requests = ApprovalRequest::find()
            .filter(approval_request::Column::TransactionId.eq(anchor.id))
            .all(&db)
            .await?;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].approver_user_id, user2.id);

        Ok(())
    }
}
