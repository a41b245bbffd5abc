//! Shared fixtures for the engine's async tests: an in-memory database with
//! the real migrations applied, plus seed helpers for the collaborator
//! tables the engine reads.

use chrono::{NaiveDate, NaiveDateTime};
use migration::{Migrator, MigratorTrait};
use model::entities::{
    transaction, user, workspace, workspace_member, workspace_settings,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set};
use std::str::FromStr;

use crate::generator::NewTransaction;

pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .expect("Failed to enable foreign keys");

    Migrator::up(&db, None).await.expect("Migrations failed");
    db
}

/// Noon timestamp, so date arithmetic in tests never straddles midnight.
pub fn dt(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub async fn seed_user(db: &DatabaseConnection, email: &str) -> user::Model {
    user::ActiveModel {
        email: Set(email.to_string()),
        full_name: Set(None),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed user")
}

/// Workspace with the given active members and an approval threshold.
pub async fn seed_workspace(
    db: &DatabaseConnection,
    name: &str,
    member_ids: &[i32],
    approval_threshold: &str,
) -> workspace::Model {
    let ws = workspace::ActiveModel {
        name: Set(name.to_string()),
        kind: Set(workspace::WorkspaceKind::Family),
        created_at: Set(dt(2024, 1, 1)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed workspace");

    for user_id in member_ids {
        workspace_member::ActiveModel {
            user_id: Set(*user_id),
            workspace_id: Set(ws.id),
            role: Set(workspace_member::MemberRole::Member),
            status: Set(workspace_member::MemberStatus::Active),
        }
        .insert(db)
        .await
        .expect("Failed to seed workspace member");
    }

    workspace_settings::ActiveModel {
        workspace_id: Set(ws.id),
        approval_threshold: Set(Decimal::from_str(approval_threshold).unwrap()),
        require_both_approval: Set(false),
        monthly_savings_goal: Set(Decimal::from_str("5000.00").unwrap()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed workspace settings");

    ws
}

/// Baseline expense request: paid, single occurrence, mid-January 2024.
pub fn expense_request(description: &str, amount: &str) -> NewTransaction {
    NewTransaction {
        description: description.to_string(),
        amount: Decimal::from_str(amount).unwrap(),
        kind: transaction::TransactionKind::Expense,
        date: dt(2024, 1, 15),
        due_date: None,
        status: None,
        payment_method: None,
        category_id: None,
        is_joint: false,
        is_recurring: false,
        recurrence_period: None,
        installment_count: 1,
    }
}

/// Unsaved paid-expense row; tests override fields before inserting.
pub fn row(user_id: i32, amount: &str, date: NaiveDateTime) -> transaction::ActiveModel {
    transaction::ActiveModel {
        description: Set("Row".to_string()),
        amount: Set(Decimal::from_str(amount).unwrap()),
        kind: Set(transaction::TransactionKind::Expense),
        date: Set(date),
        due_date: Set(None),
        status: Set(transaction::TransactionStatus::Paid),
        paid_at: Set(None),
        payment_method: Set(None),
        category_id: Set(None),
        user_id: Set(user_id),
        created_by_user_id: Set(Some(user_id)),
        workspace_id: Set(None),
        is_joint: Set(false),
        is_recurring: Set(false),
        recurrence_period: Set(None),
        installment_count: Set(1),
        installment_number: Set(1),
        parent_id: Set(None),
        created_at: Set(date),
        ..Default::default()
    }
}

/// Inserts a row with explicit group coordinates.
pub async fn insert_row(
    db: &DatabaseConnection,
    user_id: i32,
    amount: &str,
    date: NaiveDateTime,
    installment_count: i32,
    installment_number: i32,
    parent_id: Option<i32>,
) -> transaction::Model {
    let mut model = row(user_id, amount, date);
    model.installment_count = Set(installment_count);
    model.installment_number = Set(installment_number);
    model.parent_id = Set(parent_id);
    model.insert(db).await.expect("Failed to insert row")
}
