use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One point of an income/expense trend series.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TrendPoint {
    /// Human-readable window label (e.g. "Mar 2024").
    pub name: String,
    pub value: Decimal,
}

/// Per-category share of the period's income or expenses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CategoryBreakdown {
    pub name: String,
    pub value: Decimal,
    /// Share of the period total, 0-100 with one decimal.
    pub percentage: f64,
    pub limit: Decimal,
    pub icon: Option<String>,
}

/// Dashboard read-model for one target month: paid totals, a trend window
/// around the month, and category breakdowns for both directions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DashboardSummary {
    pub total_balance: Decimal,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub income_trend: Vec<TrendPoint>,
    pub expense_trend: Vec<TrendPoint>,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub income_category_breakdown: Vec<CategoryBreakdown>,
}
