//! Common transport-layer types shared between the HTTP handlers and the
//! lifecycle engine. These are the value objects both sides agree on so the
//! engine never has to know about axum and the handlers never have to know
//! about query internals.

mod filters;
mod reports;

pub use filters::{DeleteScope, PersonFilter};
pub use reports::{CategoryBreakdown, DashboardSummary, TrendPoint};
