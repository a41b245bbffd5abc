use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Person-scoped visibility filter for list views. Only meaningful inside a
/// workspace; outside one the owner filter already constrains the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PersonFilter {
    /// Rows created by the current user.
    Mine,
    /// Rows created by any other active workspace member.
    Partner,
    /// Rows flagged as joint expenses.
    Joint,
    /// No person restriction.
    All,
}

impl Default for PersonFilter {
    fn default() -> Self {
        Self::All
    }
}

/// How much of a transaction group a delete request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeleteScope {
    /// One occurrence: the referenced row, or the group member matching a
    /// given month/year.
    Single,
    /// The entire group the referenced row belongs to.
    All,
}

impl Default for DeleteScope {
    fn default() -> Self {
        Self::Single
    }
}
