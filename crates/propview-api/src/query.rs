use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operators the record service understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    /// Exact field match
    Eq,
    /// Field >= value
    Gte,
    /// Field <= value
    Lte,
    /// Substring match on a text field
    Contains,
    /// Set membership; the value is an array of candidates
    In,
}

/// One field comparison in a record query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub field: String,
    pub direction: SortDirection,
}

/// Filter/sort configuration sent to the record service
///
/// An empty query returns the whole table. Filters compose with AND on
/// the service side, matching how the core composes predicates locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordQuery {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FieldFilter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field comparison
    pub fn filter(mut self, field: &str, op: FilterOp, value: Value) -> Self {
        self.filters.push(FieldFilter {
            field: field.to_string(),
            op,
            value,
        });
        self
    }

    /// Set the ordering; the service applies it after all filters
    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.order_by.is_none()
    }
}
