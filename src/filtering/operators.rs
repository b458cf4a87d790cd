use serde_json::Value;

use super::conditions::{ConditionTree, INSENSITIVE_MODE, MODE_KEY};
use super::values::{number_value, parse_number, split_list};
use crate::params::{ParamValue, RawParams};

/// Comparison operators accepted in `field[operator]=value` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equality; replaces anything else set on the field
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Comma-separated list membership
    In,
    NotIn,
    Contains,
    StartsWith,
    EndsWith,
}

impl FilterOperator {
    pub const ALL: [Self; 11] = [
        Self::Eq,
        Self::Ne,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::In,
        Self::NotIn,
        Self::Contains,
        Self::StartsWith,
        Self::EndsWith,
    ];

    /// Parse the text between the brackets (case-sensitive).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    /// Operator name as written in the query string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::NotIn => "notIn",
            Self::Contains => "contains",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
        }
    }

    /// Key this operator writes into the field's condition object.
    ///
    /// `Eq` writes the literal directly and has no key.
    #[must_use]
    pub const fn condition_key(self) -> Option<&'static str> {
        match self {
            Self::Eq => None,
            Self::Ne => Some("not"),
            other => Some(other.as_str()),
        }
    }

    #[must_use]
    pub const fn is_pattern(self) -> bool {
        matches!(self, Self::Contains | Self::StartsWith | Self::EndsWith)
    }
}

/// Split `field[operator]` into its parts.
///
/// The key must end with `]`, contain exactly one `[`, and have a non-empty
/// field name. The operator text is returned even when unknown.
#[must_use]
pub fn split_operator_key(key: &str) -> Option<(&str, &str)> {
    let inner = key.strip_suffix(']')?;
    let (field, operator) = inner.split_once('[')?;
    if field.is_empty() || operator.contains('[') || operator.contains(']') {
        return None;
    }
    Some((field, operator))
}

fn operator_value(operator: FilterOperator, value: &ParamValue) -> Option<Value> {
    let first = value.first()?;
    let converted = match operator {
        FilterOperator::Gt | FilterOperator::Gte | FilterOperator::Lt | FilterOperator::Lte => {
            parse_number(first).map_or_else(|| Value::String(first.to_string()), number_value)
        }
        FilterOperator::In | FilterOperator::NotIn => Value::Array(
            value
                .values()
                .into_iter()
                .flat_map(split_list)
                .map(|item| Value::String(item.to_string()))
                .collect(),
        ),
        FilterOperator::Eq
        | FilterOperator::Ne
        | FilterOperator::Contains
        | FilterOperator::StartsWith
        | FilterOperator::EndsWith => Value::String(first.to_string()),
    };
    Some(converted)
}

/// Parse every `field[operator]=value` parameter into a condition tree.
///
/// Parameters are applied in declaration order. Operators on the same field
/// accumulate into one object, except `eq`, which replaces the whole entry;
/// an operator that follows an `eq` turns the field back into an object.
///
/// ```rust
/// use querycrate::{filtering::operators::parse_operator_filters, RawParams};
/// use serde_json::json;
///
/// let raw = RawParams::from_pairs([("status[in]", "active,pending"), ("age[gte]", "18")]);
/// let tree = parse_operator_filters(&raw);
/// assert_eq!(
///     tree.to_value(),
///     json!({"status": {"in": ["active", "pending"]}, "age": {"gte": 18}})
/// );
/// ```
#[must_use]
pub fn parse_operator_filters(raw: &RawParams) -> ConditionTree {
    let mut tree = ConditionTree::new();

    for (key, value) in raw.iter() {
        let Some((field, operator_name)) = split_operator_key(key) else {
            continue;
        };
        let Some(operator) = FilterOperator::parse(operator_name) else {
            tracing::debug!(param = key, operator = operator_name, "Ignoring unknown filter operator");
            continue;
        };
        let Some(converted) = operator_value(operator, value) else {
            continue;
        };

        match operator.condition_key() {
            None => {
                tree.insert(field.to_string(), converted);
            }
            Some(condition_key) => {
                let entry = tree.operator_entry(field);
                entry.insert(condition_key.to_string(), converted);
                if operator.is_pattern() {
                    entry.insert(MODE_KEY.to_string(), Value::String(INSENSITIVE_MODE.to_string()));
                }
            }
        }
    }

    tree
}
