use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::ops::{Deref, DerefMut};
use uuid::Uuid;

use super::extract::FilterOptions;
use super::values::{date_value, number_value, parse_date, parse_number, split_list};
use crate::{
    config::QueryConfig,
    params::{ParamValue, RawParams},
};

/// Key holding the any-of list produced by free-text search.
pub const OR_KEY: &str = "OR";
/// Key marking a pattern condition's case sensitivity.
pub const MODE_KEY: &str = "mode";
pub const INSENSITIVE_MODE: &str = "insensitive";

/// Nested `where` conditions keyed by field name, in insertion order.
///
/// A field maps either to a literal (equality) or to an object of operator
/// keys such as `{"gte": 10, "lte": 20}`. Derefs to the underlying JSON map
/// so custom filter hooks can edit it directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionTree(Map<String, Value>);

impl ConditionTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The operator object for `field`, created or replacing a literal.
    pub fn operator_entry(&mut self, field: &str) -> &mut Map<String, Value> {
        let slot = self
            .0
            .entry(field)
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => map,
            _ => unreachable!("slot was just replaced with an object"),
        }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Deref for ConditionTree {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ConditionTree {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Map<String, Value>> for ConditionTree {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Wrap `leaf` in one object per segment of a dotted path.
fn nest_path(path: &str, leaf: Value) -> Value {
    path.rsplit('.').fold(leaf, |inner, segment| {
        let mut wrapper = Map::new();
        wrapper.insert(segment.to_string(), inner);
        Value::Object(wrapper)
    })
}

fn search_clause(term: &str, search_fields: &[String]) -> Value {
    Value::Array(
        search_fields
            .iter()
            .map(|field| {
                let mut contains = Map::new();
                contains.insert("contains".to_string(), Value::String(term.to_string()));
                contains.insert(MODE_KEY.to_string(), Value::String(INSENSITIVE_MODE.to_string()));
                nest_path(field, Value::Object(contains))
            })
            .collect(),
    )
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|text| !text.trim().is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Canonical form for UUID-shaped values, anything else unchanged.
fn normalize_identifier(value: &str) -> Value {
    let trimmed = value.trim();
    Value::String(
        Uuid::parse_str(trimmed).map_or_else(|_| trimmed.to_string(), |uuid| uuid.to_string()),
    )
}

fn is_listed(fields: &[String], key: &str) -> bool {
    fields.iter().any(|field| field == key)
}

/// Convert a pass-through parameter into a condition value.
///
/// Fields listed in the typed config lists are converted (and dropped when
/// they do not parse); `filter_fields` become equality or `in` conditions.
/// Anything else is copied verbatim: a string, or an array for a repeated key.
#[must_use]
pub fn apply_typed_filters(key: &str, value: &ParamValue, config: &QueryConfig) -> Option<Value> {
    let first = value.first()?;

    let typed = if is_listed(&config.boolean_fields, key) {
        parse_bool(first).map(Value::Bool)
    } else if is_listed(&config.number_fields, key) {
        parse_number(first).map(number_value)
    } else if is_listed(&config.date_fields, key) {
        parse_date(first).map(|date| date_value(&date))
    } else if is_listed(&config.filter_fields, key) {
        let values: Vec<Value> = value
            .values()
            .into_iter()
            .flat_map(split_list)
            .map(normalize_identifier)
            .collect();
        if value.is_multiple() || first.contains(',') {
            let mut membership = Map::new();
            membership.insert("in".to_string(), Value::Array(values));
            Some(Value::Object(membership))
        } else {
            Some(normalize_identifier(first))
        }
    } else {
        return Some(match value {
            ParamValue::Single(text) => Value::String(text.clone()),
            ParamValue::Multiple(texts) => {
                Value::Array(texts.iter().cloned().map(Value::String).collect())
            }
        });
    };

    if typed.is_none() {
        tracing::debug!(field = key, value = %first, "Dropping filter value of the wrong type");
    }
    typed
}

/// Combine operator conditions and extracted filters into one tree.
///
/// Rules apply in this order, later rules overwriting earlier ones:
/// 1. operator-bracket conditions
/// 2. `search` as an `OR` of case-insensitive `contains` over `search_fields`
/// 3. `dateFrom`/`dateTo` as `gte`/`lte` on `date_range_field`
/// 4. each `{field}Range` as `{gte, lte}`, replacing operator conditions
/// 5. `status` and `role`
/// 6. pass-through parameters, typed per [`apply_typed_filters`]
/// 7. the configured custom filter hook
#[must_use]
pub fn merge_conditions(
    filters: &FilterOptions,
    operator_tree: ConditionTree,
    raw: &RawParams,
    config: &QueryConfig,
) -> ConditionTree {
    let mut tree = operator_tree;

    if let Some(term) = non_blank(filters.search.as_ref())
        && !config.search_fields.is_empty()
    {
        tree.insert(OR_KEY.to_string(), search_clause(term, &config.search_fields));
    }

    if filters.date_from.is_some() || filters.date_to.is_some() {
        let entry = tree.operator_entry(&config.date_range_field);
        if let Some(from) = &filters.date_from {
            entry.insert("gte".to_string(), date_value(from));
        }
        if let Some(to) = &filters.date_to {
            entry.insert("lte".to_string(), date_value(to));
        }
    }

    for (field, range) in &filters.ranges {
        tree.insert(field.clone(), range.to_condition());
    }

    for (key, value) in [("status", &filters.status), ("role", &filters.role)] {
        if let Some(text) = non_blank(value.as_ref()) {
            tree.insert(key.to_string(), Value::String(text.to_string()));
        }
    }

    for (key, value) in filters.custom.iter() {
        if let Some(converted) = apply_typed_filters(key, value, config) {
            tree.insert(key.to_string(), converted);
        }
    }

    if let Some(hook) = &config.custom_filters {
        hook(raw, &mut tree);
    }

    tree
}
