use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Separator between relation and field in a sort path (`author.name`).
const PATH_SEPARATOR: char = '.';

/// A value given either once or as an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Every value in order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<&T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values.iter().collect(),
        }
    }

    #[must_use]
    pub const fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Case-insensitive; anything other than `asc` sorts descending.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}

/// One sort key or an ordered list of them, as handed to the data store.
///
/// Each entry is a single-key object; dotted field paths nest one object per
/// path segment, so `author.name` asc becomes `{"author": {"name": "asc"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OrderTree {
    Single(Map<String, Value>),
    Multiple(Vec<Map<String, Value>>),
}

impl OrderTree {
    /// The sort entries in priority order.
    #[must_use]
    pub fn entries(&self) -> Vec<&Map<String, Value>> {
        match self {
            Self::Single(entry) => vec![entry],
            Self::Multiple(entries) => entries.iter().collect(),
        }
    }
}

/// Build a single-key object, nesting on each path segment.
fn nested_order(field: &str, order: SortOrder) -> Map<String, Value> {
    let mut segments = field.rsplit(PATH_SEPARATOR);
    let mut entry = Map::new();
    // rsplit always yields at least one segment
    let leaf = segments.next().unwrap_or(field);
    entry.insert(leaf.to_string(), Value::String(order.as_str().to_string()));

    for parent in segments {
        let mut wrapper = Map::new();
        wrapper.insert(parent.to_string(), Value::Object(entry));
        entry = wrapper;
    }
    entry
}

/// Direction for the sort key at `index` of a multi-field sort.
///
/// Falls back from the positional order to the first listed order, then to
/// descending when the list is empty.
fn order_at(sort_order: &OneOrMany<SortOrder>, index: usize) -> SortOrder {
    match sort_order {
        OneOrMany::One(order) => *order,
        OneOrMany::Many(orders) => orders
            .get(index)
            .or_else(|| orders.first())
            .copied()
            .unwrap_or(SortOrder::Desc),
    }
}

/// Build the order tree for resolved sort fields and directions.
///
/// A single field uses the scalar order or the first listed one. A list of
/// fields yields one entry per field in the given order; the lists are not
/// required to have equal lengths.
///
/// ```rust
/// use querycrate::filtering::sort::{build_order, OneOrMany, SortOrder};
/// use serde_json::json;
///
/// let order = build_order(
///     &OneOrMany::One("user.name".to_string()),
///     &OneOrMany::One(SortOrder::Asc),
/// );
/// assert_eq!(serde_json::to_value(&order).unwrap(), json!({"user": {"name": "asc"}}));
/// ```
#[must_use]
pub fn build_order(sort_by: &OneOrMany<String>, sort_order: &OneOrMany<SortOrder>) -> OrderTree {
    match sort_by {
        OneOrMany::One(field) => OrderTree::Single(nested_order(field, order_at(sort_order, 0))),
        OneOrMany::Many(fields) => OrderTree::Multiple(
            fields
                .iter()
                .enumerate()
                .map(|(index, field)| nested_order(field, order_at(sort_order, index)))
                .collect(),
        ),
    }
}
