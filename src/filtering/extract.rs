use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

use super::operators::split_operator_key;
use super::values::{date_value, number_value, parse_date, parse_number};
use crate::params::{ParamValue, RawParams};

/// Parameter names consumed by named slots; never passed through.
pub const RESERVED_PARAMS: [&str; 9] = [
    "page",
    "limit",
    "sortBy",
    "sortOrder",
    "search",
    "dateFrom",
    "dateTo",
    "status",
    "role",
];

/// Names of structural entries in serialized filters; never passed through.
pub const STRUCTURAL_KEYS: [&str; 2] = ["searchFields", "ranges"];

const RANGE_SUFFIX: &str = "Range";

/// Bounds of a `{field}Range=min,max` parameter. Both bounds share a kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RangeFilter {
    Number { min: f64, max: f64 },
    Date { min: DateTime<Utc>, max: DateTime<Utc> },
}

impl RangeFilter {
    /// Parse `min,max`, preferring numbers over dates.
    ///
    /// Returns `None` when there is no comma or when the bounds do not both
    /// parse as the same kind.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (min, max) = value.split_once(',')?;
        let (min, max) = (min.trim(), max.trim());

        if let (Some(min), Some(max)) = (parse_number(min), parse_number(max)) {
            return Some(Self::Number { min, max });
        }
        if let (Some(min), Some(max)) = (parse_date(min), parse_date(max)) {
            return Some(Self::Date { min, max });
        }
        None
    }

    /// The bounds as a `{gte, lte}` condition.
    #[must_use]
    pub fn to_condition(&self) -> Value {
        let (gte, lte) = match self {
            Self::Number { min, max } => (number_value(*min), number_value(*max)),
            Self::Date { min, max } => (date_value(min), date_value(max)),
        };
        let mut condition = Map::new();
        condition.insert("gte".to_string(), gte);
        condition.insert("lte".to_string(), lte);
        Value::Object(condition)
    }
}

/// Normalized filters pulled from the raw parameters.
///
/// `custom` holds every parameter without a named slot, in declaration
/// order, exactly as it was received.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub search: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "serialize_ranges")]
    pub ranges: Vec<(String, RangeFilter)>,
    #[serde(flatten)]
    pub custom: PassThrough,
}

fn serialize_ranges<S>(ranges: &[(String, RangeFilter)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_map(ranges.iter().map(|(field, range)| (field, range)))
}

/// Parameters without a named slot, kept in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassThrough(Vec<(String, ParamValue)>);

impl PassThrough {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ParamValue)> for PassThrough {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for PassThrough {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, value)| (key, value)))
    }
}

impl FilterOptions {
    #[must_use]
    pub fn range(&self, field: &str) -> Option<&RangeFilter> {
        self.ranges
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, range)| range)
    }

    #[must_use]
    pub fn custom_value(&self, key: &str) -> Option<&ParamValue> {
        self.custom.get(key)
    }
}

fn parse_date_param(raw: &RawParams, key: &str) -> Option<DateTime<Utc>> {
    let value = raw.first(key)?;
    let parsed = parse_date(value);
    if parsed.is_none() {
        tracing::debug!(param = key, value = %value, "Ignoring unparsable date");
    }
    parsed
}

fn is_range_param(key: &str, range_fields: &[String]) -> bool {
    key.strip_suffix(RANGE_SUFFIX)
        .is_some_and(|field| range_fields.iter().any(|name| name == field))
}

/// Extract the named filter slots, ranges and pass-through parameters.
///
/// Invalid `dateFrom`/`dateTo` values and ranges whose bounds are not both
/// numbers or both dates are dropped. Operator-bracket keys
/// (`price[gte]`) belong to the operator parser and are not passed through.
#[must_use]
pub fn extract_filters(raw: &RawParams, range_fields: &[String]) -> FilterOptions {
    let mut ranges = Vec::new();
    for field in range_fields {
        let key = format!("{field}{RANGE_SUFFIX}");
        let Some(value) = raw.first(&key) else {
            continue;
        };
        match RangeFilter::parse(value) {
            Some(range) => ranges.push((field.clone(), range)),
            None => tracing::debug!(param = %key, value = %value, "Dropping unparsable range"),
        }
    }

    let custom = raw
        .iter()
        .filter(|(key, _)| {
            !RESERVED_PARAMS.contains(key)
                && !STRUCTURAL_KEYS.contains(key)
                && !is_range_param(key, range_fields)
                && split_operator_key(key).is_none()
        })
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();

    FilterOptions {
        search: raw.first("search").map(str::to_string),
        date_from: parse_date_param(raw, "dateFrom"),
        date_to: parse_date_param(raw, "dateTo"),
        status: raw.first("status").map(str::to_string),
        role: raw.first("role").map(str::to_string),
        ranges,
        custom,
    }
}
