//! Per-resource configuration for query parsing.

use serde::Deserialize;
use std::{fmt, sync::Arc};

use crate::{
    filtering::{conditions::ConditionTree, sort::SortOrder},
    params::RawParams,
};

/// Caller-supplied hook that runs after every automatic rule.
///
/// It receives the raw parameters and the finished condition tree and may
/// edit the tree freely, e.g. to add visibility restrictions.
pub type CustomFilterHook = Arc<dyn Fn(&RawParams, &mut ConditionTree) + Send + Sync>;

/// Options controlling how parameters become pagination, filters and sorting.
///
/// Deserializable from any serde format with camelCase keys; every key is
/// optional. The custom filter hook can only be attached in code.
///
/// ```rust
/// use querycrate::QueryConfig;
///
/// let config = QueryConfig::default()
///     .with_search_fields(["name", "email"])
///     .with_range_fields(["price"])
///     .with_allowed_sort_fields(["name", "createdAt"])
///     .with_max_limit(50);
/// assert_eq!(config.default_limit, 10);
/// ```
#[derive(Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryConfig {
    /// Fields searched with case-insensitive `contains` for `search`
    pub search_fields: Vec<String>,
    /// Fields whose plain parameters become equality or `in` conditions
    pub filter_fields: Vec<String>,
    pub boolean_fields: Vec<String>,
    pub number_fields: Vec<String>,
    pub date_fields: Vec<String>,
    /// Field that `dateFrom`/`dateTo` constrain
    pub date_range_field: String,
    /// Fields accepting a `{field}Range=min,max` parameter
    pub range_fields: Vec<String>,
    pub default_limit: u64,
    pub max_limit: u64,
    pub default_sort_by: String,
    pub default_sort_order: SortOrder,
    /// Sort whitelist; empty allows any field
    pub allowed_sort_fields: Vec<String>,
    #[serde(skip)]
    pub custom_filters: Option<CustomFilterHook>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            search_fields: Vec::new(),
            filter_fields: Vec::new(),
            boolean_fields: Vec::new(),
            number_fields: Vec::new(),
            date_fields: Vec::new(),
            date_range_field: "createdAt".to_string(),
            range_fields: Vec::new(),
            default_limit: 10,
            max_limit: 100,
            default_sort_by: "createdAt".to_string(),
            default_sort_order: SortOrder::Desc,
            allowed_sort_fields: Vec::new(),
            custom_filters: None,
        }
    }
}

fn to_strings<I, S>(fields: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fields.into_iter().map(Into::into).collect()
}

impl QueryConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields = to_strings(fields);
        self
    }

    #[must_use]
    pub fn with_filter_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_fields = to_strings(fields);
        self
    }

    #[must_use]
    pub fn with_boolean_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.boolean_fields = to_strings(fields);
        self
    }

    #[must_use]
    pub fn with_number_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.number_fields = to_strings(fields);
        self
    }

    #[must_use]
    pub fn with_date_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.date_fields = to_strings(fields);
        self
    }

    #[must_use]
    pub fn with_date_range_field(mut self, field: impl Into<String>) -> Self {
        self.date_range_field = field.into();
        self
    }

    #[must_use]
    pub fn with_range_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.range_fields = to_strings(fields);
        self
    }

    #[must_use]
    pub const fn with_default_limit(mut self, limit: u64) -> Self {
        self.default_limit = limit;
        self
    }

    #[must_use]
    pub const fn with_max_limit(mut self, limit: u64) -> Self {
        self.max_limit = limit;
        self
    }

    #[must_use]
    pub fn with_default_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.default_sort_by = field.into();
        self.default_sort_order = order;
        self
    }

    #[must_use]
    pub fn with_allowed_sort_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_sort_fields = to_strings(fields);
        self
    }

    /// Attach the hook that runs last when building the condition tree.
    #[must_use]
    pub fn with_custom_filters<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RawParams, &mut ConditionTree) + Send + Sync + 'static,
    {
        self.custom_filters = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for QueryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryConfig")
            .field("search_fields", &self.search_fields)
            .field("filter_fields", &self.filter_fields)
            .field("boolean_fields", &self.boolean_fields)
            .field("number_fields", &self.number_fields)
            .field("date_fields", &self.date_fields)
            .field("date_range_field", &self.date_range_field)
            .field("range_fields", &self.range_fields)
            .field("default_limit", &self.default_limit)
            .field("max_limit", &self.max_limit)
            .field("default_sort_by", &self.default_sort_by)
            .field("default_sort_order", &self.default_sort_order)
            .field("allowed_sort_fields", &self.allowed_sort_fields)
            .field("custom_filters", &self.custom_filters.is_some())
            .finish()
    }
}
