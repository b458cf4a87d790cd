//! Parsing entry point and the paged fetch built on top of it.

use async_trait::async_trait;
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    config::QueryConfig,
    filtering::{
        ConditionTree, FilterOptions, OrderTree, PaginationMeta, PaginationParams, build_order,
        compute_meta, extract_filters, merge_conditions, parse_operator_filters, resolve_pagination,
        pagination::range_headers,
    },
    params::RawParams,
};

/// Everything a data store needs to fetch one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindManyArgs {
    #[serde(rename = "where")]
    pub condition: ConditionTree,
    pub order_by: OrderTree,
    pub skip: u64,
    pub take: u64,
}

/// The result of parsing one set of query parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuery {
    pub pagination: PaginationParams,
    pub filters: FilterOptions,
    #[serde(rename = "where")]
    pub condition: ConditionTree,
    pub order_by: OrderTree,
    /// Ready-made arguments for [`QueryExecutor::find_many`]
    pub find_many: FindManyArgs,
}

/// A page of records with its pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

impl<T: Serialize> Paginated<T> {
    /// JSON response carrying a `Content-Range` header for this page,
    /// e.g. `products 20-29/95`.
    #[must_use]
    pub fn into_response_with_range(self, resource_name: &str) -> Response {
        let skip = self
            .meta
            .current_page
            .saturating_sub(1)
            .saturating_mul(self.meta.items_per_page);
        let headers = range_headers(
            skip,
            self.meta.items_per_page,
            self.meta.total_items,
            resource_name,
        );
        (headers, Json(self)).into_response()
    }
}

/// A data store able to run a parsed query.
///
/// `find_many` and `count` must not depend on each other; [`execute_query`]
/// runs them concurrently.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    type Record: Send;
    type Error: Send;

    async fn find_many(&self, args: &FindManyArgs) -> Result<Vec<Self::Record>, Self::Error>;

    async fn count(&self, condition: &ConditionTree) -> Result<u64, Self::Error>;
}

/// Parse raw query parameters into pagination, filters, conditions and order.
///
/// Pure and deterministic: the same parameters and config always produce
/// the same result.
///
/// ```rust
/// use querycrate::{parse_query, QueryConfig, RawParams};
/// use serde_json::json;
///
/// let raw = RawParams::from_pairs([("page", "2"), ("limit", "5"), ("role", "USER")]);
/// let parsed = parse_query(&raw, &QueryConfig::default());
/// assert_eq!(parsed.find_many.skip, 5);
/// assert_eq!(parsed.condition.to_value(), json!({"role": "USER"}));
/// ```
#[must_use]
pub fn parse_query(raw: &RawParams, config: &QueryConfig) -> ParsedQuery {
    let pagination = resolve_pagination(raw, config);
    let filters = extract_filters(raw, &config.range_fields);
    let condition = merge_conditions(&filters, parse_operator_filters(raw), raw, config);
    let order_by = build_order(&pagination.sort_by, &pagination.sort_order);

    tracing::trace!(
        page = pagination.page,
        limit = pagination.limit,
        conditions = condition.len(),
        "Parsed query parameters"
    );

    let find_many = FindManyArgs {
        condition: condition.clone(),
        order_by: order_by.clone(),
        skip: pagination.skip,
        take: pagination.limit,
    };

    ParsedQuery {
        pagination,
        filters,
        condition,
        order_by,
        find_many,
    }
}

/// Parse the parameters, then fetch the page and the total count together.
///
/// # Errors
///
/// Returns the store's error unchanged if either fetch fails; no partial
/// result is produced.
pub async fn execute_query<S>(
    store: &S,
    raw: &RawParams,
    config: &QueryConfig,
) -> Result<Paginated<S::Record>, S::Error>
where
    S: QueryExecutor,
{
    let parsed = parse_query(raw, config);
    let args = &parsed.find_many;

    let (data, total) = tokio::try_join!(store.find_many(args), store.count(&args.condition))?;

    Ok(Paginated {
        data,
        meta: compute_meta(total, parsed.pagination.page, parsed.pagination.limit),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::{OneOrMany, SortOrder};
    use serde_json::json;
    use std::sync::Mutex;

    /// In-memory store that records the arguments it was called with.
    struct RecordingStore {
        total: u64,
        fail_count: bool,
        seen: Mutex<Vec<FindManyArgs>>,
    }

    impl RecordingStore {
        fn new(total: u64) -> Self {
            Self {
                total,
                fail_count: false,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl QueryExecutor for RecordingStore {
        type Record = u64;
        type Error = String;

        async fn find_many(&self, args: &FindManyArgs) -> Result<Vec<u64>, String> {
            self.seen.lock().unwrap().push(args.clone());
            let end = (args.skip + args.take).min(self.total);
            Ok((args.skip.min(end)..end).collect())
        }

        async fn count(&self, _condition: &ConditionTree) -> Result<u64, String> {
            if self.fail_count {
                return Err("count failed".to_string());
            }
            Ok(self.total)
        }
    }

    #[test]
    fn test_end_to_end_parse() {
        let config = QueryConfig::default().with_search_fields(["name", "email"]);
        let raw = RawParams::from_pairs([
            ("page", "2"),
            ("limit", "5"),
            ("search", "john"),
            ("role", "USER"),
            ("sortBy", "name,createdAt"),
            ("sortOrder", "asc,desc"),
        ]);
        let parsed = parse_query(&raw, &config);

        assert_eq!(parsed.pagination.page, 2);
        assert_eq!(parsed.pagination.limit, 5);
        assert_eq!(parsed.pagination.skip, 5);
        assert_eq!(
            parsed.pagination.sort_by,
            OneOrMany::Many(vec!["name".to_string(), "createdAt".to_string()])
        );
        assert_eq!(
            parsed.pagination.sort_order,
            OneOrMany::Many(vec![SortOrder::Asc, SortOrder::Desc])
        );
        assert_eq!(
            parsed.condition.to_value(),
            json!({
                "OR": [
                    {"name": {"contains": "john", "mode": "insensitive"}},
                    {"email": {"contains": "john", "mode": "insensitive"}}
                ],
                "role": "USER"
            })
        );
        assert_eq!(
            serde_json::to_value(&parsed.order_by).unwrap(),
            json!([{"name": "asc"}, {"createdAt": "desc"}])
        );
    }

    #[test]
    fn test_descriptor_shape() {
        let raw = RawParams::from_pairs([("page", "3"), ("limit", "7"), ("status", "open")]);
        let parsed = parse_query(&raw, &QueryConfig::default());
        assert_eq!(
            serde_json::to_value(&parsed.find_many).unwrap(),
            json!({
                "where": {"status": "open"},
                "orderBy": {"createdAt": "desc"},
                "skip": 14,
                "take": 7
            })
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let config = QueryConfig::default()
            .with_search_fields(["name"])
            .with_range_fields(["price"]);
        let raw = RawParams::from_pairs([
            ("search", "x"),
            ("priceRange", "1,2"),
            ("name[contains]", "y"),
            ("sortBy", "name"),
        ]);
        let first = parse_query(&raw, &config);
        let second = parse_query(&raw, &config);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_execute_returns_page_and_meta() {
        let store = RecordingStore::new(23);
        let raw = RawParams::from_pairs([("page", "3"), ("limit", "10")]);
        let page = execute_query(&store, &raw, &QueryConfig::default()).await.unwrap();

        assert_eq!(page.data, vec![20, 21, 22]);
        assert_eq!(page.meta.total_items, 23);
        assert_eq!(page.meta.total_pages, 3);
        assert!(!page.meta.has_next_page);
        assert!(page.meta.has_previous_page);

        let seen = store.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].skip, 20);
        assert_eq!(seen[0].take, 10);
    }

    #[tokio::test]
    async fn test_execute_propagates_store_errors() {
        let mut store = RecordingStore::new(5);
        store.fail_count = true;
        let result = execute_query(&store, &RawParams::new(), &QueryConfig::default()).await;
        assert_eq!(result.unwrap_err(), "count failed");
    }

    #[test]
    fn test_response_with_range_header() {
        let page = Paginated {
            data: vec![1, 2, 3],
            meta: compute_meta(23, 3, 10),
        };
        let response = page.into_response_with_range("items");
        assert_eq!(
            response.headers().get(axum::http::header::CONTENT_RANGE).unwrap(),
            "items 20-22/23"
        );

        let empty: Paginated<u64> = Paginated {
            data: vec![],
            meta: compute_meta(0, 1, 10),
        };
        let response = empty.into_response_with_range("items");
        assert_eq!(
            response.headers().get(axum::http::header::CONTENT_RANGE).unwrap(),
            "items */0"
        );
    }

    #[test]
    fn test_paginated_envelope_shape() {
        let envelope = Paginated {
            data: vec!["a"],
            meta: compute_meta(1, 1, 10),
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["data"], json!(["a"]));
        assert_eq!(value["meta"]["totalItems"], 1);
    }
}
