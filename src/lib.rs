//! # querycrate
//!
//! Turn HTTP query-string parameters into pagination, filter and sort
//! directives for a data-access layer.
//!
//! ```rust
//! use querycrate::{parse_query, QueryConfig, RawParams};
//! use serde_json::json;
//!
//! let config = QueryConfig::default()
//!     .with_search_fields(["name", "email"])
//!     .with_range_fields(["price"]);
//!
//! let raw = RawParams::from_pairs([
//!     ("page", "2"),
//!     ("priceRange", "10,50"),
//!     ("category[in]", "books,music"),
//!     ("sortBy", "author.name"),
//!     ("sortOrder", "asc"),
//! ]);
//! let parsed = parse_query(&raw, &config);
//!
//! assert_eq!(parsed.find_many.skip, 10);
//! assert_eq!(
//!     parsed.condition.to_value(),
//!     json!({
//!         "category": {"in": ["books", "music"]},
//!         "price": {"gte": 10, "lte": 50}
//!     })
//! );
//! assert_eq!(
//!     serde_json::to_value(&parsed.order_by).unwrap(),
//!     json!({"author": {"name": "asc"}})
//! );
//! ```
//!
//! With a store, [`execute_query`] fetches the page and the total count
//! concurrently and returns a [`Paginated`] envelope. [`SeaOrmStore`] runs
//! queries against any Sea-ORM entity.

pub mod config;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod params;
pub mod query;
pub mod store;

pub use config::{CustomFilterHook, QueryConfig};
pub use errors::ApiError;
pub use filtering::{
    ConditionTree, FilterOptions, OneOrMany, OrderTree, PaginationMeta, PaginationParams,
    RangeFilter, SortOrder, build_order, compute_meta, extract_filters, merge_conditions,
    parse_operator_filters, resolve_pagination,
};
pub use models::ListQueryParams;
pub use params::{ParamValue, RawParams};
pub use query::{FindManyArgs, Paginated, ParsedQuery, QueryExecutor, execute_query, parse_query};
pub use store::SeaOrmStore;
