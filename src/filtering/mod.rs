//! # Query Parameter Filtering, Sorting & Pagination
//!
//! This module turns a flat map of query-string parameters into structured
//! data a data-access layer can consume directly. Nothing here performs I/O.
//!
//! ## Main Components
//!
//! - **[`resolve_pagination`]**: page, limit, offset and sort request
//! - **[`extract_filters`]**: search term, date bounds, ranges and pass-through fields
//! - **[`parse_operator_filters`]**: `field[operator]=value` conditions
//! - **[`merge_conditions`]**: the final `where` tree
//! - **[`build_order`]**: the final `orderBy` tree
//!
//! ## Query Parameter Examples
//!
//! ### Pagination & Sorting
//! ```rust,ignore
//! GET /users?page=2&limit=25
//! GET /users?sortBy=name&sortOrder=asc
//!
//! // Multi-field sort, directions matched by position
//! GET /users?sortBy=lastName,firstName&sortOrder=asc,desc
//!
//! // Sort on a related entity's field
//! GET /posts?sortBy=author.name&sortOrder=asc
//! ```
//!
//! ### Filtering
//! ```rust,ignore
//! // Free-text search across the configured search fields
//! GET /users?search=john
//!
//! // Explicit operators
//! GET /products?price[gte]=10&price[lt]=100
//! GET /users?status[in]=active,pending&email[endsWith]=@example.com
//!
//! // Range parameters (numbers or dates, min and max of the same kind)
//! GET /products?priceRange=0,500
//! GET /orders?createdAtRange=2024-01-01,2024-12-31
//!
//! // Date bounds on the configured date range field
//! GET /orders?dateFrom=2024-01-01&dateTo=2024-03-31
//!
//! // Any other parameter is an equality filter
//! GET /products?category=books
//! ```
//!
//! ## Precedence
//!
//! When several parameter styles target the same field, later rules win:
//! operator syntax, then date bounds (merged), then ranges, then
//! `status`/`role`, then pass-through parameters, then the custom filter
//! hook. Malformed input never produces an error; it is dropped or replaced
//! by a default.

pub mod conditions;
pub mod extract;
pub mod operators;
pub mod pagination;
pub mod sort;
pub mod values;

// Re-export commonly used items
pub use conditions::{ConditionTree, apply_typed_filters, merge_conditions};
pub use extract::{FilterOptions, PassThrough, RangeFilter, extract_filters};
pub use operators::{FilterOperator, parse_operator_filters};
pub use pagination::{PaginationMeta, PaginationParams, compute_meta, content_range, resolve_pagination};
pub use sort::{OneOrMany, OrderTree, SortOrder, build_order};
