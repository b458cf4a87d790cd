use serde::Deserialize;
use utoipa::IntoParams;

/// The standard list parameters, for OpenAPI documentation.
///
/// Parsing itself goes through [`RawParams`](crate::RawParams) so that
/// operator-bracket and pass-through parameters are kept; this struct only
/// describes the named parameters to `utoipa`.
///
/// # Filtering
/// - **Free text search:** `search=john` matches any configured search field
/// - **Operators:** `price[gte]=10`, `status[in]=active,pending`, `name[contains]=jo`
/// - **Ranges:** `priceRange=0,500`, `createdAtRange=2024-01-01,2024-12-31`
/// - **Other columns:** any other `field=value` pair is an equality filter
///
/// # Pagination
/// `page` (1-based) and `limit`, clamped to the configured maximum.
///
/// # Sorting
/// `sortBy=name,createdAt&sortOrder=asc,desc`; dotted paths sort on relations.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ListQueryParams {
    /// Page number (1-based).
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Items per page.
    #[param(example = 10)]
    pub limit: Option<u64>,
    /// Sort field or comma-separated fields.
    #[param(example = "name,createdAt")]
    pub sort_by: Option<String>,
    /// Sort direction or comma-separated directions (`asc` or `desc`).
    #[param(example = "asc,desc")]
    pub sort_order: Option<String>,
    /// Free-text search term.
    #[param(example = "john")]
    pub search: Option<String>,
    /// Lower bound for the configured date field.
    #[param(example = "2024-01-01")]
    pub date_from: Option<String>,
    /// Upper bound for the configured date field.
    #[param(example = "2024-12-31")]
    pub date_to: Option<String>,
    #[param(example = "active")]
    pub status: Option<String>,
    #[param(example = "USER")]
    pub role: Option<String>,
}
