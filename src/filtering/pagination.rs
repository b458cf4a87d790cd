use axum::http::header::{CONTENT_RANGE, HeaderMap, HeaderValue};
use serde::Serialize;
use utoipa::ToSchema;

use super::sort::{OneOrMany, SortOrder};
use super::values::{parse_int_prefix, split_list};
use crate::{config::QueryConfig, params::RawParams};

/// Resolved pagination and sort request.
///
/// `page >= 1`, `1 <= limit <= max_limit` and `skip == (page - 1) * limit`
/// hold for every value produced by [`resolve_pagination`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    pub page: u64,
    pub limit: u64,
    pub skip: u64,
    pub sort_by: OneOrMany<String>,
    pub sort_order: OneOrMany<SortOrder>,
}

/// Page bookkeeping returned alongside a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: u64,
    pub items_per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// Split a sort parameter on commas, or keep it whole when it has none.
fn split_sort_param(value: &str) -> Option<OneOrMany<String>> {
    if value.contains(',') {
        let parts: Vec<String> = split_list(value).map(str::to_string).collect();
        return (!parts.is_empty()).then_some(OneOrMany::Many(parts));
    }
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| OneOrMany::One(trimmed.to_string()))
}

fn resolve_sort_by(raw: &RawParams, config: &QueryConfig) -> OneOrMany<String> {
    let default = || OneOrMany::One(config.default_sort_by.clone());
    let Some(requested) = raw.first("sortBy").and_then(split_sort_param) else {
        return default();
    };

    if !config.allowed_sort_fields.is_empty() {
        // One disallowed field rejects the whole request
        let rejected = requested
            .to_vec()
            .into_iter()
            .find(|field| !config.allowed_sort_fields.contains(field));
        if let Some(field) = rejected {
            tracing::debug!(field = %field, "Sort field not allowed, using default sort");
            return default();
        }
    }
    requested
}

fn resolve_sort_order(raw: &RawParams, config: &QueryConfig) -> OneOrMany<SortOrder> {
    match raw.first("sortOrder").and_then(split_sort_param) {
        Some(OneOrMany::One(order)) => OneOrMany::One(SortOrder::parse(&order)),
        Some(OneOrMany::Many(orders)) => {
            OneOrMany::Many(orders.iter().map(|order| SortOrder::parse(order)).collect())
        }
        None => OneOrMany::One(config.default_sort_order),
    }
}

fn positive(value: i64) -> u64 {
    u64::try_from(value.max(1)).unwrap_or(1)
}

/// Resolve page, limit, offset and sort from raw parameters.
///
/// Never fails: missing or malformed values fall back to defaults, `page`
/// is at least 1, and `limit` is clamped to `[1, max_limit]`. A `limit` of
/// `0` means "not given" and uses `default_limit`.
#[must_use]
pub fn resolve_pagination(raw: &RawParams, config: &QueryConfig) -> PaginationParams {
    let max_limit = config.max_limit.max(1);

    let page = positive(raw.first("page").and_then(parse_int_prefix).unwrap_or(1));

    let limit = match raw.first("limit").and_then(parse_int_prefix) {
        Some(requested) if requested != 0 => positive(requested),
        _ => config.default_limit.max(1),
    }
    .min(max_limit);

    PaginationParams {
        page,
        limit,
        skip: (page - 1).saturating_mul(limit),
        sort_by: resolve_sort_by(raw, config),
        sort_order: resolve_sort_order(raw, config),
    }
}

/// Compute page metadata for a result set of `total` items.
#[must_use]
pub fn compute_meta(total: u64, page: u64, limit: u64) -> PaginationMeta {
    let limit = limit.max(1);
    let total_pages = total.div_ceil(limit);
    PaginationMeta {
        current_page: page,
        items_per_page: limit,
        total_items: total,
        total_pages,
        has_next_page: page < total_pages,
        has_previous_page: page > 1,
    }
}

/// Sanitize resource name by removing control characters for HTTP headers
fn sanitize_resource_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii() && !c.is_ascii_control()).collect()
}

/// Build a `Content-Range` header (`users 0-9/100`) for a resolved page.
///
/// An empty page renders as `users */0` style `*` range. Handlers returning
/// [`Paginated`](crate::Paginated) get the same header from
/// [`Paginated::into_response_with_range`](crate::Paginated::into_response_with_range).
#[must_use]
pub fn content_range(params: &PaginationParams, total: u64, resource_name: &str) -> HeaderMap {
    range_headers(params.skip, params.limit, total, resource_name)
}

pub(crate) fn range_headers(skip: u64, limit: u64, total: u64, resource_name: &str) -> HeaderMap {
    let safe_name = sanitize_resource_name(resource_name);
    let value = if total == 0 || skip >= total {
        format!("{safe_name} */{total}")
    } else {
        let last = skip
            .saturating_add(limit)
            .saturating_sub(1)
            .min(total - 1);
        format!("{safe_name} {skip}-{last}/{total}")
    };

    let mut headers = HeaderMap::new();
    if let Ok(header) = HeaderValue::from_str(&value) {
        headers.insert(CONTENT_RANGE, header);
    }
    headers
}
