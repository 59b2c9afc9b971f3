use crate::domain::query::{FilterState, FilterValue, ListQuery};
use crate::domain::table::{MultiValueStyle, TableConfig};

/// Minimal percent-escaping for query values. Brackets, commas and colons
/// stay literal: the backends document their multi-value and date formats in
/// those exact characters and reject encoded forms.
fn encode_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => out.push(byte as char),
            b'-' | b'_' | b'.' | b'~' | b',' | b'[' | b']' | b':' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn push_param(params: &mut Vec<String>, key: &str, value: &str) {
    params.push(format!("{key}={}", encode_value(value)));
}

/// Filter params in spec declaration order, so identical state always yields
/// an identical string. Unset values are omitted entirely.
fn filter_params(config: &TableConfig, filters: &FilterState, params: &mut Vec<String>) {
    for spec in &config.filters {
        let Some(value) = filters.get(spec.key) else {
            continue;
        };
        if value.is_unset(spec) {
            continue;
        }
        match value {
            FilterValue::Text(text) => push_param(params, spec.key, text.trim()),
            FilterValue::Single(Some(choice)) => push_param(params, spec.key, choice),
            FilterValue::Single(None) => {}
            FilterValue::Multi(values) => {
                let cleaned: Vec<&str> = values
                    .iter()
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .collect();
                if cleaned.is_empty() {
                    continue;
                }
                let joined = match config.endpoints.multi_style {
                    MultiValueStyle::CommaJoined => cleaned.join(","),
                    MultiValueStyle::Bracketed => format!("[{}]", cleaned.join(",")),
                };
                push_param(params, spec.key, &joined);
            }
            FilterValue::DateRange { start, end } => {
                let (mut lo, mut hi) = (*start, *end);
                if let (Some(a), Some(b)) = (lo, hi) {
                    if a > b {
                        (lo, hi) = (Some(b), Some(a));
                    }
                }
                let (start_key, end_key) = config.endpoints.date_params;
                if let Some(date) = lo {
                    push_param(params, start_key, &date.format("%Y-%m-%d").to_string());
                }
                if let Some(date) = hi {
                    push_param(params, end_key, &date.format("%Y-%m-%d").to_string());
                }
            }
        }
    }
}

fn sort_params(config: &TableConfig, query: &ListQuery, params: &mut Vec<String>) {
    if let Some(sort) = &query.page.sort {
        let server_column = config
            .column(&sort.field)
            .map(|spec| spec.server_sort_column())
            .unwrap_or(sort.field.as_str());
        push_param(params, "sort_by", server_column);
        push_param(params, "order", sort.direction.as_str());
    }
}

fn search_param(config: &TableConfig, query: &ListQuery, params: &mut Vec<String>) {
    let term = query.quick_search.trim();
    if !term.is_empty() {
        push_param(params, config.endpoints.quick_search_param, term);
    }
}

/// Query string for the list endpoint: pagination, sort, quick search, then
/// filters, all under the endpoint's own naming conventions.
pub fn list_query(config: &TableConfig, query: &ListQuery) -> String {
    let mut params = Vec::new();
    push_param(
        &mut params,
        config.endpoints.page_param.param(),
        &query.page.page.to_string(),
    );
    push_param(
        &mut params,
        "per_page",
        &query.page.per_page.as_u64().to_string(),
    );
    sort_params(config, query, &mut params);
    search_param(config, query, &mut params);
    filter_params(config, &query.filters, &mut params);
    params.join("&")
}

/// Query string for the export endpoint: same filters and sort, pagination
/// stripped, `export=1`, plus a hint listing the visible data columns in
/// display order. Pure-UI columns never reach the hint.
pub fn export_query(
    config: &TableConfig,
    query: &ListQuery,
    visible_columns: &[String],
) -> String {
    let mut params = Vec::new();
    sort_params(config, query, &mut params);
    search_param(config, query, &mut params);
    filter_params(config, &query.filters, &mut params);
    params.push("export=1".to_string());

    let hint: Vec<&str> = visible_columns
        .iter()
        .filter_map(|key| config.column(key))
        .filter(|spec| !spec.always_visible)
        .map(|spec| spec.key)
        .collect();
    if !hint.is_empty() {
        push_param(&mut params, "columns", &hint.join(","));
    }
    params.join("&")
}
