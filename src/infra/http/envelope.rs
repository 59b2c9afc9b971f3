use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::list::{derive_last_page, ListResult};
use crate::domain::query::PageRequest;
use crate::domain::table::TableConfig;

/// Integer coercion tolerant of the backends' habit of returning counters as
/// strings.
fn as_u64_lenient(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn meta_u64(sources: &[&Value], keys: &[&str]) -> Option<u64> {
    for source in sources {
        for key in keys {
            if let Some(found) = source.get(key).and_then(as_u64_lenient) {
                return Some(found);
            }
        }
    }
    None
}

/// Option values from a facet array: plain strings, or objects carrying a
/// `name`/`value`/`url` member. Deduplicated, input order preserved.
fn facet_values(value: &Value) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    let mut seen = std::collections::BTreeSet::new();
    let mut values = Vec::new();
    for item in items {
        let text = match item {
            Value::String(text) => text.clone(),
            Value::Object(_) => ["name", "value", "url", "label"]
                .iter()
                .find_map(|key| item.get(key).and_then(Value::as_str))
                .unwrap_or_default()
                .to_string(),
            other => crate::domain::record::cell_text(other),
        };
        if !text.is_empty() && seen.insert(text.clone()) {
            values.push(text);
        }
    }
    values
}

fn extract_facets(config: &TableConfig, sources: &[&Value]) -> BTreeMap<String, Vec<String>> {
    let mut facets = BTreeMap::new();
    for (filter_key, response_key) in config.endpoints.facet_sources {
        for source in sources {
            let candidates = [
                source.get(response_key),
                source.get("facets").and_then(|f| f.get(response_key)),
            ];
            if let Some(found) = candidates.into_iter().flatten().next() {
                let values = facet_values(found);
                if !values.is_empty() {
                    facets.insert((*filter_key).to_string(), values);
                    break;
                }
            }
        }
    }
    facets
}

fn paginated(
    rows: Vec<Value>,
    requested: &PageRequest,
    meta_sources: &[&Value],
    facets: BTreeMap<String, Vec<String>>,
) -> ListResult {
    let per_page = meta_u64(meta_sources, &["per_page", "perPage"])
        .filter(|n| *n > 0)
        .unwrap_or_else(|| requested.per_page.as_u64());
    let total = meta_u64(meta_sources, &["total", "total_count"]).unwrap_or(rows.len() as u64);
    let last_page = meta_u64(meta_sources, &["last_page", "lastPage"])
        .unwrap_or_else(|| derive_last_page(total, per_page));
    let page = meta_u64(meta_sources, &["current_page", "page"]).unwrap_or(requested.page);
    ListResult {
        rows,
        page,
        per_page,
        total,
        last_page,
        facets,
    }
}

/// Finds the nested paginator for shape (c): `{data: {<subkey>: {data: […]}}}`.
/// The configured subkey wins; otherwise the first member that looks like a
/// paginator is taken.
fn nested_paginator<'a>(config: &TableConfig, data: &'a Value) -> Option<&'a Value> {
    let object = data.as_object()?;
    if let Some(key) = config.endpoints.nested_data_key {
        let inner = object.get(key)?;
        return inner.get("data")?.as_array().map(|_| inner);
    }
    object
        .values()
        .find(|inner| inner.get("data").map(|d| d.is_array()).unwrap_or(false))
}

/// Maps any of the known envelope shapes into a `ListResult`. Unknown shapes
/// degrade to an empty result with a diagnostic log; they never raise.
pub fn normalize(config: &TableConfig, requested: &PageRequest, body: &Value) -> ListResult {
    // Shape (a): a bare array is a complete, single-page result.
    if let Some(rows) = body.as_array() {
        let total = rows.len() as u64;
        return ListResult {
            rows: rows.clone(),
            page: 1,
            per_page: requested.per_page.as_u64(),
            total,
            last_page: 1,
            facets: BTreeMap::new(),
        };
    }

    if let Some(data) = body.get("data") {
        // Shape (b): `{data: [...], meta: {...}}`, counters sometimes at the
        // top level instead of under `meta`.
        if let Some(rows) = data.as_array() {
            let meta = body.get("meta").unwrap_or(&Value::Null);
            let sources = [meta, body];
            let facets = extract_facets(config, &[body, meta]);
            return paginated(rows.clone(), requested, &sources, facets);
        }

        // Shape (c): the paginator nested one level deeper.
        if let Some(inner) = nested_paginator(config, data) {
            if let Some(rows) = inner.get("data").and_then(Value::as_array) {
                let sources = [inner, data, body];
                let facets = extract_facets(config, &[inner, data, body]);
                return paginated(rows.clone(), requested, &sources, facets);
            }
        }
    }

    tracing::warn!(
        entity = config.entity,
        "unrecognized list envelope, treating as empty result"
    );
    let mut empty = ListResult::empty();
    empty.per_page = requested.per_page.as_u64();
    empty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::columns::ColumnSpec;
    use crate::domain::query::PerPage;
    use crate::domain::record::{record_id, RecordRow};
    use crate::domain::table::EndpointConfig;
    use serde_json::json;

    fn mapper(raw: &Value) -> RecordRow {
        RecordRow {
            id: record_id(raw),
            fields: Default::default(),
            raw: raw.clone(),
        }
    }

    fn config(nested_key: Option<&'static str>) -> TableConfig {
        let mut endpoints = EndpointConfig::rest("/api/widgets");
        endpoints.nested_data_key = nested_key;
        endpoints.facet_sources = &[("service", "services"), ("utm_source", "utm_sources")];
        TableConfig {
            entity: "widgets",
            title: "Widgets",
            endpoints,
            columns: vec![ColumnSpec::new("name", "Name")],
            filters: vec![],
            default_hidden: &[],
            export_columns: &["name"],
            row_mapper: mapper,
            form_fields: &[],
            attachment_field: None,
            supports_validate: false,
            intake_form: false,
        }
    }

    fn requested() -> PageRequest {
        PageRequest {
            page: 1,
            per_page: PerPage::TwentyFive,
            sort: None,
        }
    }

    #[test]
    fn data_meta_envelope_normalizes_exactly() {
        let body = json!({
            "data": [{"id": 1, "name": "Acme"}],
            "meta": {"current_page": 1, "per_page": 25, "total": 1, "last_page": 1}
        });
        let result = normalize(&config(None), &requested(), &body);
        assert_eq!(result.rows, vec![json!({"id": 1, "name": "Acme"})]);
        assert_eq!(result.page, 1);
        assert_eq!(result.per_page, 25);
        assert_eq!(result.total, 1);
        assert_eq!(result.last_page, 1);
    }

    #[test]
    fn bare_array_is_a_single_page() {
        let body = json!([{"id": 1}, {"id": 2}, {"id": 3}]);
        let result = normalize(&config(None), &requested(), &body);
        assert_eq!(result.rows.len(), 3);
        assert_eq!(result.total, 3);
        assert_eq!(result.page, 1);
        assert_eq!(result.last_page, 1);
    }

    #[test]
    fn nested_envelope_uses_the_configured_subkey() {
        let body = json!({
            "data": {
                "leads": {
                    "data": [{"id": 5}],
                    "total": "51",
                    "per_page": "25",
                    "current_page": 2
                }
            }
        });
        let result = normalize(&config(Some("leads")), &requested(), &body);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.total, 51, "string totals must coerce");
        assert_eq!(result.per_page, 25);
        assert_eq!(result.page, 2);
        assert_eq!(result.last_page, 3, "derived when the server omits it");
    }

    #[test]
    fn nested_envelope_finds_an_unconfigured_paginator() {
        let body = json!({
            "data": {"submissions": {"data": [{"id": 9}], "total": 1}}
        });
        let result = normalize(&config(None), &requested(), &body);
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.total, 1);
    }

    #[test]
    fn last_page_from_the_server_is_echoed_verbatim() {
        let body = json!({
            "data": [{"id": 1}],
            "meta": {"total": 100, "per_page": 25, "last_page": 7}
        });
        let result = normalize(&config(None), &requested(), &body);
        assert_eq!(result.last_page, 7);
    }

    #[test]
    fn unrecognized_shape_degrades_to_empty() {
        let body = json!({"ok": true, "payload": "nothing tabular"});
        let result = normalize(&config(None), &requested(), &body);
        assert!(result.rows.is_empty());
        assert_eq!(result.total, 0);
        assert_eq!(result.last_page, 1);
    }

    #[test]
    fn facets_are_extracted_and_deduplicated() {
        let body = json!({
            "data": [{"id": 1}],
            "meta": {"total": 1},
            "services": ["Roofing", "Solar", "Roofing"],
            "utm_sources": [{"name": "Google"}, {"name": "Facebook"}, {"name": "Google"}]
        });
        let result = normalize(&config(None), &requested(), &body);
        assert_eq!(
            result.facets.get("service"),
            Some(&vec!["Roofing".to_string(), "Solar".to_string()])
        );
        assert_eq!(
            result.facets.get("utm_source"),
            Some(&vec!["Google".to_string(), "Facebook".to_string()])
        );
    }

    #[test]
    fn zero_per_page_falls_back_to_the_request() {
        let body = json!({
            "data": [{"id": 1}],
            "meta": {"total": 10, "per_page": 0}
        });
        let result = normalize(&config(None), &requested(), &body);
        assert_eq!(result.per_page, 25);
        assert_eq!(result.last_page, 1);
    }
}
