use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::columns::ColumnSpec;
use crate::domain::query::{FilterSpec, OptionsSource};
use crate::domain::record::{coalesce, field, record_id, RecordRow};
use crate::domain::table::{EndpointConfig, MultiValueStyle, PageParamStyle, TableConfig};

/// Leads attributed through tracking parameters. The endpoint predates the
/// others: it pages with `current_page` and nests its paginator under
/// `data.leads`.
pub fn config() -> TableConfig {
    let mut endpoints = EndpointConfig::rest("/api/tracked-leads");
    endpoints.page_param = PageParamStyle::CurrentPage;
    endpoints.multi_style = MultiValueStyle::Bracketed;
    endpoints.nested_data_key = Some("leads");
    endpoints.facet_sources = &[
        ("utm_source", "utm_sources"),
        ("utm_medium", "utm_mediums"),
        ("utm_campaign", "utm_campaigns"),
    ];

    TableConfig {
        entity: "tracked_leads",
        title: "Tracked Leads",
        endpoints,
        columns: vec![
            ColumnSpec::new("serial", "#").always_visible(),
            ColumnSpec::new("name", "Name").sortable(),
            ColumnSpec::new("email", "Email").sortable(),
            ColumnSpec::new("phone", "Phone"),
            ColumnSpec::new("utm_source", "UTM Source").sortable(),
            ColumnSpec::new("utm_medium", "UTM Medium"),
            ColumnSpec::new("utm_campaign", "UTM Campaign"),
            ColumnSpec::new("referrer", "Referrer"),
            ColumnSpec::new("created_at", "Captured").sorted_as("created_at"),
            ColumnSpec::new("actions", "Actions").always_visible(),
        ],
        filters: vec![
            FilterSpec::single("utm_source", "UTM Source", OptionsSource::Facet("utm_source")),
            FilterSpec::single("utm_medium", "UTM Medium", OptionsSource::Facet("utm_medium")),
            FilterSpec::multi(
                "utm_campaign",
                "UTM Campaign",
                OptionsSource::Facet("utm_campaign"),
            ),
            FilterSpec::date_range("created", "Captured"),
        ],
        default_hidden: &["utm_medium", "referrer"],
        export_columns: &[
            "name",
            "email",
            "phone",
            "utm_source",
            "utm_campaign",
            "created_at",
        ],
        row_mapper: map_row,
        form_fields: &[
            ("name", "Name", true),
            ("email", "Email", false),
            ("phone", "Phone", false),
            ("utm_source", "UTM Source", false),
            ("utm_campaign", "UTM Campaign", false),
        ],
        attachment_field: None,
        supports_validate: false,
        intake_form: false,
    }
}

fn map_row(raw: &Value) -> RecordRow {
    let mut fields = BTreeMap::new();
    fields.insert("name".to_string(), coalesce(raw, &["name", "full_name"]));
    fields.insert("email".to_string(), field(raw, "email"));
    fields.insert("phone".to_string(), coalesce(raw, &["phone", "mobile"]));
    fields.insert("utm_source".to_string(), field(raw, "utm_source"));
    fields.insert("utm_medium".to_string(), field(raw, "utm_medium"));
    fields.insert("utm_campaign".to_string(), field(raw, "utm_campaign"));
    fields.insert(
        "referrer".to_string(),
        coalesce(raw, &["referrer", "referrer_url", "http_referer"]),
    );
    fields.insert("created_at".to_string(), field(raw, "created_at"));
    RecordRow {
        id: record_id(raw),
        fields,
        raw: raw.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn referrer_coalesces_over_header_spellings() {
        let row = map_row(&json!({"id": 7, "http_referer": "https://ads.example"}));
        assert_eq!(row.fields.get("referrer").unwrap(), "https://ads.example");
    }

    #[test]
    fn endpoint_keeps_its_legacy_paging_convention() {
        let config = config();
        assert_eq!(config.endpoints.page_param, PageParamStyle::CurrentPage);
        assert_eq!(config.endpoints.nested_data_key, Some("leads"));
    }
}
