use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::columns::ColumnSpec;
use crate::domain::query::{FilterSpec, OptionsSource};
use crate::domain::record::{coalesce, field, record_id, RecordRow};
use crate::domain::table::{EndpointConfig, MultiValueStyle, TableConfig};

/// Captcha-protected lead submissions. The busiest page: facet-driven
/// filters, a validate action for entries the captcha let through anyway,
/// and the bracketed multi-value convention.
pub fn config() -> TableConfig {
    let mut endpoints = EndpointConfig::rest("/api/leads");
    endpoints.validate_path = Some("/api/leads/validate");
    endpoints.multi_style = MultiValueStyle::Bracketed;
    endpoints.facet_sources = &[
        ("service", "services"),
        ("campaign_url", "campaign_urls"),
        ("utm_source", "utm_sources"),
    ];

    TableConfig {
        entity: "leads",
        title: "Captcha Leads",
        endpoints,
        columns: vec![
            ColumnSpec::new("serial", "#").always_visible(),
            ColumnSpec::new("name", "Name").sortable(),
            ColumnSpec::new("email", "Email").sortable(),
            ColumnSpec::new("phone", "Phone"),
            ColumnSpec::new("service", "Service"),
            ColumnSpec::new("campaign_url", "Campaign URL"),
            ColumnSpec::new("utm_source", "UTM Source"),
            ColumnSpec::new("status", "Status").sortable(),
            ColumnSpec::new("created_at", "Received").sorted_as("created_at"),
            ColumnSpec::new("actions", "Actions").always_visible(),
        ],
        filters: vec![
            FilterSpec::single(
                "status",
                "Status",
                OptionsSource::Static(&["All", "New", "Contacted", "Qualified", "Junk"]),
            ),
            FilterSpec::multi("service", "Service", OptionsSource::Facet("service")),
            FilterSpec::single(
                "campaign_url",
                "Campaign URL",
                OptionsSource::Facet("campaign_url"),
            ),
            FilterSpec::single("utm_source", "UTM Source", OptionsSource::Facet("utm_source")),
            FilterSpec::date_range("created", "Received"),
        ],
        default_hidden: &["utm_source", "campaign_url"],
        export_columns: &["name", "email", "phone", "service", "status", "created_at"],
        row_mapper: map_row,
        form_fields: &[
            ("name", "Name", true),
            ("email", "Email", true),
            ("phone", "Phone", false),
            ("service", "Service", false),
            ("status", "Status", false),
            ("notes", "Notes", false),
        ],
        attachment_field: None,
        supports_validate: true,
        intake_form: false,
    }
}

fn map_row(raw: &Value) -> RecordRow {
    let mut fields = BTreeMap::new();
    fields.insert(
        "name".to_string(),
        coalesce(raw, &["name", "full_name", "first_name"]),
    );
    fields.insert("email".to_string(), field(raw, "email"));
    fields.insert(
        "phone".to_string(),
        coalesce(raw, &["phone", "mobile", "phone_number"]),
    );
    fields.insert("service".to_string(), field(raw, "service"));
    fields.insert(
        "campaign_url".to_string(),
        coalesce(raw, &["campaign_url", "landing_page", "page_url"]),
    );
    fields.insert("utm_source".to_string(), field(raw, "utm_source"));
    fields.insert("status".to_string(), field(raw, "status"));
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
    fn phone_coalesces_over_legacy_spellings() {
        let row = map_row(&json!({
            "id": 4,
            "name": "Dana",
            "mobile": "555-0188",
            "created_at": "2025-05-01 09:30:00"
        }));
        assert_eq!(row.id.as_deref(), Some("4"));
        assert_eq!(row.fields.get("phone").unwrap(), "555-0188");
        assert_eq!(row.fields.get("created_at").unwrap(), "2025-05-01 09:30:00");
    }
}
