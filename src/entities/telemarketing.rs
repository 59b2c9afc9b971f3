use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::columns::ColumnSpec;
use crate::domain::query::{FilterSpec, OptionsSource};
use crate::domain::record::{coalesce, field, record_id, RecordRow};
use crate::domain::table::{EndpointConfig, TableConfig};

/// Outbound telemarketing intake. Operators capture calls through the form
/// at the top of the page; the table below lists what the team has logged.
pub fn config() -> TableConfig {
    let mut endpoints = EndpointConfig::rest("/api/telemarketing");
    endpoints.quick_search_param = "q";
    endpoints.facet_sources = &[("campaign", "campaigns")];

    TableConfig {
        entity: "telemarketing",
        title: "Telemarketing Intake",
        endpoints,
        columns: vec![
            ColumnSpec::new("serial", "#").always_visible(),
            ColumnSpec::new("name", "Name").sortable(),
            ColumnSpec::new("phone", "Phone"),
            ColumnSpec::new("city", "City"),
            ColumnSpec::new("campaign", "Campaign"),
            ColumnSpec::new("outcome", "Outcome").sortable(),
            ColumnSpec::new("called_at", "Called").sorted_as("called_at"),
            ColumnSpec::new("actions", "Actions").always_visible(),
        ],
        filters: vec![
            FilterSpec::single(
                "outcome",
                "Outcome",
                OptionsSource::Static(&["All", "Interested", "Callback", "No Answer", "Refused"]),
            ),
            FilterSpec::single("campaign", "Campaign", OptionsSource::Facet("campaign")),
            FilterSpec::date_range("called", "Called"),
        ],
        default_hidden: &["city"],
        export_columns: &["name", "phone", "campaign", "outcome", "called_at"],
        row_mapper: map_row,
        form_fields: &[
            ("name", "Name", true),
            ("phone", "Phone", true),
            ("city", "City", false),
            ("campaign", "Campaign", false),
            ("outcome", "Outcome", false),
            ("notes", "Notes", false),
        ],
        attachment_field: None,
        supports_validate: false,
        intake_form: true,
    }
}

fn map_row(raw: &Value) -> RecordRow {
    let mut fields = BTreeMap::new();
    fields.insert("name".to_string(), coalesce(raw, &["name", "full_name"]));
    fields.insert(
        "phone".to_string(),
        coalesce(raw, &["phone", "phone_number", "mobile"]),
    );
    fields.insert("city".to_string(), field(raw, "city"));
    fields.insert("campaign".to_string(), coalesce(raw, &["campaign", "campaign_name"]));
    fields.insert("outcome".to_string(), coalesce(raw, &["outcome", "disposition"]));
    fields.insert(
        "called_at".to_string(),
        coalesce(raw, &["called_at", "created_at"]),
    );
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
    fn outcome_and_call_time_coalesce() {
        let row = map_row(&json!({
            "id": 2,
            "name": "Noor",
            "disposition": "Callback",
            "created_at": "2025-06-10 14:00:00"
        }));
        assert_eq!(row.fields.get("outcome").unwrap(), "Callback");
        assert_eq!(row.fields.get("called_at").unwrap(), "2025-06-10 14:00:00");
    }

    #[test]
    fn page_leads_with_the_intake_form() {
        assert!(config().intake_form);
    }
}
