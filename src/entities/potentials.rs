use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::columns::ColumnSpec;
use crate::domain::query::{FilterSpec, OptionsSource};
use crate::domain::record::{coalesce, field, record_id, RecordRow};
use crate::domain::table::{EndpointConfig, TableConfig};

/// Sales potentials. UI keys and database columns drifted apart over the
/// years, so most sortable columns carry an explicit server name.
pub fn config() -> TableConfig {
    let mut endpoints = EndpointConfig::rest("/api/potentials");
    endpoints.facet_sources = &[("owner", "owners")];

    TableConfig {
        entity: "potentials",
        title: "Potentials",
        endpoints,
        columns: vec![
            ColumnSpec::new("serial", "#").always_visible(),
            ColumnSpec::new("name", "Contact").sorted_as("contact_name"),
            ColumnSpec::new("company", "Company").sortable(),
            ColumnSpec::new("email", "Email"),
            ColumnSpec::new("amount", "Amount").sorted_as("estimated_value"),
            ColumnSpec::new("stage", "Stage").sorted_as("pipeline_stage"),
            ColumnSpec::new("owner", "Owner"),
            ColumnSpec::new("created_at", "Created").sorted_as("created_at"),
            ColumnSpec::new("actions", "Actions").always_visible(),
        ],
        filters: vec![
            FilterSpec::single(
                "stage",
                "Stage",
                OptionsSource::Static(&[
                    "All",
                    "Prospecting",
                    "Proposal",
                    "Negotiation",
                    "Closed Won",
                    "Closed Lost",
                ]),
            ),
            FilterSpec::single("owner", "Owner", OptionsSource::Facet("owner")),
            FilterSpec::date_range("created", "Created"),
        ],
        default_hidden: &["email"],
        export_columns: &["name", "company", "amount", "stage", "owner", "created_at"],
        row_mapper: map_row,
        form_fields: &[
            ("name", "Contact", true),
            ("company", "Company", false),
            ("email", "Email", false),
            ("amount", "Amount", false),
            ("stage", "Stage", false),
            ("owner", "Owner", false),
        ],
        attachment_field: None,
        supports_validate: false,
        intake_form: false,
    }
}

fn map_row(raw: &Value) -> RecordRow {
    let mut fields = BTreeMap::new();
    fields.insert(
        "name".to_string(),
        coalesce(raw, &["name", "contact_name", "contact"]),
    );
    fields.insert("company".to_string(), coalesce(raw, &["company", "account"]));
    fields.insert("email".to_string(), field(raw, "email"));
    fields.insert(
        "amount".to_string(),
        coalesce(raw, &["amount", "estimated_value", "value"]),
    );
    fields.insert(
        "stage".to_string(),
        coalesce(raw, &["stage", "pipeline_stage"]),
    );
    fields.insert("owner".to_string(), coalesce(raw, &["owner", "owner_name"]));
    fields.insert("created_at".to_string(), field(raw, "created_at"));
    RecordRow {
        id: record_id(raw),
        fields,
        raw: raw.clone(),
    }
}
