use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::columns::ColumnSpec;
use crate::domain::query::{FilterSpec, OptionsSource};
use crate::domain::record::{coalesce, field, record_id, RecordRow};
use crate::domain::table::{DeleteStyle, EndpointConfig, TableConfig};

/// Submissions from the public info@ contact form. This endpoint deletes by
/// id in the request body and searches with `q`.
pub fn config() -> TableConfig {
    let mut endpoints = EndpointConfig::rest("/api/info-requests");
    endpoints.delete_style = DeleteStyle::BodyId;
    endpoints.quick_search_param = "q";

    TableConfig {
        entity: "info_requests",
        title: "Info Email Requests",
        endpoints,
        columns: vec![
            ColumnSpec::new("serial", "#").always_visible(),
            ColumnSpec::new("name", "Name").sortable(),
            ColumnSpec::new("email", "Email").sortable(),
            ColumnSpec::new("subject", "Subject"),
            ColumnSpec::new("message", "Message"),
            ColumnSpec::new("source", "Source"),
            ColumnSpec::new("created_at", "Received").sorted_as("created_at"),
            ColumnSpec::new("actions", "Actions").always_visible(),
        ],
        filters: vec![
            FilterSpec::single(
                "source",
                "Source",
                OptionsSource::Static(&["All", "Website", "Newsletter", "Partner"]),
            ),
            FilterSpec::date_range("created", "Received"),
        ],
        default_hidden: &["message"],
        export_columns: &["name", "email", "subject", "source", "created_at"],
        row_mapper: map_row,
        form_fields: &[
            ("name", "Name", true),
            ("email", "Email", true),
            ("subject", "Subject", false),
            ("message", "Message", false),
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
        coalesce(raw, &["name", "sender_name", "full_name"]),
    );
    fields.insert(
        "email".to_string(),
        coalesce(raw, &["email", "sender_email"]),
    );
    fields.insert("subject".to_string(), field(raw, "subject"));
    fields.insert(
        "message".to_string(),
        coalesce(raw, &["message", "body", "content"]),
    );
    fields.insert("source".to_string(), field(raw, "source"));
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
    fn sender_fields_coalesce() {
        let row = map_row(&json!({
            "id": 11,
            "sender_name": "Ira",
            "sender_email": "ira@example.com",
            "body": "Please send the brochure."
        }));
        assert_eq!(row.fields.get("name").unwrap(), "Ira");
        assert_eq!(row.fields.get("email").unwrap(), "ira@example.com");
        assert_eq!(row.fields.get("message").unwrap(), "Please send the brochure.");
    }
}
