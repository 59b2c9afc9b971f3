use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::columns::ColumnSpec;
use crate::domain::query::{FilterSpec, OptionsSource};
use crate::domain::record::{coalesce, field, record_id, RecordRow};
use crate::domain::table::{EndpointConfig, TableConfig, WriteMethod};

/// Ad-hoc follow-up tasks. Writes go through POST (the endpoint never
/// accepted PUT) and switch to multipart when an attachment is staged.
pub fn config() -> TableConfig {
    let mut endpoints = EndpointConfig::rest("/api/tasks");
    endpoints.update_method = WriteMethod::Post;

    TableConfig {
        entity: "tasks",
        title: "Tasks",
        endpoints,
        columns: vec![
            ColumnSpec::new("serial", "#").always_visible(),
            ColumnSpec::new("title", "Title").sortable(),
            ColumnSpec::new("assignee", "Assignee").sortable(),
            ColumnSpec::new("priority", "Priority").sortable(),
            ColumnSpec::new("status", "Status").sortable(),
            ColumnSpec::new("due_date", "Due").sorted_as("due_date"),
            ColumnSpec::new("created_at", "Created").sorted_as("created_at"),
            ColumnSpec::new("actions", "Actions").always_visible(),
        ],
        filters: vec![
            FilterSpec::single(
                "status",
                "Status",
                OptionsSource::Static(&["All", "Open", "In Progress", "Done"]),
            ),
            FilterSpec::single(
                "priority",
                "Priority",
                OptionsSource::Static(&["All", "Low", "Medium", "High"]),
            ),
            FilterSpec::date_range("due", "Due"),
        ],
        default_hidden: &["created_at"],
        export_columns: &["title", "assignee", "priority", "status", "due_date"],
        row_mapper: map_row,
        form_fields: &[
            ("title", "Title", true),
            ("assignee", "Assignee", false),
            ("priority", "Priority", false),
            ("status", "Status", false),
            ("due_date", "Due date", false),
            ("description", "Description", false),
            ("attachment", "Attachment", false),
        ],
        attachment_field: Some("attachment"),
        supports_validate: false,
        intake_form: false,
    }
}

fn map_row(raw: &Value) -> RecordRow {
    let mut fields = BTreeMap::new();
    fields.insert("title".to_string(), coalesce(raw, &["title", "name"]));
    fields.insert(
        "assignee".to_string(),
        coalesce(raw, &["assignee", "assigned_to", "owner"]),
    );
    fields.insert("priority".to_string(), field(raw, "priority"));
    fields.insert("status".to_string(), field(raw, "status"));
    fields.insert("due_date".to_string(), coalesce(raw, &["due_date", "due_at"]));
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
    fn title_and_due_date_coalesce() {
        let row = map_row(&json!({"id": 3, "name": "Call back Acme", "due_at": "2025-07-01"}));
        assert_eq!(row.fields.get("title").unwrap(), "Call back Acme");
        assert_eq!(row.fields.get("due_date").unwrap(), "2025-07-01");
    }
}
