use std::collections::BTreeMap;
use std::path::PathBuf;

use dioxus::prelude::{use_signal, Signal};
use serde_json::Value;

use crate::domain::columns::ColumnVisibility;
use crate::domain::record::{cell_text, record_id};
use crate::domain::table::TableConfig;
use crate::usecase::ports::api::{FileAttachment, WritePayload};
use crate::usecase::services::table_session::TableSession;

/// Draft state for the create/edit modal and the intake form. Field errors
/// arrive from the server keyed by input name and stay attached until the
/// next submit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditForm {
    pub id: Option<String>,
    pub values: BTreeMap<String, String>,
    pub errors: BTreeMap<String, Vec<String>>,
    pub message: Option<String>,
    pub submitting: bool,
    pub attachment: Option<PathBuf>,
}

impl EditForm {
    pub fn empty(config: &TableConfig) -> Self {
        let values = config
            .form_fields
            .iter()
            .map(|(key, _, _)| (key.to_string(), String::new()))
            .collect();
        EditForm {
            values,
            ..EditForm::default()
        }
    }

    pub fn from_record(config: &TableConfig, record: &Value) -> Self {
        let values = config
            .form_fields
            .iter()
            .map(|(key, _, _)| {
                let text = record.get(*key).map(cell_text).unwrap_or_default();
                (key.to_string(), text)
            })
            .collect();
        EditForm {
            id: record_id(record),
            values,
            ..EditForm::default()
        }
    }

    pub fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    /// Client-side required-field check; anything deeper is the server's.
    pub fn required_errors(&self, config: &TableConfig) -> BTreeMap<String, Vec<String>> {
        let mut errors = BTreeMap::new();
        for (key, label, required) in config.form_fields {
            if !required {
                continue;
            }
            let empty = self
                .values
                .get(*key)
                .map(|v| v.trim().is_empty())
                .unwrap_or(true);
            if empty {
                errors.insert(key.to_string(), vec![format!("{label} is required")]);
            }
        }
        errors
    }

    /// JSON unless an attachment is staged, multipart otherwise.
    pub fn payload(&self, config: &TableConfig) -> WritePayload {
        let attachment_field = config.attachment_field.unwrap_or("");
        match (&self.attachment, config.attachment_field) {
            (Some(path), Some(field)) => {
                let fields = self
                    .values
                    .iter()
                    .filter(|(key, _)| key.as_str() != attachment_field)
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                WritePayload::Multipart {
                    fields,
                    file: Some(FileAttachment {
                        field: field.to_string(),
                        path: path.clone(),
                    }),
                }
            }
            _ => {
                let mut body = serde_json::Map::new();
                for (key, value) in &self.values {
                    if key.as_str() == attachment_field {
                        continue;
                    }
                    body.insert(key.clone(), Value::String(value.clone()));
                }
                WritePayload::Json(Value::Object(body))
            }
        }
    }
}

/// Signals backing one mounted record page.
pub struct PageState {
    pub session: Signal<TableSession>,
    pub visibility: Signal<ColumnVisibility>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
    pub columns_menu_open: Signal<bool>,
    pub detail: Signal<Option<Value>>,
    pub edit: Signal<Option<EditForm>>,
    pub intake: Signal<EditForm>,
}

impl PageState {
    pub fn new(config: &TableConfig) -> Self {
        let session = TableSession::new(config);
        let visibility = ColumnVisibility::default_for(&config.columns, config.default_hidden);
        let intake = EditForm::empty(config);
        PageState {
            session: use_signal(move || session),
            visibility: use_signal(move || visibility),
            busy: use_signal(|| false),
            status: use_signal(|| "Ready".to_string()),
            columns_menu_open: use_signal(|| false),
            detail: use_signal(|| None::<Value>),
            edit: use_signal(|| None::<EditForm>),
            intake: use_signal(move || intake),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities;
    use serde_json::json;

    #[test]
    fn required_errors_flag_only_missing_required_fields() {
        let config = entities::telemarketing::config();
        let mut form = EditForm::empty(&config);
        form.set("name", "Noor".to_string());
        let errors = form.required_errors(&config);
        assert!(errors.contains_key("phone"));
        assert!(!errors.contains_key("name"));
        assert!(!errors.contains_key("city"));
    }

    #[test]
    fn from_record_seeds_known_fields_and_id() {
        let config = entities::leads::config();
        let form = EditForm::from_record(
            &config,
            &json!({"id": 8, "name": "Ada", "email": "ada@example.com", "ignored": "x"}),
        );
        assert_eq!(form.id.as_deref(), Some("8"));
        assert_eq!(form.values.get("name").unwrap(), "Ada");
        assert_eq!(form.values.get("email").unwrap(), "ada@example.com");
        assert!(form.values.contains_key("notes"));
    }

    #[test]
    fn payload_switches_to_multipart_when_a_file_is_staged() {
        let config = entities::tasks::config();
        let mut form = EditForm::empty(&config);
        form.set("title", "Send brochure".to_string());
        match form.payload(&config) {
            WritePayload::Json(body) => {
                assert_eq!(body.get("title").unwrap(), "Send brochure");
                assert!(body.get("attachment").is_none());
            }
            WritePayload::Multipart { .. } => panic!("no file staged, expected json"),
        }

        form.attachment = Some(PathBuf::from("/tmp/brochure.pdf"));
        match form.payload(&config) {
            WritePayload::Multipart { fields, file } => {
                assert!(fields.iter().any(|(k, v)| k == "title" && v == "Send brochure"));
                assert!(!fields.iter().any(|(k, _)| k == "attachment"));
                let file = file.expect("file part expected");
                assert_eq!(file.field, "attachment");
            }
            WritePayload::Json(_) => panic!("file staged, expected multipart"),
        }
    }
}
