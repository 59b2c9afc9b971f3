pub mod info_requests;
pub mod leads;
pub mod potentials;
pub mod tasks;
pub mod telemarketing;
pub mod tracked_leads;

use crate::domain::table::TableConfig;

/// Every page the dashboard offers, in navigation order.
pub fn all_configs() -> Vec<TableConfig> {
    vec![
        leads::config(),
        info_requests::config(),
        tracked_leads::config(),
        tasks::config(),
        potentials::config(),
        telemarketing::config(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_keys_are_unique() {
        let configs = all_configs();
        let mut keys: Vec<&str> = configs.iter().map(|c| c.entity).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), configs.len());
    }

    #[test]
    fn export_columns_exist_and_are_data_columns() {
        for config in all_configs() {
            for key in config.export_columns {
                let spec = config
                    .column(key)
                    .unwrap_or_else(|| panic!("{}: unknown export column {key}", config.entity));
                assert!(
                    !spec.always_visible,
                    "{}: export column {key} is a ui column",
                    config.entity
                );
            }
        }
    }

    #[test]
    fn default_hidden_never_names_protected_columns() {
        for config in all_configs() {
            for key in config.default_hidden {
                let spec = config
                    .column(key)
                    .unwrap_or_else(|| panic!("{}: unknown hidden column {key}", config.entity));
                assert!(
                    !spec.always_visible,
                    "{}: cannot hide {key} by default",
                    config.entity
                );
            }
        }
    }

    #[test]
    fn validate_flag_matches_endpoint_support() {
        for config in all_configs() {
            assert_eq!(
                config.supports_validate,
                config.endpoints.validate_path.is_some(),
                "{}",
                config.entity
            );
        }
    }

    #[test]
    fn form_fields_are_nonempty_for_editable_pages() {
        for config in all_configs() {
            assert!(
                !config.form_fields.is_empty(),
                "{}: edit modal needs fields",
                config.entity
            );
            if let Some(field) = config.attachment_field {
                assert!(
                    config.form_fields.iter().any(|(key, _, _)| *key == field),
                    "{}: attachment field {field} must be a form field",
                    config.entity
                );
            }
        }
    }

    #[test]
    fn mappers_tolerate_empty_records() {
        for config in all_configs() {
            let row = (config.row_mapper)(&json!({}));
            assert!(row.id.is_none());
        }
    }

    #[test]
    fn facet_sources_reference_declared_filters() {
        for config in all_configs() {
            for (filter_key, _) in config.endpoints.facet_sources {
                assert!(
                    config.filter(filter_key).is_some(),
                    "{}: facet for unknown filter {filter_key}",
                    config.entity
                );
            }
        }
    }
}
