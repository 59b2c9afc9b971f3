use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
    /// Columns that can never be hidden (row actions, serial number).
    pub always_visible: bool,
    /// Server-side column name when it differs from the UI key.
    pub sort_key: Option<&'static str>,
}

impl ColumnSpec {
    pub fn new(key: &'static str, label: &'static str) -> Self {
        ColumnSpec {
            key,
            label,
            sortable: false,
            always_visible: false,
            sort_key: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn sorted_as(mut self, server_column: &'static str) -> Self {
        self.sortable = true;
        self.sort_key = Some(server_column);
        self
    }

    pub fn always_visible(mut self) -> Self {
        self.always_visible = true;
        self
    }

    pub fn server_sort_column(&self) -> &'static str {
        self.sort_key.unwrap_or(self.key)
    }
}

/// The set of hidden column keys for one page. `always_visible` columns can
/// never enter the set, whatever sequence of calls or persisted state says.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnVisibility {
    hidden: BTreeSet<String>,
}

impl ColumnVisibility {
    pub fn default_for(specs: &[ColumnSpec], default_hidden: &[&str]) -> Self {
        let mut visibility = ColumnVisibility::default();
        for key in default_hidden {
            visibility.hide(key, specs);
        }
        visibility
    }

    /// Rebuild from persisted keys, dropping anything unknown or protected.
    pub fn from_hidden_keys<I, S>(keys: I, specs: &[ColumnSpec]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut visibility = ColumnVisibility::default();
        for key in keys {
            visibility.hide(key.as_ref(), specs);
        }
        visibility
    }

    fn hide(&mut self, key: &str, specs: &[ColumnSpec]) {
        let hideable = specs
            .iter()
            .any(|spec| spec.key == key && !spec.always_visible);
        if hideable {
            self.hidden.insert(key.to_string());
        }
    }

    pub fn toggle(&mut self, key: &str, specs: &[ColumnSpec]) {
        if self.hidden.remove(key) {
            return;
        }
        self.hide(key, specs);
    }

    pub fn show_all(&mut self) {
        self.hidden.clear();
    }

    pub fn reset_to_default(&mut self, specs: &[ColumnSpec], default_hidden: &[&str]) {
        *self = ColumnVisibility::default_for(specs, default_hidden);
    }

    pub fn is_hidden(&self, key: &str) -> bool {
        self.hidden.contains(key)
    }

    pub fn visible_specs<'a>(&self, specs: &'a [ColumnSpec]) -> Vec<&'a ColumnSpec> {
        specs
            .iter()
            .filter(|spec| spec.always_visible || !self.hidden.contains(spec.key))
            .collect()
    }

    /// Stable ordering for persistence.
    pub fn hidden_keys(&self) -> Vec<String> {
        self.hidden.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("serial", "#").always_visible(),
            ColumnSpec::new("name", "Name").sortable(),
            ColumnSpec::new("email", "Email"),
            ColumnSpec::new("created_at", "Created").sorted_as("created_at_ts"),
            ColumnSpec::new("actions", "Actions").always_visible(),
        ]
    }

    #[test]
    fn always_visible_columns_never_enter_the_hidden_set() {
        let specs = specs();
        let mut visibility = ColumnVisibility::default();
        visibility.toggle("serial", &specs);
        visibility.toggle("actions", &specs);
        visibility.toggle("email", &specs);
        assert!(!visibility.is_hidden("serial"));
        assert!(!visibility.is_hidden("actions"));
        assert!(visibility.is_hidden("email"));

        visibility.show_all();
        visibility.reset_to_default(&specs, &["email", "actions"]);
        assert!(visibility.is_hidden("email"));
        assert!(!visibility.is_hidden("actions"));
    }

    #[test]
    fn persisted_keys_are_sanitized_on_load() {
        let specs = specs();
        let visibility =
            ColumnVisibility::from_hidden_keys(["email", "serial", "no_such_column"], &specs);
        assert_eq!(visibility.hidden_keys(), vec!["email".to_string()]);
    }

    #[test]
    fn toggle_flips_hidden_state() {
        let specs = specs();
        let mut visibility = ColumnVisibility::default();
        visibility.toggle("name", &specs);
        assert!(visibility.is_hidden("name"));
        visibility.toggle("name", &specs);
        assert!(!visibility.is_hidden("name"));
    }

    #[test]
    fn visible_specs_keeps_declaration_order() {
        let specs = specs();
        let mut visibility = ColumnVisibility::default();
        visibility.toggle("name", &specs);
        let visible: Vec<&str> = visibility
            .visible_specs(&specs)
            .iter()
            .map(|spec| spec.key)
            .collect();
        assert_eq!(visible, vec!["serial", "email", "created_at", "actions"]);
    }

    #[test]
    fn sort_key_falls_back_to_ui_key() {
        let specs = specs();
        assert_eq!(specs[1].server_sort_column(), "name");
        assert_eq!(specs[3].server_sort_column(), "created_at_ts");
    }
}
