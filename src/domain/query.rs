use std::collections::BTreeMap;

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort request keyed by the UI column key. The server-side column name is
/// resolved against the column specs when the query string is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

/// Allowed page sizes. Anything else coming back from persisted preferences
/// is discarded in favour of the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerPage {
    TwentyFive,
    Fifty,
    Hundred,
}

impl PerPage {
    pub const ALL: [PerPage; 3] = [PerPage::TwentyFive, PerPage::Fifty, PerPage::Hundred];

    pub fn as_u64(self) -> u64 {
        match self {
            PerPage::TwentyFive => 25,
            PerPage::Fifty => 50,
            PerPage::Hundred => 100,
        }
    }

    pub fn from_u64(value: u64) -> Option<Self> {
        match value {
            25 => Some(PerPage::TwentyFive),
            50 => Some(PerPage::Fifty),
            100 => Some(PerPage::Hundred),
            _ => None,
        }
    }
}

impl Default for PerPage {
    fn default() -> Self {
        PerPage::TwentyFive
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: PerPage,
    pub sort: Option<SortSpec>,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 1,
            per_page: PerPage::default(),
            sort: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    SingleSelect,
    MultiSelect,
    DateRange,
}

/// Where a select filter gets its options from: a fixed list, or a facet
/// extracted from the list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsSource {
    None,
    Static(&'static [&'static str]),
    Facet(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FilterKind,
    pub options: OptionsSource,
    /// Select value that means "no filter" and is omitted from queries.
    pub all_sentinel: Option<&'static str>,
}

impl FilterSpec {
    pub fn text(key: &'static str, label: &'static str) -> Self {
        FilterSpec {
            key,
            label,
            kind: FilterKind::Text,
            options: OptionsSource::None,
            all_sentinel: None,
        }
    }

    pub fn single(key: &'static str, label: &'static str, options: OptionsSource) -> Self {
        FilterSpec {
            key,
            label,
            kind: FilterKind::SingleSelect,
            options,
            all_sentinel: Some("All"),
        }
    }

    pub fn multi(key: &'static str, label: &'static str, options: OptionsSource) -> Self {
        FilterSpec {
            key,
            label,
            kind: FilterKind::MultiSelect,
            options,
            all_sentinel: None,
        }
    }

    pub fn date_range(key: &'static str, label: &'static str) -> Self {
        FilterSpec {
            key,
            label,
            kind: FilterKind::DateRange,
            options: OptionsSource::None,
            all_sentinel: None,
        }
    }

    pub fn default_value(&self) -> FilterValue {
        match self.kind {
            FilterKind::Text => FilterValue::Text(String::new()),
            FilterKind::SingleSelect => FilterValue::Single(None),
            FilterKind::MultiSelect => FilterValue::Multi(Vec::new()),
            FilterKind::DateRange => FilterValue::DateRange {
                start: None,
                end: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Single(Option<String>),
    Multi(Vec<String>),
    DateRange {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl FilterValue {
    pub fn is_unset(&self, spec: &FilterSpec) -> bool {
        match self {
            FilterValue::Text(text) => text.trim().is_empty(),
            FilterValue::Single(value) => match value {
                None => true,
                Some(value) => {
                    value.trim().is_empty() || spec.all_sentinel == Some(value.as_str())
                }
            },
            FilterValue::Multi(values) => values.iter().all(|v| v.trim().is_empty()),
            FilterValue::DateRange { start, end } => start.is_none() && end.is_none(),
        }
    }
}

/// One full set of filter values, keyed by `FilterSpec::key`. Two copies of
/// this live in a table session: the pending draft bound to the drawer
/// controls and the applied set that drives fetches.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    values: BTreeMap<String, FilterValue>,
}

impl FilterState {
    pub fn defaults_for(specs: &[FilterSpec]) -> Self {
        let values = specs
            .iter()
            .map(|spec| (spec.key.to_string(), spec.default_value()))
            .collect();
        FilterState { values }
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: &str, value: FilterValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn is_default(&self, specs: &[FilterSpec]) -> bool {
        specs.iter().all(|spec| {
            self.values
                .get(spec.key)
                .map(|value| value.is_unset(spec))
                .unwrap_or(true)
        })
    }
}

/// Everything the list endpoint needs for one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filters: FilterState,
    pub page: PageRequest,
    pub quick_search: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_spec() -> FilterSpec {
        FilterSpec::single("status", "Status", OptionsSource::Static(&["All", "New", "Won"]))
    }

    #[test]
    fn all_sentinel_counts_as_unset() {
        let spec = status_spec();
        assert!(FilterValue::Single(Some("All".to_string())).is_unset(&spec));
        assert!(FilterValue::Single(None).is_unset(&spec));
        assert!(!FilterValue::Single(Some("New".to_string())).is_unset(&spec));
    }

    #[test]
    fn defaults_are_unset_for_every_kind() {
        let specs = vec![
            FilterSpec::text("q", "Search"),
            status_spec(),
            FilterSpec::multi("service", "Service", OptionsSource::Facet("services")),
            FilterSpec::date_range("created", "Created"),
        ];
        let state = FilterState::defaults_for(&specs);
        assert!(state.is_default(&specs));
    }

    #[test]
    fn per_page_round_trips_only_known_values() {
        assert_eq!(PerPage::from_u64(50), Some(PerPage::Fifty));
        assert_eq!(PerPage::from_u64(37), None);
        for pp in PerPage::ALL {
            assert_eq!(PerPage::from_u64(pp.as_u64()), Some(pp));
        }
    }

    #[test]
    fn sort_direction_toggles() {
        assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.toggled(), SortDirection::Asc);
    }
}
