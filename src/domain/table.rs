use crate::domain::columns::ColumnSpec;
use crate::domain::query::FilterSpec;
use crate::domain::record::RowMapper;

/// How the endpoint names its page parameter. The backends are fixed
/// collaborators with diverging conventions, preserved here verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageParamStyle {
    Page,
    CurrentPage,
}

impl PageParamStyle {
    pub fn param(self) -> &'static str {
        match self {
            PageParamStyle::Page => "page",
            PageParamStyle::CurrentPage => "current_page",
        }
    }
}

/// Multi-value filter serialization per endpoint: `service=a,b` or
/// `service=[a,b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiValueStyle {
    CommaJoined,
    Bracketed,
}

/// Some delete endpoints take the id in the path, others in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStyle {
    PathId,
    BodyId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMethod {
    Post,
    Put,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub list_path: &'static str,
    pub detail_path: &'static str,
    pub create_path: &'static str,
    pub update_path: &'static str,
    pub update_method: WriteMethod,
    pub delete_path: &'static str,
    pub delete_style: DeleteStyle,
    pub validate_path: Option<&'static str>,
    pub page_param: PageParamStyle,
    pub multi_style: MultiValueStyle,
    /// Query param names for the date-range bounds.
    pub date_params: (&'static str, &'static str),
    pub quick_search_param: &'static str,
    /// Envelope subkey for endpoints that nest the paginator one level
    /// deeper, e.g. `{data: {leads: {data: [...]}}}`.
    pub nested_data_key: Option<&'static str>,
    /// (filter key, response key) pairs for facet extraction.
    pub facet_sources: &'static [(&'static str, &'static str)],
}

impl EndpointConfig {
    /// Uniform defaults; per-entity modules override the idiosyncrasies.
    pub fn rest(base: &'static str) -> Self {
        EndpointConfig {
            list_path: base,
            detail_path: base,
            create_path: base,
            update_path: base,
            update_method: WriteMethod::Put,
            delete_path: base,
            delete_style: DeleteStyle::PathId,
            validate_path: None,
            page_param: PageParamStyle::Page,
            multi_style: MultiValueStyle::CommaJoined,
            date_params: ("start_date", "end_date"),
            quick_search_param: "search",
            nested_data_key: None,
            facet_sources: &[],
        }
    }
}

/// Everything that distinguishes one record page from another. The table
/// machinery is generic over this; entities supply configuration, not code.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Stable key: preferences namespace and export filename stem.
    pub entity: &'static str,
    pub title: &'static str,
    pub endpoints: EndpointConfig,
    pub columns: Vec<ColumnSpec>,
    pub filters: Vec<FilterSpec>,
    pub default_hidden: &'static [&'static str],
    /// Fixed column subset used by the in-memory export fallback.
    pub export_columns: &'static [&'static str],
    pub row_mapper: RowMapper,
    /// Fields the edit/create modal offers, as (field key, label, required).
    pub form_fields: &'static [(&'static str, &'static str, bool)],
    /// Form field carrying a file attachment, if the endpoint accepts one.
    pub attachment_field: Option<&'static str>,
    pub supports_validate: bool,
    /// Pages that lead with a capture form rather than the table.
    pub intake_form: bool,
}

impl PartialEq for TableConfig {
    fn eq(&self, other: &Self) -> bool {
        self.entity == other.entity
    }
}

impl TableConfig {
    pub fn column(&self, key: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|spec| spec.key == key)
    }

    pub fn filter(&self, key: &str) -> Option<&FilterSpec> {
        self.filters.iter().find(|spec| spec.key == key)
    }
}
