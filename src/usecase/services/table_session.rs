use std::collections::BTreeMap;

use crate::domain::columns::ColumnSpec;
use crate::domain::list::ListResult;
use crate::domain::query::{
    FilterState, ListQuery, PageRequest, PerPage, SortDirection, SortSpec,
};
use crate::domain::record::{RecordRow, RowMapper};
use crate::domain::table::TableConfig;
use crate::usecase::ports::api::ApiError;

/// Ticket identifying one issued fetch. Responses are only applied when the
/// ticket still matches the latest issue, so a superseded request can neither
/// clobber newer rows nor strand the loading flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// State of one record table: draft and applied filters, pagination, sort,
/// rows and fetch bookkeeping. Pure data and transitions; the page component
/// owns a copy behind a signal and drives all I/O through the one refresh
/// path.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSession {
    pub pending: FilterState,
    pub applied: FilterState,
    pub quick_search: String,
    pub page: u64,
    pub per_page: PerPage,
    pub sort: Option<SortSpec>,
    pub rows: Vec<RecordRow>,
    pub total: u64,
    pub last_page: u64,
    pub facets: BTreeMap<String, Vec<String>>,
    pub loading: bool,
    pub error: Option<String>,
    pub drawer_open: bool,
    issued: u64,
}

impl TableSession {
    pub fn new(config: &TableConfig) -> Self {
        let defaults = FilterState::defaults_for(&config.filters);
        TableSession {
            pending: defaults.clone(),
            applied: defaults,
            quick_search: String::new(),
            page: 1,
            per_page: PerPage::default(),
            sort: None,
            rows: Vec::new(),
            total: 0,
            last_page: 1,
            facets: BTreeMap::new(),
            loading: false,
            error: None,
            drawer_open: false,
            issued: 0,
        }
    }

    // ----- filter drawer -------------------------------------------------

    /// Pending is re-seeded from Applied so a later cancel is a true no-op.
    pub fn open_drawer(&mut self) {
        self.pending = self.applied.clone();
        self.drawer_open = true;
    }

    /// Discards the draft. Never triggers a fetch.
    pub fn cancel_drawer(&mut self) {
        self.pending = self.applied.clone();
        self.drawer_open = false;
    }

    /// Commits the draft wholesale and rewinds to the first page.
    /// Returns true when the caller must refetch.
    #[must_use]
    pub fn apply_filters(&mut self) -> bool {
        self.applied = self.pending.clone();
        self.page = 1;
        self.drawer_open = false;
        true
    }

    /// Clears both copies back to defaults and rewinds to the first page.
    #[must_use]
    pub fn reset_filters(&mut self, config: &TableConfig) -> bool {
        let defaults = FilterState::defaults_for(&config.filters);
        self.pending = defaults.clone();
        self.applied = defaults;
        self.page = 1;
        self.drawer_open = false;
        true
    }

    pub fn set_pending(&mut self, key: &str, value: crate::domain::query::FilterValue) {
        self.pending.set(key, value);
    }

    /// Quick search bypasses the draft machinery and applies immediately.
    #[must_use]
    pub fn set_quick_search(&mut self, term: String) -> bool {
        if self.quick_search == term {
            return false;
        }
        self.quick_search = term;
        self.page = 1;
        true
    }

    // ----- pagination and sort -------------------------------------------

    /// Clamps to `[1, last_page]`; out-of-range requests never reach the
    /// server. Returns true when the page actually changed.
    #[must_use]
    pub fn set_page(&mut self, page: u64) -> bool {
        let clamped = page.clamp(1, self.last_page.max(1));
        if clamped == self.page {
            return false;
        }
        self.page = clamped;
        true
    }

    #[must_use]
    pub fn set_per_page(&mut self, per_page: PerPage) -> bool {
        if self.per_page == per_page {
            return false;
        }
        self.per_page = per_page;
        self.page = 1;
        true
    }

    /// Same column toggles direction, a new column starts ascending; either
    /// way the view rewinds to the first page. Non-sortable columns are
    /// ignored.
    #[must_use]
    pub fn toggle_sort(&mut self, column: &ColumnSpec) -> bool {
        if !column.sortable {
            return false;
        }
        let direction = match &self.sort {
            Some(sort) if sort.field == column.key => sort.direction.toggled(),
            _ => SortDirection::Asc,
        };
        self.sort = Some(SortSpec {
            field: column.key.to_string(),
            direction,
        });
        self.page = 1;
        true
    }

    // ----- fetch bookkeeping ---------------------------------------------

    pub fn query(&self) -> ListQuery {
        ListQuery {
            filters: self.applied.clone(),
            page: PageRequest {
                page: self.page,
                per_page: self.per_page,
                sort: self.sort.clone(),
            },
            quick_search: self.quick_search.clone(),
        }
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.loading = true;
        FetchTicket(self.issued)
    }

    /// Applies a fetch outcome. Stale tickets are dropped on the floor and
    /// the method reports whether the result was taken. Rows survive a
    /// superseded response; only a current hard error clears them.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<ListResult, ApiError>,
        mapper: RowMapper,
    ) -> bool {
        if ticket.0 != self.issued {
            return false;
        }
        self.loading = false;
        match outcome {
            Ok(result) => {
                self.rows = result.rows.iter().map(mapper).collect();
                self.total = result.total;
                self.last_page = result.last_page.max(1);
                if result.page >= 1 {
                    self.page = result.page.min(self.last_page);
                }
                for (key, values) in result.facets {
                    self.facets.insert(key, values);
                }
                self.error = None;
            }
            Err(err) => {
                self.rows.clear();
                self.total = 0;
                self.error = Some(err.to_string());
            }
        }
        true
    }
}
