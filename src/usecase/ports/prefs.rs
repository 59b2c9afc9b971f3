use std::sync::Arc;

use crate::domain::query::PerPage;

/// Per-page UI preference storage. Implementations log and swallow their own
/// failures: losing a stored page size must never take the page down.
pub trait PrefsStore: Send + Sync {
    fn init(&self);

    fn load(&self, page: &str, key: &str) -> Option<String>;

    fn save(&self, page: &str, key: &str, value: &str);

    fn remove(&self, page: &str, key: &str);
}

pub const HIDDEN_COLUMNS_KEY: &str = "hiddenCols";
pub const PER_PAGE_KEY: &str = "perPage";

/// Handle scoping a store to one page's namespace, with typed accessors for
/// the two preferences every record page keeps.
#[derive(Clone)]
pub struct PageScope {
    store: Arc<dyn PrefsStore>,
    page: String,
}

impl PageScope {
    pub fn new(store: Arc<dyn PrefsStore>, page: &str) -> Self {
        PageScope {
            store,
            page: page.to_string(),
        }
    }

    pub fn hidden_columns(&self) -> Option<Vec<String>> {
        let raw = self.store.load(&self.page, HIDDEN_COLUMNS_KEY)?;
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(keys) => Some(keys),
            Err(err) => {
                tracing::warn!(page = %self.page, %err, "discarding malformed hidden-column preference");
                self.store.remove(&self.page, HIDDEN_COLUMNS_KEY);
                None
            }
        }
    }

    pub fn set_hidden_columns(&self, keys: &[String]) {
        match serde_json::to_string(keys) {
            Ok(raw) => self.store.save(&self.page, HIDDEN_COLUMNS_KEY, &raw),
            Err(err) => tracing::warn!(page = %self.page, %err, "failed to encode hidden columns"),
        }
    }

    pub fn per_page(&self) -> Option<PerPage> {
        let raw = self.store.load(&self.page, PER_PAGE_KEY)?;
        raw.parse::<u64>().ok().and_then(PerPage::from_u64)
    }

    pub fn set_per_page(&self, per_page: PerPage) {
        self.store
            .save(&self.page, PER_PAGE_KEY, &per_page.as_u64().to_string());
    }

    /// Releases the scope. Stored keys survive so column choices come back on
    /// the next mount; only an explicit reset rewrites them.
    pub fn dispose(self) {}
}
