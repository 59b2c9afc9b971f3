use std::collections::BTreeMap;

use serde_json::Value;

/// Normalized outcome of one list fetch, whatever envelope the endpoint
/// wrapped it in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListResult {
    pub rows: Vec<Value>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
    /// Filter key to available option values, deduplicated.
    pub facets: BTreeMap<String, Vec<String>>,
}

impl ListResult {
    pub fn empty() -> Self {
        ListResult {
            page: 1,
            last_page: 1,
            ..ListResult::default()
        }
    }
}

/// `last_page` when the server left it out.
pub fn derive_last_page(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        return 1;
    }
    total.div_ceil(per_page).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_page_is_ceiling_division_with_floor_of_one() {
        assert_eq!(derive_last_page(0, 25), 1);
        assert_eq!(derive_last_page(1, 25), 1);
        assert_eq!(derive_last_page(25, 25), 1);
        assert_eq!(derive_last_page(26, 25), 2);
        assert_eq!(derive_last_page(100, 25), 4);
        assert_eq!(derive_last_page(5, 0), 1);
    }
}
