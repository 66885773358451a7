//! Paging wire types shared by list endpoints.

use portal_gateway::RequestSpec;
use serde::Deserialize;

/// One page of a listed resource.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }
}

/// Page selector sent as `page`/`size` query parameters.
#[derive(Debug, Clone, Copy)]
pub struct PageQuery {
    /// 1-based page index.
    pub page: u32,
    pub size: u32,
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub(crate) fn apply(self, spec: RequestSpec) -> RequestSpec {
        spec.query("page", self.page).query("size", self.size)
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 1, size: 20 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_sets_query_pairs() {
        let spec = PageQuery::new(3, 50).apply(RequestSpec::get("/news"));
        assert_eq!(
            spec.query_pairs(),
            &[
                ("page".to_string(), "3".to_string()),
                ("size".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn test_is_last() {
        let page: Page<i32> = serde_json::from_value(serde_json::json!({
            "items": [1, 2],
            "page": 2,
            "total_pages": 2,
            "total_items": 22
        }))
        .unwrap();
        assert!(page.is_last());
    }
}
