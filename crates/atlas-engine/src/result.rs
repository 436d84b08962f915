//! Query result types.

use std::time::Duration;

use crate::model::{CompanyRecord, FacetOptions};

/// One page of matching company records plus facet options.
#[derive(Debug, Clone)]
pub struct CompanyPage {
    /// The page of matching records, in sort order.
    pub rows: Vec<CompanyRecord>,
    /// Exact match count, when the request asked for one.
    pub total_count: Option<usize>,
    /// Available filter values for the UI, possibly degraded to empty.
    pub facets: FacetOptions,
    /// Execution statistics.
    pub stats: ExecutionStats,
}

impl CompanyPage {
    /// Whether the page carries any rows.
    ///
    /// Empty pages are never cached: a transient "corpus not ready" state
    /// must not be memoized.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a further page exists.
    ///
    /// With an exact count this is arithmetic; without one it is inferred
    /// from the page being exactly `limit` long.
    pub fn has_next(&self, page: u32, limit: u32) -> bool {
        match self.total_count {
            Some(total) => (page as usize) * (limit as usize) < total,
            None => self.rows.len() == limit as usize,
        }
    }
}

/// Statistics from query execution.
#[derive(Debug, Clone, Default)]
pub struct ExecutionStats {
    /// Total execution duration.
    pub duration: Duration,
    /// Number of records scanned.
    pub scanned: usize,
}

impl ExecutionStats {
    /// Creates new execution stats.
    pub fn new(duration: Duration, scanned: usize) -> Self {
        Self { duration, scanned }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(rows: usize, total: Option<usize>) -> CompanyPage {
        let rows = (0..rows)
            .map(|i| CompanyRecord {
                id: i as u64,
                name: format!("Company {}", i),
                company_type: "equipment".to_string(),
                company_role: None,
                segment: None,
                primary_market: None,
                country: "Germany".to_string(),
                state: None,
                city: None,
                lat: None,
                lng: None,
                website: None,
                technologies: vec![],
                materials: vec![],
                equipment_count: 0,
                service_count: 0,
            })
            .collect();
        CompanyPage {
            rows,
            total_count: total,
            facets: FacetOptions::default(),
            stats: ExecutionStats::default(),
        }
    }

    #[test]
    fn test_has_next_with_exact_count() {
        let page = page_of(50, Some(120));
        assert!(page.has_next(1, 50));
        assert!(page.has_next(2, 50));
        assert!(!page.has_next(3, 50));
    }

    #[test]
    fn test_has_next_inferred_from_full_page() {
        let full = page_of(50, None);
        assert!(full.has_next(1, 50));

        let short = page_of(20, None);
        assert!(!short.has_next(1, 50));
    }

    #[test]
    fn test_is_empty() {
        assert!(page_of(0, Some(0)).is_empty());
        assert!(!page_of(1, Some(1)).is_empty());
    }
}
