//! Query executor: interprets compiled filter predicates against the store.

use std::cmp::Ordering;
use std::time::Instant;

use atlas_filter::{
    Capability, FilterSpec, ListField, Predicate, SetField, Sort, SortDirection, SortField,
};
use tracing::warn;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::model::{CompanyRecord, FacetOptions};
use crate::result::{CompanyPage, ExecutionStats};
use crate::traits::RecordStore;

/// Executes compiled filter specifications against a [`RecordStore`].
///
/// The executor interprets the typed predicate AST directly, so its filter
/// semantics are identical regardless of which backend implements the
/// store trait: set-membership predicates AND across dimensions and OR
/// within one, overlap predicates use non-empty-intersection semantics,
/// and bounding boxes are four-sided inclusive range checks that exclude
/// records lacking coordinates.
///
/// # Example
///
/// ```ignore
/// let store = MemoryStore::from_json(&seed)?;
/// let executor = QueryExecutor::new(&store);
/// let page = executor.execute(&spec).await?;
/// println!("{} of {:?} companies", page.rows.len(), page.total_count);
/// ```
pub struct QueryExecutor<'a> {
    store: &'a dyn RecordStore,
    config: EngineConfig,
}

impl<'a> QueryExecutor<'a> {
    /// Creates an executor with default configuration.
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
        }
    }

    /// Creates an executor with custom configuration.
    pub fn with_config(store: &'a dyn RecordStore, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Returns a reference to the executor configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Executes a filter spec and returns one page of results.
    ///
    /// `total_count` is computed only when the spec asks for it; skipping
    /// the count lets latency-sensitive callers infer "has next page" from
    /// a full page instead.
    ///
    /// A facet-option failure degrades to empty lists and is logged; it
    /// never fails the request.
    pub async fn execute(&self, spec: &FilterSpec) -> EngineResult<CompanyPage> {
        let start = Instant::now();

        let (matched, scanned) = self.select(spec).await?;

        let total_count = spec.include_count.then_some(matched.len());

        let offset = (spec.page as usize - 1).saturating_mul(spec.limit as usize);
        let rows: Vec<CompanyRecord> = matched
            .into_iter()
            .skip(offset)
            .take(spec.limit as usize)
            .collect();

        let facets = if spec.include_filters {
            match self.store.facet_options().await {
                Ok(facets) => facets,
                Err(e) => {
                    warn!(error = %e, "facet options unavailable, degrading to empty lists");
                    FacetOptions::default()
                }
            }
        } else {
            FacetOptions::default()
        };

        Ok(CompanyPage {
            rows,
            total_count,
            facets,
            stats: ExecutionStats::new(start.elapsed(), scanned),
        })
    }

    /// Returns all matching records in sort order, without pagination.
    ///
    /// Used by aggregate (heatmap) requests, which need the full match set.
    pub async fn select_all(&self, spec: &FilterSpec) -> EngineResult<Vec<CompanyRecord>> {
        Ok(self.select(spec).await?.0)
    }

    /// Scans the store, filters by the spec's predicates and sorts.
    ///
    /// Returns the matches plus the number of records scanned.
    async fn select(&self, spec: &FilterSpec) -> EngineResult<(Vec<CompanyRecord>, usize)> {
        let corpus = self.store.scan().await?;
        let scanned = corpus.len();

        if let Some(max_scan) = self.config.max_scan {
            if scanned > max_scan {
                return Err(EngineError::Store(format!(
                    "corpus size {} exceeds scan limit {}",
                    scanned, max_scan
                )));
            }
        }

        let predicates = spec.predicates();
        let mut matched: Vec<CompanyRecord> = corpus
            .into_iter()
            .filter(|record| predicates.iter().all(|p| matches_predicate(record, p)))
            .collect();

        sort_records(&mut matched, spec.sort);
        Ok((matched, scanned))
    }
}

/// Evaluates a single predicate against a record.
fn matches_predicate(record: &CompanyRecord, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::SetMembership { field, values } => match set_value(record, *field) {
            Some(actual) => values.iter().any(|v| actual.eq_ignore_ascii_case(v)),
            None => false,
        },
        Predicate::Overlap { field, values } => {
            let actual = list_values(record, *field);
            values
                .iter()
                .any(|v| actual.iter().any(|a| a.eq_ignore_ascii_case(v)))
        }
        Predicate::Flag { capability } => match capability {
            Capability::Website => record.has_website(),
            Capability::Equipment => record.equipment_count > 0,
            Capability::Services => record.service_count > 0,
        },
        Predicate::TextMatch { term } => {
            let needle = term.to_lowercase();
            text_haystacks(record)
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
        }
        // Records lacking coordinates are excluded from bounds-filtered
        // queries; they remain eligible for non-geographic aggregation.
        Predicate::InBounds { bounds } => match record.coordinates() {
            Some((lat, lng)) => bounds.contains(lat, lng),
            None => false,
        },
    }
}

fn set_value(record: &CompanyRecord, field: SetField) -> Option<&str> {
    match field {
        SetField::Country => Some(record.country.as_str()),
        SetField::State => record.state.as_deref(),
        SetField::City => record.city.as_deref(),
        SetField::CompanyType => Some(record.company_type.as_str()),
        SetField::CompanyRole => record.company_role.as_deref(),
        SetField::Segment => record.segment.as_deref(),
        SetField::PrimaryMarket => record.primary_market.as_deref(),
    }
}

fn list_values(record: &CompanyRecord, field: ListField) -> &[String] {
    match field {
        ListField::Technologies => &record.technologies,
        ListField::Materials => &record.materials,
    }
}

fn text_haystacks(record: &CompanyRecord) -> [Option<&str>; 4] {
    [
        Some(record.name.as_str()),
        record.city.as_deref(),
        record.state.as_deref(),
        Some(record.country.as_str()),
    ]
}

/// Sorts records in place by the spec's sort field and direction.
///
/// String comparisons are case-insensitive; missing optional fields sort
/// last in ascending order. Ties break by id for a stable page order.
fn sort_records(records: &mut [CompanyRecord], sort: Sort) {
    records.sort_by(|a, b| {
        let ordering = match sort.field {
            SortField::Name => cmp_text(Some(&a.name), Some(&b.name)),
            SortField::Country => cmp_text(Some(&a.country), Some(&b.country)),
            SortField::State => cmp_text(a.state.as_deref(), b.state.as_deref()),
            SortField::City => cmp_text(a.city.as_deref(), b.city.as_deref()),
            SortField::EquipmentCount => a.equipment_count.cmp(&b.equipment_count),
        };
        let ordering = match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        ordering.then_with(|| a.id.cmp(&b.id))
    });
}

fn cmp_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use atlas_filter::GeoBounds;

    fn company(id: u64, name: &str, country: &str) -> CompanyRecord {
        CompanyRecord {
            id,
            name: name.to_string(),
            company_type: "equipment".to_string(),
            company_role: None,
            segment: None,
            primary_market: None,
            country: country.to_string(),
            state: None,
            city: None,
            lat: None,
            lng: None,
            website: None,
            technologies: vec![],
            materials: vec![],
            equipment_count: 0,
            service_count: 0,
        }
    }

    #[test]
    fn test_set_membership_or_within_dimension() {
        let record = company(1, "Acme", "Germany");
        let p = Predicate::SetMembership {
            field: SetField::Country,
            values: vec!["Austria".to_string(), "germany".to_string()],
        };
        assert!(matches_predicate(&record, &p));
    }

    #[test]
    fn test_set_membership_missing_field_never_matches() {
        let record = company(1, "Acme", "Germany");
        let p = Predicate::SetMembership {
            field: SetField::Segment,
            values: vec!["industrial".to_string()],
        };
        assert!(!matches_predicate(&record, &p));
    }

    #[test]
    fn test_overlap_any_of_semantics() {
        let mut record = company(1, "Acme", "Germany");
        record.technologies = vec!["DED".to_string(), "SLA".to_string()];
        let p = Predicate::Overlap {
            field: ListField::Technologies,
            values: vec!["SLS".to_string(), "DED".to_string()],
        };
        // Shares DED even though it lacks SLS.
        assert!(matches_predicate(&record, &p));

        let none = Predicate::Overlap {
            field: ListField::Technologies,
            values: vec!["FDM".to_string()],
        };
        assert!(!matches_predicate(&record, &none));
    }

    #[test]
    fn test_flag_predicates() {
        let mut record = company(1, "Acme", "Germany");
        record.equipment_count = 3;
        assert!(matches_predicate(
            &record,
            &Predicate::Flag {
                capability: Capability::Equipment
            }
        ));
        assert!(!matches_predicate(
            &record,
            &Predicate::Flag {
                capability: Capability::Website
            }
        ));
    }

    #[test]
    fn test_text_match_over_descriptive_fields() {
        let mut record = company(1, "Laser Lab", "Germany");
        record.city = Some("Aachen".to_string());
        let by_name = Predicate::TextMatch {
            term: "laser".to_string(),
        };
        let by_city = Predicate::TextMatch {
            term: "aach".to_string(),
        };
        let miss = Predicate::TextMatch {
            term: "polymer".to_string(),
        };
        assert!(matches_predicate(&record, &by_name));
        assert!(matches_predicate(&record, &by_city));
        assert!(!matches_predicate(&record, &miss));
    }

    #[test]
    fn test_bounds_excludes_coordinate_less_records() {
        let record = company(1, "Acme", "Germany");
        let p = Predicate::InBounds {
            bounds: GeoBounds::new(55.0, 47.0, 15.0, 5.0).unwrap(),
        };
        assert!(!matches_predicate(&record, &p));
    }

    #[test]
    fn test_bounds_corner_inclusive() {
        let mut record = company(1, "Acme", "Germany");
        record.lat = Some(55.0);
        record.lng = Some(15.0);
        let p = Predicate::InBounds {
            bounds: GeoBounds::new(55.0, 47.0, 15.0, 5.0).unwrap(),
        };
        assert!(matches_predicate(&record, &p));
    }

    #[test]
    fn test_sort_missing_values_last_and_ties_by_id() {
        let mut rows = vec![
            company(3, "Same", "Germany"),
            company(1, "Same", "Germany"),
            company(2, "Same", "Germany"),
        ];
        rows[0].city = None;
        rows[1].city = Some("Berlin".to_string());
        rows[2].city = Some("berlin".to_string());

        sort_records(
            &mut rows,
            Sort {
                field: SortField::City,
                direction: SortDirection::Asc,
            },
        );
        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_execute_max_scan_guard() {
        let store = MemoryStore::new(vec![
            company(1, "A", "Germany"),
            company(2, "B", "Germany"),
        ]);
        let executor =
            QueryExecutor::with_config(&store, EngineConfig::builder().with_max_scan(1).build());
        let err = executor.execute(&FilterSpec::default()).await.unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));
    }

    #[tokio::test]
    async fn test_execute_counts_scanned_records() {
        let store = MemoryStore::new(vec![
            company(1, "A", "Germany"),
            company(2, "B", "Japan"),
        ]);
        let executor = QueryExecutor::new(&store);
        let spec = FilterSpec {
            countries: vec!["Germany".to_string()],
            ..FilterSpec::default()
        };
        let page = executor.execute(&spec).await.unwrap();
        assert_eq!(page.stats.scanned, 2);
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.total_count, Some(1));
    }
}
