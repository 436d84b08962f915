//! In-memory record store.
//!
//! The relational store behind the production atlas is an external
//! collaborator. This implementation keeps the whole corpus in memory,
//! loadable from a JSON array, and backs the server binary and the test
//! suites.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::{EngineError, EngineResult};
use crate::model::{CompanyRecord, FacetOptions};
use crate::traits::RecordStore;

/// A [`RecordStore`] holding its corpus in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<CompanyRecord>,
}

impl MemoryStore {
    /// Creates a store over the given records.
    pub fn new(records: Vec<CompanyRecord>) -> Self {
        Self { records }
    }

    /// Loads a store from a JSON array of company records.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let records: Vec<CompanyRecord> = serde_json::from_str(json)
            .map_err(|e| EngineError::Store(format!("invalid record JSON: {}", e)))?;
        Ok(Self::new(records))
    }

    /// Number of records in the corpus.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn scan(&self) -> EngineResult<Vec<CompanyRecord>> {
        Ok(self.records.clone())
    }

    async fn facet_options(&self) -> EngineResult<FacetOptions> {
        let mut countries = BTreeSet::new();
        let mut states = BTreeSet::new();
        let mut company_types = BTreeSet::new();
        let mut company_roles = BTreeSet::new();
        let mut segments = BTreeSet::new();
        let mut technologies = BTreeSet::new();
        let mut materials = BTreeSet::new();

        for record in &self.records {
            countries.insert(record.country.clone());
            if let Some(ref state) = record.state {
                states.insert(state.clone());
            }
            company_types.insert(record.company_type.clone());
            if let Some(ref role) = record.company_role {
                company_roles.insert(role.clone());
            }
            if let Some(ref segment) = record.segment {
                segments.insert(segment.clone());
            }
            technologies.extend(record.technologies.iter().cloned());
            materials.extend(record.materials.iter().cloned());
        }

        Ok(FacetOptions {
            countries: countries.into_iter().collect(),
            states: states.into_iter().collect(),
            company_types: company_types.into_iter().collect(),
            company_roles: company_roles.into_iter().collect(),
            segments: segments.into_iter().collect(),
            technologies: technologies.into_iter().collect(),
            materials: materials.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"[
            {"id":1,"name":"Acme","companyType":"equipment","country":"Germany",
             "segment":"industrial","technologies":["DED"],"materials":["titanium"]},
            {"id":2,"name":"Beta","companyType":"service","country":"Germany",
             "state":"Bavaria","technologies":["SLS","DED"]},
            {"id":3,"name":"Gamma","companyType":"material","country":"Japan",
             "companyRole":"supplier","materials":["nylon"]}
        ]"#
    }

    #[tokio::test]
    async fn test_from_json_and_scan() {
        let store = MemoryStore::from_json(sample_json()).unwrap();
        assert_eq!(store.len(), 3);
        let rows = store.scan().await.unwrap();
        assert_eq!(rows[0].name, "Acme");
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = MemoryStore::from_json("not json").unwrap_err();
        assert!(matches!(err, EngineError::Store(_)));
    }

    #[tokio::test]
    async fn test_facets_distinct_and_sorted() {
        let store = MemoryStore::from_json(sample_json()).unwrap();
        let facets = store.facet_options().await.unwrap();
        assert_eq!(facets.countries, vec!["Germany", "Japan"]);
        assert_eq!(facets.company_types, vec!["equipment", "material", "service"]);
        // DED appears twice in the corpus but once in the facets.
        assert_eq!(facets.technologies, vec!["DED", "SLS"]);
        assert_eq!(facets.states, vec!["Bavaria"]);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryStore::default();
        assert!(store.is_empty());
        assert!(store.scan().await.unwrap().is_empty());
        assert_eq!(store.facet_options().await.unwrap(), FacetOptions::default());
    }
}
