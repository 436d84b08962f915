//! # atlas-engine
//!
//! Filtering, geographic aggregation, coordinate resolution and response
//! caching for the company atlas.
//!
//! The engine sits between the HTTP façade and the record store. It takes
//! a compiled [`atlas_filter::FilterSpec`], interprets its predicate AST
//! against any backend implementing [`RecordStore`], and produces either a
//! paginated page of companies, a set of renderable map markers, or a
//! per-region choropleth summary.
//!
//! ## Components
//!
//! | Component | Module | Job |
//! |-----------|--------|-----|
//! | Query executor | [`executor`] | predicates → rows, facets, pagination |
//! | Region aggregator | [`aggregate`] | rows → region stats + quantile buckets |
//! | Coordinate resolver | [`geo`] | record → renderable marker, centroid fallback |
//! | Response cache | [`cache`] | canonical request key → memoized payload |
//!
//! ## Quick start
//!
//! ```ignore
//! use atlas_engine::{MemoryStore, QueryExecutor};
//! use atlas_filter::{compile, RawFilterParams};
//!
//! let store = MemoryStore::from_json(&seed_json)?;
//! let spec = compile(&RawFilterParams {
//!     country: Some("Germany".to_string()),
//!     ..RawFilterParams::default()
//! })
//! .map_err(atlas_engine::EngineError::Validation)?;
//!
//! let executor = QueryExecutor::new(&store);
//! let page = executor.execute(&spec).await?;
//! ```
//!
//! ## Concurrency model
//!
//! Each request's compile → execute → aggregate/resolve pipeline is
//! request-scoped and needs no locking. The [`ResponseCache`] is the only
//! shared mutable state; it is safe for concurrent use, and a lost race
//! costs at worst one duplicate store query, never a wrong answer.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod aggregate;
pub mod cache;
mod config;
mod error;
mod executor;
pub mod geo;
mod model;
mod result;
mod store;
mod traits;

// Public re-exports
pub use aggregate::{aggregate, HeatmapSummary, RegionGranularity, PALETTE};
pub use cache::{canonical_key, CacheStats, ResponseCache};
pub use config::{CacheConfig, EngineConfig, EngineConfigBuilder};
pub use error::{EngineError, EngineResult};
pub use executor::QueryExecutor;
pub use geo::{
    centroid, resolve, resolve_markers, FixedJitter, Jitter, MarkerSet, ThreadRngJitter,
};
pub use model::{
    CompanyId, CompanyRecord, FacetOptions, QuantileBucket, RegionStat, ResolvedMarker,
};
pub use result::{CompanyPage, ExecutionStats};
pub use store::MemoryStore;
pub use traits::RecordStore;

// Re-export the filter types most callers need alongside the engine
pub use atlas_filter::{FilterSpec, GeoBounds};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        let _: Option<EngineConfig> = None;
        let _: Option<CacheConfig> = None;
        let _: Option<CompanyPage> = None;
        let _: Option<HeatmapSummary> = None;
        let _: Option<EngineResult<()>> = None;
    }

    #[test]
    fn test_re_exports() {
        let _id: CompanyId = 42;
        let _ = atlas_filter::compile(&atlas_filter::RawFilterParams::default());
    }
}
