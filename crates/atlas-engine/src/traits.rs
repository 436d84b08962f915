//! The record store seam.
//!
//! The engine never talks to a concrete database. Any backend that can hand
//! over company records implements [`RecordStore`]; the executor interprets
//! the compiled predicate AST against whatever comes back, so filter
//! semantics stay identical across backends.
//!
//! The store call is the only operation in the request pipeline expected to
//! block or suspend. Because it is `async`, dropping the request future
//! (e.g. the client disconnected) cancels the in-flight store call instead
//! of wasting backend work.
//!
//! # Example: implementing RecordStore
//!
//! ```ignore
//! use atlas_engine::{CompanyRecord, EngineResult, FacetOptions, RecordStore};
//! use async_trait::async_trait;
//!
//! struct PgStore { pool: sqlx::PgPool }
//!
//! #[async_trait]
//! impl RecordStore for PgStore {
//!     async fn scan(&self) -> EngineResult<Vec<CompanyRecord>> {
//!         // SELECT ... FROM companies
//!         # unimplemented!()
//!     }
//!
//!     async fn facet_options(&self) -> EngineResult<FacetOptions> {
//!         // SELECT DISTINCT ... per dimension
//!         # unimplemented!()
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::EngineResult;
use crate::model::{CompanyRecord, FacetOptions};

/// Trait for backends that can serve company records to the engine.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the current corpus of company records.
    async fn scan(&self) -> EngineResult<Vec<CompanyRecord>>;

    /// Returns available values per filterable dimension, computed over the
    /// unfiltered corpus.
    ///
    /// A failure here is a partial degradation, not a request failure: the
    /// executor logs it and carries on with empty facets.
    async fn facet_options(&self) -> EngineResult<FacetOptions>;
}
