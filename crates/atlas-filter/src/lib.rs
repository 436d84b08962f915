//! # atlas-filter
//!
//! Filter compiler for the company atlas.
//!
//! This crate turns the loosely-typed parameter bag of an inbound request
//! (strings, comma-joined lists, an optional JSON blob for map bounds) into
//! a validated, immutable [`FilterSpec`], and lowers that spec into a list
//! of typed [`Predicate`] nodes that a query executor interprets against
//! whatever record store backs the atlas.
//!
//! The crate is pure: no I/O, no clock, no randomness. Expected bad input
//! is returned as field-level validation errors, never as a panic.
//!
//! ## Usage
//!
//! ```rust
//! use atlas_filter::{compile, RawFilterParams};
//!
//! let raw = RawFilterParams {
//!     country: Some("Germany,Austria".to_string()),
//!     company_type: Some("equipment".to_string()),
//!     limit: Some("25".to_string()),
//!     ..RawFilterParams::default()
//! };
//!
//! let spec = compile(&raw).unwrap();
//! assert_eq!(spec.countries, vec!["Germany", "Austria"]);
//! assert_eq!(spec.limit, 25);
//! ```
//!
//! ## Validation rules
//!
//! | Parameter | Rule |
//! |-----------|------|
//! | set-membership lists | every element non-empty after trimming |
//! | `bounds` | valid JSON, `south <= north`, `west <= east` |
//! | `page` | positive integer |
//! | `limit` | integer, clamped (not rejected) to `[1, 1000]` |
//! | `sortBy` | unknown fields fall back to `name` ascending |
//! | `dataset` | unknown aliases are rejected |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod ast;
mod compile;
mod error;
mod spec;

pub use ast::{Capability, GeoBounds, ListField, Predicate, SetField};
pub use compile::{compile, dataset_alias, RawFilterParams};
pub use error::{FieldError, FilterError};
pub use spec::{FilterSpec, Sort, SortDirection, SortField, DEFAULT_LIMIT, MAX_LIMIT};
