//! Data model: company records and the derived view types.

use serde::{Deserialize, Serialize};

/// Company record identifier.
pub type CompanyId = u64;

/// A company record as stored in the backing record store.
///
/// Owned by the record store; the engine reads it and never writes it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    /// Unique identifier.
    pub id: CompanyId,
    /// Display name.
    pub name: String,
    /// Classification: equipment, service, material, software.
    pub company_type: String,
    /// Role within the classification.
    #[serde(default)]
    pub company_role: Option<String>,
    /// Market segment.
    #[serde(default)]
    pub segment: Option<String>,
    /// Primary market served.
    #[serde(default)]
    pub primary_market: Option<String>,
    /// Country name.
    pub country: String,
    /// State/province.
    #[serde(default)]
    pub state: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// Stored latitude, when geocoded.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Stored longitude, when geocoded.
    #[serde(default)]
    pub lng: Option<f64>,
    /// Website URL.
    #[serde(default)]
    pub website: Option<String>,
    /// Process technologies the company works with.
    #[serde(default)]
    pub technologies: Vec<String>,
    /// Materials the company works with.
    #[serde(default)]
    pub materials: Vec<String>,
    /// Number of machines/equipment items on record.
    #[serde(default)]
    pub equipment_count: u32,
    /// Number of services on record.
    #[serde(default)]
    pub service_count: u32,
}

impl CompanyRecord {
    /// Returns the stored coordinates when both components are present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }

    /// Whether the record lists a non-blank website.
    pub fn has_website(&self) -> bool {
        self.website
            .as_deref()
            .is_some_and(|w| !w.trim().is_empty())
    }
}

/// Available values per filterable dimension, for populating UI controls.
///
/// Computed from the unfiltered corpus so the UI can always offer all valid
/// next-filter choices. Degrades to empty lists on store failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetOptions {
    /// Distinct countries.
    pub countries: Vec<String>,
    /// Distinct states.
    pub states: Vec<String>,
    /// Distinct company types.
    pub company_types: Vec<String>,
    /// Distinct company roles.
    pub company_roles: Vec<String>,
    /// Distinct segments.
    pub segments: Vec<String>,
    /// Distinct technologies.
    pub technologies: Vec<String>,
    /// Distinct materials.
    pub materials: Vec<String>,
}

/// A renderable map position derived from a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMarker {
    /// The record this marker belongs to.
    pub company_id: CompanyId,
    /// Latitude to render at.
    pub lat: f64,
    /// Longitude to render at.
    pub lng: f64,
    /// True when the position was synthesized from a country centroid.
    pub is_fallback: bool,
}

/// Per-region aggregate, recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStat {
    /// Region key: a state for state granularity, a country otherwise.
    pub region_key: String,
    /// Distinct company identities in the region.
    pub company_count: u64,
    /// Sum of equipment counts across the region.
    pub total_machines: u64,
    /// Choropleth bucket index, `None` for zero-intensity "no data" regions.
    pub bucket: Option<usize>,
}

/// One of the ordered choropleth intensity classes.
///
/// A view of the current result set's distribution, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantileBucket {
    /// Fill color, ordered low to high intensity.
    pub color: String,
    /// Lowest intensity in the class.
    pub min: u64,
    /// Highest intensity in the class, `None` for the open-ended top class.
    pub max: Option<u64>,
    /// Legend label: `"{min}-{max}"` or `"{min}+"`.
    pub label: String,
}
