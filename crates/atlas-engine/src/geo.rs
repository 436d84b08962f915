//! Coordinate resolution for map pin rendering.
//!
//! Records with stored coordinates render verbatim. Records with only a
//! country get one synthesized position near that country's centroid, with
//! a bounded jitter so co-located fallback markers do not perfectly
//! overlap. Records whose country is not in the centroid table cannot be
//! placed on a map and are omitted from pin results; they still count in
//! non-geographic aggregates and in the missing-coordinates diagnostic.

use rand::Rng;

use crate::model::{CompanyRecord, ResolvedMarker};

/// Maximum latitude jitter applied to a fallback marker, in degrees.
pub const MAX_LAT_JITTER: f64 = 0.4;

/// Maximum longitude jitter applied to a fallback marker, in degrees.
pub const MAX_LNG_JITTER: f64 = 0.8;

/// Country centroids for fallback placement, keyed by normalized name.
const COUNTRY_CENTROIDS: &[(&str, f64, f64)] = &[
    ("argentina", -38.4, -63.6),
    ("australia", -25.3, 133.8),
    ("austria", 47.6, 14.1),
    ("belgium", 50.6, 4.5),
    ("brazil", -14.2, -51.9),
    ("canada", 56.1, -106.3),
    ("chile", -35.7, -71.5),
    ("china", 35.9, 104.2),
    ("czech republic", 49.8, 15.5),
    ("denmark", 56.0, 9.5),
    ("estonia", 58.6, 25.0),
    ("finland", 64.0, 26.0),
    ("france", 46.6, 2.5),
    ("germany", 51.2, 10.4),
    ("greece", 39.1, 22.9),
    ("hungary", 47.2, 19.5),
    ("india", 20.6, 79.0),
    ("ireland", 53.4, -8.2),
    ("israel", 31.0, 34.9),
    ("italy", 42.8, 12.6),
    ("japan", 36.2, 138.3),
    ("lithuania", 55.2, 23.9),
    ("luxembourg", 49.8, 6.1),
    ("mexico", 23.6, -102.6),
    ("netherlands", 52.1, 5.3),
    ("new zealand", -41.8, 172.8),
    ("norway", 64.6, 11.5),
    ("poland", 52.1, 19.4),
    ("portugal", 39.6, -8.0),
    ("romania", 45.9, 25.0),
    ("russia", 61.5, 105.3),
    ("saudi arabia", 23.9, 45.1),
    ("singapore", 1.35, 103.8),
    ("slovakia", 48.7, 19.7),
    ("slovenia", 46.1, 14.8),
    ("south africa", -30.6, 22.9),
    ("south korea", 36.5, 127.9),
    ("spain", 40.2, -3.6),
    ("sweden", 62.2, 14.6),
    ("switzerland", 46.8, 8.2),
    ("taiwan", 23.7, 121.0),
    ("turkey", 39.0, 35.2),
    ("ukraine", 48.4, 31.2),
    ("united arab emirates", 23.4, 53.8),
    ("united kingdom", 54.0, -2.5),
    ("united states", 39.8, -98.6),
];

/// Looks up a country centroid by name.
///
/// Matching is case-insensitive and tolerates the common short forms the
/// corpus actually contains.
pub fn centroid(country: &str) -> Option<(f64, f64)> {
    let normalized = normalize_country(country);
    COUNTRY_CENTROIDS
        .iter()
        .find(|(name, _, _)| *name == normalized)
        .map(|(_, lat, lng)| (*lat, *lng))
}

fn normalize_country(country: &str) -> String {
    let lowered = country.trim().to_lowercase();
    match lowered.as_str() {
        "usa" | "us" | "united states of america" => "united states".to_string(),
        "uk" | "great britain" | "england" => "united kingdom".to_string(),
        "korea" | "republic of korea" => "south korea".to_string(),
        "holland" => "netherlands".to_string(),
        "czechia" => "czech republic".to_string(),
        "uae" => "united arab emirates".to_string(),
        _ => lowered,
    }
}

/// Source of jitter offsets for fallback markers.
///
/// The production implementation is unseeded; jitter is visual-only and
/// not required to be reproducible across calls. The seam exists so tests
/// can substitute a deterministic offset.
pub trait Jitter: Send + Sync {
    /// Returns `(dlat, dlng)` offsets. Implementations should stay inside
    /// `±MAX_LAT_JITTER` / `±MAX_LNG_JITTER`; offsets are clamped to those
    /// bounds regardless.
    fn offset(&self) -> (f64, f64);
}

/// Unseeded thread-local RNG jitter. The default in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngJitter;

impl Jitter for ThreadRngJitter {
    fn offset(&self) -> (f64, f64) {
        let mut rng = rand::thread_rng();
        (
            rng.gen_range(-MAX_LAT_JITTER..=MAX_LAT_JITTER),
            rng.gen_range(-MAX_LNG_JITTER..=MAX_LNG_JITTER),
        )
    }
}

/// Deterministic jitter for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(
    /// Latitude offset.
    pub f64,
    /// Longitude offset.
    pub f64,
);

impl Jitter for FixedJitter {
    fn offset(&self) -> (f64, f64) {
        (self.0, self.1)
    }
}

/// Resolves a record into a renderable marker.
///
/// - Stored coordinates are returned verbatim with `is_fallback = false`.
/// - Otherwise the country centroid is jittered and returned with
///   `is_fallback = true`.
/// - `None` when the record has neither coordinates nor a known country.
pub fn resolve(record: &CompanyRecord, jitter: &dyn Jitter) -> Option<ResolvedMarker> {
    if let Some((lat, lng)) = record.coordinates() {
        return Some(ResolvedMarker {
            company_id: record.id,
            lat,
            lng,
            is_fallback: false,
        });
    }

    let (lat, lng) = centroid(&record.country)?;
    let (dlat, dlng) = jitter.offset();
    Some(ResolvedMarker {
        company_id: record.id,
        lat: lat + dlat.clamp(-MAX_LAT_JITTER, MAX_LAT_JITTER),
        lng: lng + dlng.clamp(-MAX_LNG_JITTER, MAX_LNG_JITTER),
        is_fallback: true,
    })
}

/// Pin-mode resolution result.
#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    /// Markers that could be placed, resolved or fallback.
    pub markers: Vec<ResolvedMarker>,
    /// Records that could not be placed at all (unknown country and no
    /// coordinates). Diagnostic only.
    pub missing_coordinates: usize,
}

/// Resolves a whole result set into markers plus the missing-coordinate
/// diagnostic count.
pub fn resolve_markers(records: &[CompanyRecord], jitter: &dyn Jitter) -> MarkerSet {
    let mut set = MarkerSet::default();
    for record in records {
        match resolve(record, jitter) {
            Some(marker) => set.markers.push(marker),
            None => set.missing_coordinates += 1,
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, country: &str, lat: Option<f64>, lng: Option<f64>) -> CompanyRecord {
        CompanyRecord {
            id,
            name: format!("Company {}", id),
            company_type: "equipment".to_string(),
            company_role: None,
            segment: None,
            primary_market: None,
            country: country.to_string(),
            state: None,
            city: None,
            lat,
            lng,
            website: None,
            technologies: vec![],
            materials: vec![],
            equipment_count: 0,
            service_count: 0,
        }
    }

    #[test]
    fn test_stored_coordinates_returned_verbatim() {
        let r = record(1, "Germany", Some(48.137), Some(11.575));
        let marker = resolve(&r, &FixedJitter(0.4, 0.8)).unwrap();
        assert_eq!(marker.lat, 48.137);
        assert_eq!(marker.lng, 11.575);
        assert!(!marker.is_fallback);
    }

    #[test]
    fn test_fallback_uses_jittered_centroid() {
        let r = record(2, "Germany", None, None);
        let marker = resolve(&r, &FixedJitter(0.1, -0.2)).unwrap();
        assert!(marker.is_fallback);
        assert!((marker.lat - 51.3).abs() < 1e-9);
        assert!((marker.lng - 10.2).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_country_omitted() {
        let r = record(3, "Atlantis", None, None);
        assert!(resolve(&r, &FixedJitter(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_jitter_clamped_to_bounds() {
        let r = record(4, "Japan", None, None);
        let marker = resolve(&r, &FixedJitter(5.0, -9.0)).unwrap();
        let (clat, clng) = centroid("Japan").unwrap();
        assert!((marker.lat - clat).abs() <= MAX_LAT_JITTER);
        assert!((marker.lng - clng).abs() <= MAX_LNG_JITTER);
    }

    #[test]
    fn test_thread_rng_jitter_stays_in_bounds() {
        let r = record(5, "France", None, None);
        let (clat, clng) = centroid("France").unwrap();
        for _ in 0..500 {
            let marker = resolve(&r, &ThreadRngJitter).unwrap();
            assert!((marker.lat - clat).abs() <= MAX_LAT_JITTER);
            assert!((marker.lng - clng).abs() <= MAX_LNG_JITTER);
        }
    }

    #[test]
    fn test_country_normalization() {
        assert_eq!(centroid("USA"), centroid("United States"));
        assert_eq!(centroid("  uk "), centroid("United Kingdom"));
        assert_eq!(centroid("Czechia"), centroid("Czech Republic"));
        assert!(centroid("Mars").is_none());
    }

    #[test]
    fn test_resolve_markers_counts_unplaceable() {
        let rows = vec![
            record(1, "Germany", Some(48.0), Some(11.0)),
            record(2, "Germany", None, None),
            record(3, "Atlantis", None, None),
        ];
        let set = resolve_markers(&rows, &FixedJitter(0.0, 0.0));
        assert_eq!(set.markers.len(), 2);
        assert_eq!(set.missing_coordinates, 1);
        assert!(!set.markers[0].is_fallback);
        assert!(set.markers[1].is_fallback);
    }
}
