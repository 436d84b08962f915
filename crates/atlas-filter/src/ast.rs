//! Typed predicate nodes for compiled filters.
//!
//! A [`crate::FilterSpec`] lowers into a flat list of [`Predicate`]s. The
//! list is conjunctive: a record matches the filter when it satisfies every
//! predicate. Multiple values inside a single predicate are disjunctive.

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Scalar record dimensions usable in set-membership predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SetField {
    /// Company country.
    Country,
    /// Company state/province.
    State,
    /// Company city.
    City,
    /// Classification: equipment, service, material, software.
    CompanyType,
    /// Role within its classification (manufacturer, supplier, ...).
    CompanyRole,
    /// Market segment (industrial, desktop, ...).
    Segment,
    /// Primary market served.
    PrimaryMarket,
}

impl std::fmt::Display for SetField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SetField::Country => "country",
            SetField::State => "state",
            SetField::City => "city",
            SetField::CompanyType => "companyType",
            SetField::CompanyRole => "companyRole",
            SetField::Segment => "segment",
            SetField::PrimaryMarket => "primaryMarket",
        };
        write!(f, "{}", name)
    }
}

/// Array-valued record dimensions usable in overlap predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListField {
    /// Process technologies the company works with.
    Technologies,
    /// Materials the company works with.
    Materials,
}

impl std::fmt::Display for ListField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ListField::Technologies => "technologies",
            ListField::Materials => "materials",
        };
        write!(f, "{}", name)
    }
}

/// Boolean capability-existence checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// The record lists a website.
    Website,
    /// The record has at least one piece of equipment.
    Equipment,
    /// The record offers at least one service.
    Services,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Capability::Website => "hasWebsite",
            Capability::Equipment => "hasEquipment",
            Capability::Services => "hasServices",
        };
        write!(f, "{}", name)
    }
}

/// Geographic bounding box in decimal degrees.
///
/// Invariant: `south <= north` and `west <= east`. Antimeridian wraparound
/// is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// Northern latitude limit.
    pub north: f64,
    /// Southern latitude limit.
    pub south: f64,
    /// Eastern longitude limit.
    pub east: f64,
    /// Western longitude limit.
    pub west: f64,
}

impl GeoBounds {
    /// Creates a bounding box, checking the ordering invariant.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Result<Self, FilterError> {
        let bounds = Self {
            north,
            south,
            east,
            west,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    /// Checks the ordering invariant and that all sides are finite.
    pub fn validate(&self) -> Result<(), FilterError> {
        for (name, v) in [
            ("north", self.north),
            ("south", self.south),
            ("east", self.east),
            ("west", self.west),
        ] {
            if !v.is_finite() {
                return Err(FilterError::InvalidBounds(format!("{} is not finite", name)));
            }
        }
        if self.south > self.north {
            return Err(FilterError::InvalidBounds(
                "south must not exceed north".to_string(),
            ));
        }
        if self.west > self.east {
            return Err(FilterError::InvalidBounds(
                "west must not exceed east".to_string(),
            ));
        }
        Ok(())
    }

    /// Four-sided inclusive containment check.
    ///
    /// A point exactly on any edge (including a corner) is inside.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.south && lat <= self.north && lng >= self.west && lng <= self.east
    }
}

impl std::fmt::Display for GeoBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{},{}]x[{},{}]",
            self.south, self.north, self.west, self.east
        )
    }
}

/// A single typed constraint interpreted by the query executor.
///
/// Replaces an ad-hoc chain of conditional query-builder calls with an
/// explicit AST, so filter semantics stay independent of any one storage
/// backend's query API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Predicate {
    /// The record's scalar field value is one of `values`.
    SetMembership {
        /// Which scalar dimension to test.
        field: SetField,
        /// Accepted values (disjunctive).
        values: Vec<String>,
    },
    /// The record's list field shares at least one element with `values`.
    ///
    /// Non-empty-intersection semantics: any requested value matches, not
    /// all of them.
    Overlap {
        /// Which list dimension to test.
        field: ListField,
        /// Requested values (disjunctive).
        values: Vec<String>,
    },
    /// The record has the given capability.
    Flag {
        /// Which capability must exist.
        capability: Capability,
    },
    /// Case-insensitive text match over the record's descriptive fields.
    TextMatch {
        /// The search term.
        term: String,
    },
    /// The record's stored coordinates fall inside the box.
    ///
    /// Records lacking coordinates never satisfy this predicate.
    InBounds {
        /// The viewport box.
        bounds: GeoBounds,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_valid() {
        let b = GeoBounds::new(55.0, 47.0, 15.0, 5.0).unwrap();
        assert!(b.contains(51.0, 10.0));
    }

    #[test]
    fn test_bounds_inverted_latitude_rejected() {
        let err = GeoBounds::new(10.0, 20.0, 15.0, 5.0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidBounds(_)));
    }

    #[test]
    fn test_bounds_inverted_longitude_rejected() {
        let err = GeoBounds::new(20.0, 10.0, -5.0, 5.0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidBounds(_)));
    }

    #[test]
    fn test_bounds_non_finite_rejected() {
        let err = GeoBounds::new(f64::NAN, 10.0, 5.0, -5.0).unwrap_err();
        assert!(matches!(err, FilterError::InvalidBounds(_)));
    }

    #[test]
    fn test_bounds_edges_inclusive() {
        let b = GeoBounds::new(55.0, 47.0, 15.0, 5.0).unwrap();
        // All four corners sit inside.
        assert!(b.contains(55.0, 15.0));
        assert!(b.contains(47.0, 5.0));
        assert!(b.contains(55.0, 5.0));
        assert!(b.contains(47.0, 15.0));
        // Just outside each edge is out.
        assert!(!b.contains(55.001, 10.0));
        assert!(!b.contains(46.999, 10.0));
        assert!(!b.contains(51.0, 15.001));
        assert!(!b.contains(51.0, 4.999));
    }

    #[test]
    fn test_degenerate_bounds_allowed() {
        // A zero-area box is valid and contains exactly its point.
        let b = GeoBounds::new(50.0, 50.0, 8.0, 8.0).unwrap();
        assert!(b.contains(50.0, 8.0));
        assert!(!b.contains(50.0, 8.1));
    }

    #[test]
    fn test_field_display() {
        assert_eq!(SetField::CompanyType.to_string(), "companyType");
        assert_eq!(ListField::Materials.to_string(), "materials");
        assert_eq!(Capability::Website.to_string(), "hasWebsite");
    }

    #[test]
    fn test_predicate_serialization_roundtrip() {
        let p = Predicate::SetMembership {
            field: SetField::Country,
            values: vec!["Germany".to_string()],
        };
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"kind\""));
        let back: Predicate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
