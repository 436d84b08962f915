//! The validated filter specification.

use serde::{Deserialize, Serialize};

use crate::ast::{Capability, GeoBounds, ListField, Predicate, SetField};

/// Hard upper bound on page size.
pub const MAX_LIMIT: u32 = 1000;

/// Default page size when the request supplies none.
pub const DEFAULT_LIMIT: u32 = 50;

/// Record fields available for sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    /// Company name (the default).
    #[default]
    Name,
    /// Country.
    Country,
    /// State/province.
    State,
    /// City.
    City,
    /// Equipment count.
    EquipmentCount,
}

impl SortField {
    /// Parses a sort field name; unknown names yield `None` so callers can
    /// fall back to the default rather than reject the request.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "name" => Some(SortField::Name),
            "country" => Some(SortField::Country),
            "state" => Some(SortField::State),
            "city" => Some(SortField::City),
            "equipmentCount" | "equipment_count" => Some(SortField::EquipmentCount),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    /// Ascending (the default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// A sort specification: field plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sort {
    /// Field to order by.
    pub field: SortField,
    /// Direction to order in.
    pub direction: SortDirection,
}

/// A validated, immutable set of constraints compiled from a request.
///
/// Invariants (enforced by [`crate::compile`]):
/// - every set-membership / overlap value is non-empty after trimming
/// - `bounds`, if present, satisfies the [`GeoBounds`] ordering invariant
/// - `page >= 1` and `1 <= limit <= MAX_LIMIT`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Accepted countries.
    pub countries: Vec<String>,
    /// Accepted states/provinces.
    pub states: Vec<String>,
    /// Accepted cities.
    pub cities: Vec<String>,
    /// Accepted company types.
    pub company_types: Vec<String>,
    /// Accepted company roles.
    pub company_roles: Vec<String>,
    /// Accepted market segments.
    pub segments: Vec<String>,
    /// Accepted primary markets.
    pub primary_markets: Vec<String>,
    /// Requested technologies (any-of).
    pub technologies: Vec<String>,
    /// Requested materials (any-of).
    pub materials: Vec<String>,
    /// Capabilities the record must have.
    pub capabilities: Vec<Capability>,
    /// Free-text search term.
    pub search: Option<String>,
    /// Viewport bounding box.
    pub bounds: Option<GeoBounds>,
    /// 1-based page number.
    pub page: u32,
    /// Page size, clamped to `[1, MAX_LIMIT]`.
    pub limit: u32,
    /// Sort order.
    pub sort: Sort,
    /// Whether the executor should compute an exact total count.
    pub include_count: bool,
    /// Whether the executor should compute facet options.
    pub include_filters: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            countries: Vec::new(),
            states: Vec::new(),
            cities: Vec::new(),
            company_types: Vec::new(),
            company_roles: Vec::new(),
            segments: Vec::new(),
            primary_markets: Vec::new(),
            technologies: Vec::new(),
            materials: Vec::new(),
            capabilities: Vec::new(),
            search: None,
            bounds: None,
            page: 1,
            limit: DEFAULT_LIMIT,
            sort: Sort::default(),
            include_count: true,
            include_filters: true,
        }
    }
}

impl FilterSpec {
    /// Lowers the spec into the predicate list the executor interprets.
    ///
    /// Pagination, sorting and `include_count` are not predicates; they
    /// shape the result page, not which records match.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        let set_dimensions: [(SetField, &Vec<String>); 7] = [
            (SetField::Country, &self.countries),
            (SetField::State, &self.states),
            (SetField::City, &self.cities),
            (SetField::CompanyType, &self.company_types),
            (SetField::CompanyRole, &self.company_roles),
            (SetField::Segment, &self.segments),
            (SetField::PrimaryMarket, &self.primary_markets),
        ];
        for (field, values) in set_dimensions {
            if !values.is_empty() {
                predicates.push(Predicate::SetMembership {
                    field,
                    values: values.clone(),
                });
            }
        }

        let list_dimensions: [(ListField, &Vec<String>); 2] = [
            (ListField::Technologies, &self.technologies),
            (ListField::Materials, &self.materials),
        ];
        for (field, values) in list_dimensions {
            if !values.is_empty() {
                predicates.push(Predicate::Overlap {
                    field,
                    values: values.clone(),
                });
            }
        }

        for capability in &self.capabilities {
            predicates.push(Predicate::Flag {
                capability: *capability,
            });
        }

        if let Some(ref term) = self.search {
            predicates.push(Predicate::TextMatch { term: term.clone() });
        }

        if let Some(bounds) = self.bounds {
            predicates.push(Predicate::InBounds { bounds });
        }

        predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_has_no_predicates() {
        let spec = FilterSpec::default();
        assert!(spec.predicates().is_empty());
        assert_eq!(spec.page, 1);
        assert_eq!(spec.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_predicates_one_per_dimension() {
        let spec = FilterSpec {
            countries: vec!["Germany".to_string(), "Austria".to_string()],
            technologies: vec!["DED".to_string()],
            capabilities: vec![Capability::Website],
            search: Some("laser".to_string()),
            ..FilterSpec::default()
        };

        let predicates = spec.predicates();
        assert_eq!(predicates.len(), 4);
        assert!(matches!(
            &predicates[0],
            Predicate::SetMembership {
                field: SetField::Country,
                values
            } if values.len() == 2
        ));
        assert!(predicates
            .iter()
            .any(|p| matches!(p, Predicate::TextMatch { term } if term == "laser")));
    }

    #[test]
    fn test_predicates_include_bounds() {
        let spec = FilterSpec {
            bounds: Some(GeoBounds::new(55.0, 47.0, 15.0, 5.0).unwrap()),
            ..FilterSpec::default()
        };
        let predicates = spec.predicates();
        assert_eq!(predicates.len(), 1);
        assert!(matches!(predicates[0], Predicate::InBounds { .. }));
    }

    #[test]
    fn test_sort_field_parse_fallback() {
        assert_eq!(SortField::parse("name"), Some(SortField::Name));
        assert_eq!(
            SortField::parse("equipmentCount"),
            Some(SortField::EquipmentCount)
        );
        assert_eq!(SortField::parse("notAField"), None);
    }
}
