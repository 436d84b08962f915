//! Compiles raw request parameters into a validated [`FilterSpec`].

use serde::{Deserialize, Serialize};

use crate::ast::{Capability, GeoBounds};
use crate::error::FieldError;
use crate::spec::{FilterSpec, Sort, SortDirection, SortField, MAX_LIMIT};

/// The loosely-typed parameter bag of an inbound request.
///
/// Every field is optional and stringly typed: list-valued filters arrive
/// comma-joined, booleans as `"true"`, and bounds as a JSON blob. The same
/// shape deserializes from a query string and from a POST body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFilterParams {
    /// Comma-joined country list.
    pub country: Option<String>,
    /// Comma-joined state list.
    pub state: Option<String>,
    /// Comma-joined city list.
    pub city: Option<String>,
    /// Comma-joined company type list.
    pub company_type: Option<String>,
    /// Comma-joined company role list.
    pub company_role: Option<String>,
    /// Comma-joined segment list.
    pub segment: Option<String>,
    /// Comma-joined primary market list.
    pub primary_market: Option<String>,
    /// Comma-joined technology list (any-of).
    pub technologies: Option<String>,
    /// Comma-joined material list (any-of).
    pub materials: Option<String>,
    /// `"true"` to require a website.
    pub has_website: Option<String>,
    /// `"true"` to require equipment.
    pub has_equipment: Option<String>,
    /// `"true"` to require services.
    pub has_services: Option<String>,
    /// Free-text search term.
    pub search: Option<String>,
    /// Viewport box as a JSON blob: `{"north":..,"south":..,"east":..,"west":..}`.
    pub bounds: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
    /// Sort field name.
    pub sort_by: Option<String>,
    /// `"asc"` or `"desc"`.
    pub sort_order: Option<String>,
    /// `"false"` to skip exact total counting.
    pub include_count: Option<String>,
    /// `"false"` to skip facet-option computation.
    pub include_filters: Option<String>,
    /// Named dataset preset merged underneath explicit parameters.
    pub dataset: Option<String>,
    /// Region granularity for aggregate requests: `"state"` or `"country"`.
    ///
    /// Not a filter; carried in the bag so it participates in cache keys.
    pub region: Option<String>,
}

impl RawFilterParams {
    /// Flattens the bag into `(name, value)` pairs for cache keying.
    ///
    /// Only populated parameters appear. Sorting the pairs makes the
    /// resulting key independent of parameter order on the wire.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let fields: [(&str, &Option<String>); 22] = [
            ("country", &self.country),
            ("state", &self.state),
            ("city", &self.city),
            ("companyType", &self.company_type),
            ("companyRole", &self.company_role),
            ("segment", &self.segment),
            ("primaryMarket", &self.primary_market),
            ("technologies", &self.technologies),
            ("materials", &self.materials),
            ("hasWebsite", &self.has_website),
            ("hasEquipment", &self.has_equipment),
            ("hasServices", &self.has_services),
            ("search", &self.search),
            ("bounds", &self.bounds),
            ("page", &self.page),
            ("limit", &self.limit),
            ("sortBy", &self.sort_by),
            ("sortOrder", &self.sort_order),
            ("includeCount", &self.include_count),
            ("includeFilters", &self.include_filters),
            ("dataset", &self.dataset),
            ("region", &self.region),
        ];
        fields
            .into_iter()
            .filter_map(|(name, value)| {
                value
                    .as_ref()
                    .map(|v| (name.to_string(), v.clone()))
            })
            .collect()
    }
}

/// Resolves a named dataset alias to its preset constraints.
///
/// Presets are merged *underneath* explicit parameters: an explicitly
/// supplied value always wins over the preset's value for the same field.
pub fn dataset_alias(name: &str) -> Option<RawFilterParams> {
    match name.trim() {
        "am-systems-manufacturers" => Some(RawFilterParams {
            company_type: Some("equipment".to_string()),
            company_role: Some("manufacturer".to_string()),
            ..RawFilterParams::default()
        }),
        "material-suppliers" => Some(RawFilterParams {
            company_type: Some("material".to_string()),
            company_role: Some("supplier".to_string()),
            ..RawFilterParams::default()
        }),
        "software-vendors" => Some(RawFilterParams {
            company_type: Some("software".to_string()),
            ..RawFilterParams::default()
        }),
        "service-bureaus" => Some(RawFilterParams {
            company_type: Some("service".to_string()),
            has_services: Some("true".to_string()),
            ..RawFilterParams::default()
        }),
        _ => None,
    }
}

/// Compiles raw parameters into a validated [`FilterSpec`].
///
/// Returns either a spec or the full list of field-level validation
/// errors, never both. Expected bad input is an `Err` value, not a panic.
///
/// # Example
///
/// ```rust
/// use atlas_filter::{compile, RawFilterParams};
///
/// let raw = RawFilterParams {
///     page: Some("0".to_string()),
///     bounds: Some("not json".to_string()),
///     ..RawFilterParams::default()
/// };
/// let errors = compile(&raw).unwrap_err();
/// assert_eq!(errors.len(), 2);
/// ```
pub fn compile(raw: &RawFilterParams) -> Result<FilterSpec, Vec<FieldError>> {
    let mut errors = Vec::new();

    // Resolve the dataset alias first so explicit values can shadow it.
    let merged = match raw.dataset.as_deref() {
        Some(name) => match dataset_alias(name) {
            Some(preset) => merge_under(raw, &preset),
            None => {
                errors.push(FieldError::new(
                    "dataset",
                    format!("unknown dataset alias '{}'", name.trim()),
                ));
                raw.clone()
            }
        },
        None => raw.clone(),
    };

    let mut spec = FilterSpec::default();

    let set_params: [(&str, &Option<String>, &mut Vec<String>); 9] = [
        ("country", &merged.country, &mut spec.countries),
        ("state", &merged.state, &mut spec.states),
        ("city", &merged.city, &mut spec.cities),
        ("companyType", &merged.company_type, &mut spec.company_types),
        ("companyRole", &merged.company_role, &mut spec.company_roles),
        ("segment", &merged.segment, &mut spec.segments),
        (
            "primaryMarket",
            &merged.primary_market,
            &mut spec.primary_markets,
        ),
        ("technologies", &merged.technologies, &mut spec.technologies),
        ("materials", &merged.materials, &mut spec.materials),
    ];
    for (name, value, target) in set_params {
        if let Some(joined) = value {
            match split_list(joined) {
                Ok(values) => *target = values,
                Err(message) => errors.push(FieldError::new(name, message)),
            }
        }
    }

    let flags: [(&Option<String>, Capability); 3] = [
        (&merged.has_website, Capability::Website),
        (&merged.has_equipment, Capability::Equipment),
        (&merged.has_services, Capability::Services),
    ];
    for (value, capability) in flags {
        if parse_bool(value) {
            spec.capabilities.push(capability);
        }
    }

    if let Some(ref term) = merged.search {
        let term = term.trim();
        if !term.is_empty() {
            spec.search = Some(term.to_string());
        }
    }

    if let Some(ref json) = merged.bounds {
        match parse_bounds(json) {
            Ok(bounds) => spec.bounds = Some(bounds),
            Err(message) => errors.push(FieldError::new("bounds", message)),
        }
    }

    if let Some(ref page) = merged.page {
        match page.trim().parse::<u32>() {
            Ok(n) if n >= 1 => spec.page = n,
            _ => errors.push(FieldError::new("page", "must be a positive integer")),
        }
    }

    if let Some(ref limit) = merged.limit {
        match limit.trim().parse::<u32>() {
            // Out-of-range limits are clamped, not rejected.
            Ok(n) => spec.limit = n.clamp(1, MAX_LIMIT),
            Err(_) => errors.push(FieldError::new("limit", "must be an integer")),
        }
    }

    spec.sort = parse_sort(merged.sort_by.as_deref(), merged.sort_order.as_deref());

    if let Some(ref include) = merged.include_count {
        spec.include_count = !include.trim().eq_ignore_ascii_case("false");
    }

    if let Some(ref include) = merged.include_filters {
        spec.include_filters = !include.trim().eq_ignore_ascii_case("false");
    }

    if errors.is_empty() {
        Ok(spec)
    } else {
        Err(errors)
    }
}

/// Copies preset values into fields the request left unset.
fn merge_under(explicit: &RawFilterParams, preset: &RawFilterParams) -> RawFilterParams {
    fn pick(explicit: &Option<String>, preset: &Option<String>) -> Option<String> {
        explicit.clone().or_else(|| preset.clone())
    }

    RawFilterParams {
        country: pick(&explicit.country, &preset.country),
        state: pick(&explicit.state, &preset.state),
        city: pick(&explicit.city, &preset.city),
        company_type: pick(&explicit.company_type, &preset.company_type),
        company_role: pick(&explicit.company_role, &preset.company_role),
        segment: pick(&explicit.segment, &preset.segment),
        primary_market: pick(&explicit.primary_market, &preset.primary_market),
        technologies: pick(&explicit.technologies, &preset.technologies),
        materials: pick(&explicit.materials, &preset.materials),
        has_website: pick(&explicit.has_website, &preset.has_website),
        has_equipment: pick(&explicit.has_equipment, &preset.has_equipment),
        has_services: pick(&explicit.has_services, &preset.has_services),
        search: pick(&explicit.search, &preset.search),
        bounds: pick(&explicit.bounds, &preset.bounds),
        page: pick(&explicit.page, &preset.page),
        limit: pick(&explicit.limit, &preset.limit),
        sort_by: pick(&explicit.sort_by, &preset.sort_by),
        sort_order: pick(&explicit.sort_order, &preset.sort_order),
        include_count: pick(&explicit.include_count, &preset.include_count),
        include_filters: pick(&explicit.include_filters, &preset.include_filters),
        dataset: None,
        region: pick(&explicit.region, &preset.region),
    }
}

/// Splits a comma-joined list, trimming each element.
///
/// Empty elements are a validation error: every set-membership value must
/// be a non-empty string after trimming.
fn split_list(joined: &str) -> Result<Vec<String>, String> {
    if joined.trim().is_empty() {
        return Err("must not be empty".to_string());
    }
    let mut values = Vec::new();
    for element in joined.split(',') {
        let element = element.trim();
        if element.is_empty() {
            return Err("contains an empty element".to_string());
        }
        values.push(element.to_string());
    }
    Ok(values)
}

fn parse_bool(value: &Option<String>) -> bool {
    matches!(value.as_deref().map(str::trim), Some(v) if v.eq_ignore_ascii_case("true"))
}

fn parse_bounds(json: &str) -> Result<GeoBounds, String> {
    let bounds: GeoBounds =
        serde_json::from_str(json).map_err(|e| format!("invalid bounds JSON: {}", e))?;
    bounds.validate().map_err(|e| e.to_string())?;
    Ok(bounds)
}

fn parse_sort(sort_by: Option<&str>, sort_order: Option<&str>) -> Sort {
    // Unknown fields fall back to the default rather than failing the request.
    let field = sort_by.and_then(SortField::parse).unwrap_or_default();
    let direction = match sort_order.map(str::trim) {
        Some(order) if order.eq_ignore_ascii_case("desc") => SortDirection::Desc,
        _ => SortDirection::Asc,
    };
    Sort { field, direction }
}
