//! Regional aggregation and quantile bucketing for choropleth rendering.
//!
//! Groups a result set by region, computes per-region counts and machine
//! totals, and derives a 5-class quantile color scale from the intensity
//! distribution of the current result set. Everything here is recomputed
//! per request; nothing is persisted.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{CompanyRecord, QuantileBucket, RegionStat};

/// Fixed choropleth palette, ordered low to high intensity.
pub const PALETTE: [&str; 5] = ["#fee5d9", "#fcae91", "#fb6a4a", "#de2d26", "#a50f15"];

/// Percentile positions of the four class thresholds.
const THRESHOLD_PERCENTILES: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

/// How result rows are grouped into regions.
///
/// An explicit input to the aggregator; the engine never infers granularity
/// from which record fields happen to be populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionGranularity {
    /// Group by state/province; records without one fall back to their
    /// country so they still appear in the aggregate.
    State,
    /// Group by country.
    Country,
}

impl RegionGranularity {
    /// Parses a granularity name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "state" => Some(RegionGranularity::State),
            "country" => Some(RegionGranularity::Country),
            _ => None,
        }
    }
}

/// Aggregated regional statistics plus the color scale derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapSummary {
    /// Per-region aggregates, sorted by region key.
    pub regions: Vec<RegionStat>,
    /// The effective intensity classes. May be fewer than five when the
    /// distribution is skewed enough that percentile thresholds collapse.
    pub buckets: Vec<QuantileBucket>,
}

/// Groups rows by region and computes counts, machine totals and buckets.
///
/// The intensity metric is the per-region machine total, falling back to
/// the company count when no region has a positive machine total; this
/// avoids an all-zero choropleth when machine data is sparse. Regions with
/// zero intensity get no bucket ("no data") and are excluded from
/// threshold computation.
pub fn aggregate(rows: &[CompanyRecord], granularity: RegionGranularity) -> HeatmapSummary {
    let mut companies: BTreeMap<String, HashSet<u64>> = BTreeMap::new();
    let mut machines: BTreeMap<String, u64> = BTreeMap::new();

    for row in rows {
        let key = region_key(row, granularity);
        companies.entry(key.clone()).or_default().insert(row.id);
        *machines.entry(key).or_insert(0) += u64::from(row.equipment_count);
    }

    let mut regions: Vec<RegionStat> = companies
        .iter()
        .map(|(key, ids)| RegionStat {
            region_key: key.clone(),
            company_count: ids.len() as u64,
            total_machines: machines.get(key).copied().unwrap_or(0),
            bucket: None,
        })
        .collect();

    let use_machines = regions.iter().any(|r| r.total_machines > 0);
    let intensity = |r: &RegionStat| {
        if use_machines {
            r.total_machines
        } else {
            r.company_count
        }
    };

    let mut positive: Vec<u64> = regions
        .iter()
        .map(|r| intensity(r))
        .filter(|&i| i > 0)
        .collect();
    positive.sort_unstable();

    let thresholds = quantile_thresholds(&positive);
    for region in &mut regions {
        let value = intensity(region);
        if value > 0 {
            region.bucket = Some(bucket_index(value, &thresholds));
        }
    }

    HeatmapSummary {
        regions,
        buckets: build_buckets(&positive, &thresholds),
    }
}

fn region_key(row: &CompanyRecord, granularity: RegionGranularity) -> String {
    match granularity {
        RegionGranularity::State => row
            .state
            .clone()
            .unwrap_or_else(|| row.country.clone()),
        RegionGranularity::Country => row.country.clone(),
    }
}

/// Computes the deduplicated class thresholds from a sorted ascending list
/// of positive intensities.
///
/// Threshold values sit at the 20th/40th/60th/80th percentile positions
/// using `floor((n - 1) * p)` indexing. Duplicates collapse, and a
/// threshold equal to the maximum intensity is dropped so the top class is
/// never empty; both reduce the effective class count below five.
fn quantile_thresholds(sorted_positive: &[u64]) -> Vec<u64> {
    let n = sorted_positive.len();
    if n == 0 {
        return Vec::new();
    }
    let max = sorted_positive[n - 1];

    let mut thresholds = Vec::with_capacity(THRESHOLD_PERCENTILES.len());
    for p in THRESHOLD_PERCENTILES {
        let index = ((n - 1) as f64 * p).floor() as usize;
        let value = sorted_positive[index];
        if value < max && thresholds.last() != Some(&value) {
            thresholds.push(value);
        }
    }
    thresholds
}

/// A region's bucket index is the count of thresholds its intensity
/// exceeds.
fn bucket_index(intensity: u64, thresholds: &[u64]) -> usize {
    thresholds.iter().filter(|&&t| intensity > t).count()
}

fn build_buckets(sorted_positive: &[u64], thresholds: &[u64]) -> Vec<QuantileBucket> {
    let Some(&lowest) = sorted_positive.first() else {
        return Vec::new();
    };

    let class_count = thresholds.len() + 1;
    let mut buckets = Vec::with_capacity(class_count);
    for k in 0..class_count {
        let min = if k == 0 { lowest } else { thresholds[k - 1] + 1 };
        let max = thresholds.get(k).copied();
        let label = match max {
            Some(max) => format!("{}-{}", min, max),
            None => format!("{}+", min),
        };
        buckets.push(QuantileBucket {
            color: PALETTE[k].to_string(),
            min,
            max,
            label,
        });
    }
    buckets
}
