use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use util_lens_common::{Result, UtilLensError};

use crate::aggregate::{aggregate_histogram, histograms_for_locations, LocationSet};
use crate::bins::{average_utilization, BinUtilization};
use crate::critical_points::evenly_spaced;
use crate::histogram::{Histogram, Validation};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub begin: i64,
    pub end: i64,
    pub bins: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    pub histogram: Histogram,
    pub bins: Vec<BinUtilization>,
}

impl From<Histogram> for LocationReport {
    fn from(histogram: Histogram) -> Self {
        let bins = average_utilization(&histogram);
        Self { histogram, bins }
    }
}

/// Utilization over `[begin, end]`: the sum across locations in `data`, or one
/// entry per requested location in `locations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramReport {
    pub metadata: ReportMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<LocationReport>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub locations: BTreeMap<String, LocationReport>,
}

#[derive(Debug, Clone, Default)]
pub struct ReportRequest {
    pub bins: usize,
    pub begin: Option<i64>,
    pub end: Option<i64>,
    pub locations: Option<Vec<String>>,
    pub validation: Validation,
}

impl HistogramReport {
    pub fn build(set: &LocationSet, req: &ReportRequest) -> Result<Self> {
        let (domain_begin, domain_end) = set
            .domain()
            .ok_or_else(|| UtilLensError::invalid("trace has no locations"))?;
        let begin = req.begin.unwrap_or(domain_begin);
        let end = req.end.unwrap_or(domain_end);
        let points = evenly_spaced(begin, end, req.bins)?;
        let metadata = ReportMetadata { begin, end, bins: req.bins };

        match &req.locations {
            Some(names) => {
                let selected = set.select(names)?;
                let locations = histograms_for_locations(&selected, &points, req.validation)?
                    .into_iter()
                    .map(|(name, h)| (name, LocationReport::from(h)))
                    .collect();
                Ok(Self { metadata, data: None, locations })
            }
            None => {
                let total = aggregate_histogram(set, &points, req.validation)?;
                Ok(Self {
                    metadata,
                    data: Some(total.into()),
                    locations: BTreeMap::new(),
                })
            }
        }
    }

    /// The aggregate, or every location in name order.
    pub fn sections(&self) -> Vec<(&str, &LocationReport)> {
        match &self.data {
            Some(total) => vec![("all", total)],
            None => self.locations.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        }
    }
}
