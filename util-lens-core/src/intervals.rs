use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use util_lens_common::{Result, UtilLensError};

use crate::series::OwnedLocationSeries;

/// A busy span `[begin, end)` on one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub begin: i64,
    pub end: i64,
}

impl From<(i64, i64)> for Interval {
    fn from((begin, end): (i64, i64)) -> Self {
        Self { begin, end }
    }
}

/// Turn busy intervals into a location series.
///
/// Every interval opens with `+1` at `begin` and closes with `-1` at `end`.
/// Edges at the same position are merged into one sample whose counter is the
/// running number of open intervals. Utilization at each sample is the
/// counter-weighted time accumulated since the first sample.
pub fn series_from_intervals(intervals: &[Interval]) -> Result<OwnedLocationSeries> {
    let mut edges: BTreeMap<i64, i64> = BTreeMap::new();
    for iv in intervals {
        if iv.end < iv.begin {
            return Err(UtilLensError::invalid(format!(
                "interval ends at {} before it begins at {}",
                iv.end, iv.begin
            )));
        }
        if iv.end == iv.begin {
            continue;
        }
        *edges.entry(iv.begin).or_insert(0) += 1;
        *edges.entry(iv.end).or_insert(0) -= 1;
    }
    if edges.is_empty() {
        return Err(UtilLensError::invalid("no non-empty intervals to build a series from"));
    }

    let mut series = OwnedLocationSeries {
        index: Vec::with_capacity(edges.len()),
        counter: Vec::with_capacity(edges.len()),
        util: Vec::with_capacity(edges.len()),
    };
    let mut counter = 0i64;
    let mut util = 0f64;
    let mut prev: Option<i64> = None;
    for (pos, delta) in edges {
        if let Some(p) = prev {
            util += ((pos as i128 - p as i128) * counter as i128) as f64;
        }
        counter += delta;
        series.index.push(pos);
        series.counter.push(counter);
        series.util.push(util);
        prev = Some(pos);
    }
    debug!(intervals = intervals.len(), samples = series.len(), "built location series");
    Ok(series)
}
