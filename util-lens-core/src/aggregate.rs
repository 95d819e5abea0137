use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;
use util_lens_common::{Result, UtilLensError};

use crate::histogram::{build_histogram_with, Histogram, Validation};
use crate::series::OwnedLocationSeries;

/// Location series keyed by location name (thread, core, rank...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationSet {
    pub locations: BTreeMap<String, OwnedLocationSeries>,
}

impl LocationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: impl Into<String>, series: OwnedLocationSeries) {
        self.locations.insert(location.into(), series);
    }

    pub fn get(&self, location: &str) -> Option<&OwnedLocationSeries> {
        self.locations.get(location)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.locations.keys().map(String::as_str)
    }

    /// Smallest first sample and largest last sample across all locations.
    pub fn domain(&self) -> Option<(i64, i64)> {
        let begin = self.locations.values().filter_map(|s| s.index.first()).min()?;
        let end = self.locations.values().filter_map(|s| s.index.last()).max()?;
        Some((*begin, *end))
    }

    /// Keep only the named locations; unknown names are an error.
    pub fn select(&self, names: &[String]) -> Result<LocationSet> {
        let mut out = LocationSet::new();
        for name in names {
            let series = self
                .get(name)
                .ok_or_else(|| UtilLensError::invalid(format!("no utilization data for location {name}")))?;
            out.insert(name.clone(), series.clone());
        }
        Ok(out)
    }

    /// Merge `other` in; a location present in both keeps `other`'s series.
    pub fn extend(&mut self, other: LocationSet) {
        self.locations.extend(other.locations);
    }
}

/// Build one histogram per location. Locations are independent, so builds run
/// on the rayon pool.
pub fn histograms_for_locations(
    set: &LocationSet,
    points: &[i64],
    validation: Validation,
) -> Result<BTreeMap<String, Histogram>> {
    debug!(locations = set.len(), points = points.len(), "building per-location histograms");
    set.locations
        .par_iter()
        .map(|(name, owned)| -> Result<(String, Histogram)> {
            let series = owned.as_series()?;
            let hist = build_histogram_with(&series, points, validation)?;
            Ok((name.clone(), hist))
        })
        .collect()
}

/// Element-wise sum of every location's histogram over the same points.
pub fn aggregate_histogram(set: &LocationSet, points: &[i64], validation: Validation) -> Result<Histogram> {
    if set.is_empty() {
        return Err(UtilLensError::invalid("no locations to aggregate"));
    }
    let per_location = histograms_for_locations(set, points, validation)?;
    sum_histograms(points, per_location.values())
}

fn sum_histograms<'a>(points: &[i64], hists: impl Iterator<Item = &'a Histogram>) -> Result<Histogram> {
    let mut total = Histogram {
        index: points.to_vec(),
        counter: vec![0; points.len()],
        util: vec![0.0; points.len()],
    };
    for h in hists {
        for ((acc, c), pt) in total.counter.iter_mut().zip(&h.counter).zip(points) {
            *acc = acc.checked_add(*c).ok_or_else(|| {
                UtilLensError::out_of_range(format!("aggregate counter overflows i64 at point {pt}"))
            })?;
        }
        for (acc, u) in total.util.iter_mut().zip(&h.util) {
            *acc += u;
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intervals::{series_from_intervals, Interval};

    fn set() -> LocationSet {
        let mut s = LocationSet::new();
        s.insert("t0", series_from_intervals(&[Interval { begin: 0, end: 10 }]).unwrap());
        s.insert("t1", series_from_intervals(&[Interval { begin: 5, end: 20 }]).unwrap());
        s
    }

    #[test]
    fn domain_spans_all_locations() {
        assert_eq!(set().domain(), Some((0, 20)));
        assert_eq!(LocationSet::new().domain(), None);
    }

    #[test]
    fn per_location_histograms() {
        let hists = histograms_for_locations(&set(), &[0, 10, 20], Validation::Checked).unwrap();
        assert_eq!(hists.len(), 2);
        assert_eq!(hists["t0"].util, vec![0.0, 10.0, 10.0]);
        assert_eq!(hists["t1"].util, vec![0.0, 5.0, 15.0]);
    }

    #[test]
    fn aggregate_sums_locations() {
        let total = aggregate_histogram(&set(), &[0, 10, 20], Validation::Checked).unwrap();
        assert_eq!(total.index, vec![0, 10, 20]);
        assert_eq!(total.counter, vec![1, 1, 0]);
        assert_eq!(total.util, vec![0.0, 15.0, 25.0]);
    }

    #[test]
    fn errors_propagate_from_any_location() {
        let mut s = set();
        s.insert("broken", OwnedLocationSeries::default());
        assert!(histograms_for_locations(&s, &[0], Validation::Checked).is_err());
        assert!(aggregate_histogram(&LocationSet::new(), &[0], Validation::Checked).is_err());
    }

    #[test]
    fn counter_overflow_is_out_of_range() {
        let mut s = LocationSet::new();
        for name in ["a", "b"] {
            s.insert(
                name,
                OwnedLocationSeries { index: vec![0], counter: vec![i64::MAX], util: vec![0.0] },
            );
        }
        let err = aggregate_histogram(&s, &[1], Validation::Checked).unwrap_err();
        assert!(matches!(err, UtilLensError::OutOfRange(_)));
    }

    #[test]
    fn select_filters_and_rejects_unknown() {
        let s = set();
        assert_eq!(s.select(&["t1".to_string()]).unwrap().len(), 1);
        assert!(s.select(&["nope".to_string()]).is_err());
    }
}
