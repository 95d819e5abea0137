use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use util_lens_common::{Result, UtilLensError};

use crate::critical_points::is_non_decreasing;
use crate::locate::locate;
use crate::series::LocationSeries;

/// Whether the critical points are scanned for sortedness before building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validation {
    #[default]
    Checked,
    /// Decreasing points give silently wrong (never undefined) output.
    Unchecked,
}

impl Validation {
    pub fn from_flag(validate: bool) -> Self {
        if validate {
            Self::Checked
        } else {
            Self::Unchecked
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramEntry {
    pub index: i64,
    pub counter: i64,
    pub util: f64,
}

impl HistogramEntry {
    fn before_data(pt: i64) -> Self {
        Self { index: pt, counter: 0, util: 0.0 }
    }
}

/// Step function sampled at each critical point, stored as parallel arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub index: Vec<i64>,
    pub counter: Vec<i64>,
    pub util: Vec<f64>,
}

impl Histogram {
    /// Zeroed histogram with room for `len` entries.
    pub fn zeroed(len: usize) -> Self {
        Self {
            index: vec![0; len],
            counter: vec![0; len],
            util: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn entry(&self, i: usize) -> Option<HistogramEntry> {
        Some(HistogramEntry {
            index: *self.index.get(i)?,
            counter: *self.counter.get(i)?,
            util: *self.util.get(i)?,
        })
    }

    pub fn entries(&self) -> impl Iterator<Item = HistogramEntry> + '_ {
        self.index
            .iter()
            .zip(&self.counter)
            .zip(&self.util)
            .map(|((&index, &counter), &util)| HistogramEntry { index, counter, util })
    }

    pub fn as_slices_mut(&mut self) -> HistogramSlices<'_> {
        HistogramSlices {
            index: &mut self.index,
            counter: &mut self.counter,
            util: &mut self.util,
        }
    }
}

/// Caller-owned output buffers, one slot per critical point.
#[derive(Debug)]
pub struct HistogramSlices<'a> {
    pub index: &'a mut [i64],
    pub counter: &'a mut [i64],
    pub util: &'a mut [f64],
}

impl HistogramSlices<'_> {
    fn write(&mut self, i: usize, entry: HistogramEntry) {
        self.index[i] = entry.index;
        self.counter[i] = entry.counter;
        self.util[i] = entry.util;
    }
}

fn check_inputs(
    series: &LocationSeries<'_>,
    points: &[i64],
    out_lens: [usize; 3],
    validation: Validation,
) -> Result<()> {
    if series.is_empty() {
        return Err(UtilLensError::invalid("location series is empty"));
    }
    if series.counter().len() != series.len() || series.util().len() != series.len() {
        return Err(UtilLensError::invalid(format!(
            "location arrays differ in length: index {}, counter {}, util {}",
            series.len(),
            series.counter().len(),
            series.util().len()
        )));
    }
    if out_lens.iter().any(|&n| n != points.len()) {
        return Err(UtilLensError::invalid(format!(
            "histogram buffers {:?} do not match {} critical points",
            out_lens,
            points.len()
        )));
    }
    if validation == Validation::Checked && !is_non_decreasing(points) {
        return Err(UtilLensError::invalid("critical points are not non-decreasing"));
    }
    Ok(())
}

/// Sample the series at `pt`, searching from `next_record`. Returns the new
/// lower bound with the entry.
fn sample_at(series: &LocationSeries<'_>, next_record: usize, pt: i64) -> Result<(usize, HistogramEntry)> {
    let index = series.index();
    if pt < index[0] {
        return Ok((next_record, HistogramEntry::before_data(pt)));
    }
    let k = locate(index, next_record, index.len() - 1, pt)?
        .ok_or_else(|| UtilLensError::out_of_range(format!("point {pt} resolved before first sample")))?;
    let counter = series.counter()[k];
    // i128 keeps the rate product exact for any i64 inputs
    let rate_area = (pt as i128 - index[k] as i128) * counter as i128;
    let util = rate_area as f64 + series.util()[k];
    trace!(pt, interval = k, counter, util, "critical point located");
    Ok((k, HistogramEntry { index: pt, counter, util }))
}

fn resample(
    series: &LocationSeries<'_>,
    points: &[i64],
    out: &mut HistogramSlices<'_>,
    mut on_step: impl FnMut(usize),
) -> Result<()> {
    points.iter().enumerate().try_fold(0usize, |next_record, (i, &pt)| -> Result<usize> {
        let (next_record, entry) = sample_at(series, next_record, pt)?;
        out.write(i, entry);
        on_step(next_record);
        Ok(next_record)
    })?;
    Ok(())
}

/// Resample `series` at every critical point into caller-owned buffers.
///
/// All inputs are validated before the first write, so an error leaves `out`
/// untouched. Allocates nothing.
pub fn build_histogram_into(
    series: &LocationSeries<'_>,
    points: &[i64],
    mut out: HistogramSlices<'_>,
    validation: Validation,
) -> Result<()> {
    check_inputs(
        series,
        points,
        [out.index.len(), out.counter.len(), out.util.len()],
        validation,
    )?;
    debug!(samples = series.len(), points = points.len(), ?validation, "building histogram");
    resample(series, points, &mut out, |_| {})
}

/// Owning variant of [`build_histogram_into`] with checked validation.
pub fn build_histogram(series: &LocationSeries<'_>, points: &[i64]) -> Result<Histogram> {
    build_histogram_with(series, points, Validation::Checked)
}

pub fn build_histogram_with(
    series: &LocationSeries<'_>,
    points: &[i64],
    validation: Validation,
) -> Result<Histogram> {
    let mut hist = Histogram::zeroed(points.len());
    build_histogram_into(series, points, hist.as_slices_mut(), validation)?;
    Ok(hist)
}

/// Like [`build_histogram`], also returning the search lower bound carried
/// after each critical point.
pub fn build_histogram_traced(
    series: &LocationSeries<'_>,
    points: &[i64],
) -> Result<(Histogram, Vec<usize>)> {
    let mut hist = Histogram::zeroed(points.len());
    check_inputs(series, points, [points.len(); 3], Validation::Checked)?;
    let mut bounds = Vec::with_capacity(points.len());
    resample(series, points, &mut hist.as_slices_mut(), |b| bounds.push(b))?;
    Ok((hist, bounds))
}
