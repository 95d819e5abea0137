use util_lens_common::{Result, UtilLensError};

/// `bins + 1` boundaries splitting `[begin, end]` into equal-width bins.
///
/// Boundaries are floored to whole positions, so widths differ by at most one
/// when the domain does not divide evenly. The last boundary is exactly `end`.
pub fn evenly_spaced(begin: i64, end: i64, bins: usize) -> Result<Vec<i64>> {
    if bins == 0 {
        return Err(UtilLensError::invalid("bins must be at least 1"));
    }
    if end < begin {
        return Err(UtilLensError::invalid(format!("domain end {end} precedes begin {begin}")));
    }
    let span = end as i128 - begin as i128;
    let points = (0..=bins as i128)
        .map(|k| (begin as i128 + k * span / bins as i128) as i64)
        .collect();
    Ok(points)
}

pub fn is_non_decreasing(points: &[i64]) -> bool {
    points.windows(2).all(|w| w[0] <= w[1])
}
