use util_lens_common::{Result, UtilLensError};

/// Find the interval of `sorted` that contains `target`, searching `[low, high]`.
///
/// Returns the index `k` with `sorted[k] <= target < sorted[k + 1]` for targets
/// inside the searched range. This is not a membership test: a target that falls
/// strictly between two samples resolves to the left sample. When the bounds
/// cross without a hit the final upper bound is returned, which is `None` when
/// the search ran off the left end of the slice (target precedes `sorted[0]`).
///
/// Probes may look one slot left of `low` for the adjacent-interval check, so a
/// target just below `sorted[low]` still resolves to `low - 1`.
///
/// `low > high` returns `Some(high)` without probing. `high` past the end of
/// `sorted` is `OutOfRange`.
pub fn locate(sorted: &[i64], low: usize, high: usize, target: i64) -> Result<Option<usize>> {
    if high >= sorted.len() {
        return Err(UtilLensError::out_of_range(format!(
            "search bound {high} past end of {} samples",
            sorted.len()
        )));
    }
    let mut low = low;
    let mut high = Some(high);
    while let Some(h) = high {
        if low > h {
            break;
        }
        let mid = low + ((h - low) >> 1);
        let probe = sorted[mid];
        if probe == target {
            return Ok(Some(mid));
        }
        if target < probe {
            // no left neighbour at mid == 0
            if let Some(left) = mid.checked_sub(1) {
                if target > sorted[left] {
                    return Ok(Some(left));
                }
            }
            high = mid.checked_sub(1);
        } else {
            low = mid + 1;
        }
    }
    Ok(high)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [i64; 6] = [10, 20, 30, 40, 50, 60];

    fn loc(target: i64) -> Option<usize> {
        locate(&SAMPLES, 0, SAMPLES.len() - 1, target).unwrap()
    }

    #[test]
    fn exact_hits_return_their_index() {
        for (k, &v) in SAMPLES.iter().enumerate() {
            assert_eq!(loc(v), Some(k), "target {v}");
        }
    }

    #[test]
    fn interior_targets_return_left_endpoint() {
        for k in 0..SAMPLES.len() - 1 {
            for t in SAMPLES[k] + 1..SAMPLES[k + 1] {
                assert_eq!(loc(t), Some(k), "target {t}");
            }
        }
    }

    #[test]
    fn past_last_sample_returns_last_index() {
        assert_eq!(loc(61), Some(5));
        assert_eq!(loc(i64::MAX), Some(5));
    }

    #[test]
    fn below_first_sample_does_not_read_before_slice() {
        assert_eq!(loc(9), None);
        assert_eq!(loc(i64::MIN), None);
        assert_eq!(locate(&[10], 0, 0, 3).unwrap(), None);
        assert_eq!(locate(&[10, 20], 0, 1, 3).unwrap(), None);
    }

    #[test]
    fn single_sample() {
        assert_eq!(locate(&[10], 0, 0, 10).unwrap(), Some(0));
        assert_eq!(locate(&[10], 0, 0, 11).unwrap(), Some(0));
    }

    #[test]
    fn raised_low_bound_still_resolves_interval() {
        assert_eq!(locate(&SAMPLES, 2, 5, 45).unwrap(), Some(3));
        assert_eq!(locate(&SAMPLES, 3, 5, 40).unwrap(), Some(3));
        // adjacent check looks left of the lower bound
        assert_eq!(locate(&SAMPLES, 3, 5, 35).unwrap(), Some(2));
    }

    #[test]
    fn crossed_bounds_return_high() {
        assert_eq!(locate(&SAMPLES, 4, 2, 35).unwrap(), Some(2));
    }

    #[test]
    fn high_past_end_is_out_of_range() {
        let err = locate(&SAMPLES, 0, SAMPLES.len(), 35).unwrap_err();
        assert!(matches!(err, UtilLensError::OutOfRange(_)));
        assert!(matches!(
            locate(&[], 0, 0, 1).unwrap_err(),
            UtilLensError::OutOfRange(_)
        ));
    }
}
