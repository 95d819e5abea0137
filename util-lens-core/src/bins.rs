use serde::{Deserialize, Serialize};

use crate::histogram::Histogram;

/// Utilization accumulated between two consecutive critical points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinUtilization {
    pub begin: i64,
    pub end: i64,
    pub util_delta: f64,
    pub average: f64, // util_delta per unit of position, 0 for empty bins
}

pub fn average_utilization(hist: &Histogram) -> Vec<BinUtilization> {
    hist.entries()
        .zip(hist.entries().skip(1))
        .map(|(a, b)| {
            let util_delta = b.util - a.util;
            let width = b.index as i128 - a.index as i128;
            let average = if width > 0 { util_delta / width as f64 } else { 0.0 };
            BinUtilization {
                begin: a.index,
                end: b.index,
                util_delta,
                average,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hist(index: Vec<i64>, util: Vec<f64>) -> Histogram {
        let counter = vec![0; index.len()];
        Histogram { index, counter, util }
    }

    #[test]
    fn averages_per_bin() {
        let h = hist(vec![0, 10, 20], vec![0.0, 5.0, 25.0]);
        let bins = average_utilization(&h);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].average, 0.5);
        assert_eq!(bins[1].util_delta, 20.0);
        assert_eq!(bins[1].average, 2.0);
        assert_eq!((bins[1].begin, bins[1].end), (10, 20));
    }

    #[test]
    fn zero_width_bin_averages_to_zero() {
        let h = hist(vec![5, 5], vec![1.0, 1.0]);
        assert_eq!(average_utilization(&h)[0].average, 0.0);
    }

    #[test]
    fn short_histograms_have_no_bins() {
        assert!(average_utilization(&hist(vec![], vec![])).is_empty());
        assert!(average_utilization(&hist(vec![1], vec![0.0])).is_empty());
    }
}
