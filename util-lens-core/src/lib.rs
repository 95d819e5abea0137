pub mod aggregate;
pub mod bins;
pub mod critical_points;
pub mod export;
pub mod histogram;
pub mod intervals;
pub mod locate;
pub mod report;
pub mod series;
pub mod trace;

pub use util_lens_common::{Result, UtilLensError};
pub use aggregate::{aggregate_histogram, histograms_for_locations, LocationSet};
pub use bins::{average_utilization, BinUtilization};
pub use critical_points::{evenly_spaced, is_non_decreasing};
pub use export::{export_csv, export_json, print_summary, write_summary};
pub use histogram::{
    build_histogram, build_histogram_into, build_histogram_traced, build_histogram_with, Histogram,
    HistogramEntry, HistogramSlices, Validation,
};
pub use intervals::{series_from_intervals, Interval};
pub use locate::locate;
pub use report::{HistogramReport, LocationReport, ReportMetadata, ReportRequest};
pub use series::{LocationEntry, LocationSeries, OwnedLocationSeries};
pub use trace::{load_trace, load_traces, resolve_trace_paths, TraceFile};
