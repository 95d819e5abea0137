use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use util_lens_common::{Result, UtilLensError};

use crate::aggregate::LocationSet;
use crate::intervals::{series_from_intervals, Interval};
use crate::series::OwnedLocationSeries;

/// On-disk trace: raw busy intervals and/or pre-reduced series per location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceFile {
    #[serde(default)]
    pub intervals: BTreeMap<String, Vec<(i64, i64)>>,
    #[serde(default)]
    pub series: BTreeMap<String, OwnedLocationSeries>,
}

impl TraceFile {
    pub fn into_location_set(self) -> Result<LocationSet> {
        let mut set = LocationSet::new();
        for (location, raw) in self.intervals {
            let intervals: Vec<Interval> = raw.into_iter().map(Interval::from).collect();
            set.insert(location, series_from_intervals(&intervals)?);
        }
        for (location, series) in self.series {
            series.as_series()?; // reject malformed series at load time
            if set.get(&location).is_some() {
                warn!(%location, "location has both intervals and a series; using the series");
            }
            set.insert(location, series);
        }
        Ok(set)
    }
}

pub fn load_trace(path: &Path) -> Result<LocationSet> {
    let content = std::fs::read_to_string(path)?;
    let trace: TraceFile = serde_json::from_str(&content)?;
    let set = trace.into_location_set()?;
    debug!(path = %path.display(), locations = set.len(), "loaded trace");
    Ok(set)
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

/// resolve a path string: single file, directory of *.json, or glob pattern
pub fn resolve_trace_paths(input: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(input);
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut results = Vec::new();
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let p = entry?.path();
            if p.is_file() && is_json(&p) {
                results.push(p);
            }
        }
    } else {
        let entries = glob::glob(input).map_err(|e| UtilLensError::invalid(e.to_string()))?;
        for entry in entries.flatten() {
            if entry.is_file() && is_json(&entry) {
                results.push(entry);
            }
        }
    }
    results.sort();
    Ok(results)
}

/// Load every trace `input` resolves to. With several files, locations are
/// named `<file stem>/<location>` so they cannot collide.
pub fn load_traces(input: &str) -> Result<LocationSet> {
    let paths = resolve_trace_paths(input)?;
    if paths.is_empty() {
        return Err(UtilLensError::invalid(format!("no trace files found: {input}")));
    }
    if let [single] = paths.as_slice() {
        return load_trace(single);
    }
    let mut merged = LocationSet::new();
    for path in &paths {
        let stem = path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        for (location, series) in load_trace(path)?.locations {
            merged.insert(format!("{stem}/{location}"), series);
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACE: &str = r#"{
        "intervals": { "t0": [[0, 10], [5, 15]] },
        "series": { "t1": { "index": [0, 8], "counter": [2, 0], "util": [0.0, 16.0] } }
    }"#;

    #[test]
    fn parses_both_sections() {
        let trace: TraceFile = serde_json::from_str(TRACE).unwrap();
        let set = trace.into_location_set().unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["t0", "t1"]);
        assert_eq!(set.get("t0").unwrap().counter, vec![1, 2, 1, 0]);
    }

    #[test]
    fn rejects_malformed_series() {
        let bad = r#"{ "series": { "t": { "index": [3, 1], "counter": [0, 0], "util": [0.0, 0.0] } } }"#;
        let trace: TraceFile = serde_json::from_str(bad).unwrap();
        assert!(trace.into_location_set().is_err());
    }

    #[test]
    fn loads_file_directory_and_glob() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), TRACE).unwrap();
        std::fs::write(dir.path().join("b.json"), TRACE).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let single = load_traces(dir.path().join("a.json").to_str().unwrap()).unwrap();
        assert_eq!(single.len(), 2);

        let all = load_traces(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.get("a/t0").is_some());
        assert!(all.get("b/t1").is_some());

        let pattern = format!("{}/b*.json", dir.path().display());
        assert_eq!(resolve_trace_paths(&pattern).unwrap().len(), 1);
    }

    #[test]
    fn missing_input_is_invalid_argument() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_traces(dir.path().join("none-*.json").to_str().unwrap()).unwrap_err();
        assert!(matches!(err, UtilLensError::InvalidArgument(_)));
    }

    #[test]
    fn bad_json_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_trace(&path).unwrap_err(), UtilLensError::Json(_)));
    }
}
