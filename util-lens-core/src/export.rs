use std::io::Write;
use std::path::Path;
use util_lens_common::Result;

use crate::report::{HistogramReport, LocationReport};

// --- headless summary output ---

pub fn print_summary(report: &HistogramReport) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write_summary(&mut stdout, report)
}

pub fn write_summary(out: &mut impl Write, report: &HistogramReport) -> Result<()> {
    let m = &report.metadata;
    writeln!(out, "{:<16} {}", "Begin:", m.begin)?;
    writeln!(out, "{:<16} {}", "End:", m.end)?;
    writeln!(out, "{:<16} {}", "Bins:", m.bins)?;
    for (name, section) in report.sections() {
        writeln!(out)?;
        writeln!(out, "[{name}]")?;
        writeln!(out, "{:>20} {:>20} {:>14} {:>12}", "begin", "end", "util", "average")?;
        for bin in &section.bins {
            writeln!(
                out,
                "{:>20} {:>20} {:>14.2} {:>12.4}",
                bin.begin, bin.end, bin.util_delta, bin.average
            )?;
        }
    }
    Ok(())
}

// --- JSON export ---

pub fn export_json(output_path: &Path, report: &HistogramReport) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    serde_json::to_writer_pretty(&mut file, report)?;
    Ok(())
}

// --- CSV export ---

pub fn export_csv(output_path: &Path, report: &HistogramReport) -> Result<()> {
    let mut file = std::fs::File::create(output_path)?;
    writeln!(file, "location,index,counter,util,bin_average")?;
    for (name, section) in report.sections() {
        write_csv_rows(&mut file, &csv_field(name), section)?;
    }
    Ok(())
}

fn write_csv_rows(out: &mut impl Write, name: &str, section: &LocationReport) -> Result<()> {
    // bin i spans entries i and i+1; the last entry closes the final bin
    for (i, entry) in section.histogram.entries().enumerate() {
        let average = section.bins.get(i).map_or(String::new(), |b| format!("{:.6}", b.average));
        writeln!(out, "{},{},{},{},{}", name, entry.index, entry.counter, entry.util, average)?;
    }
    Ok(())
}

/// csv-escape: wrap in quotes if contains comma, quote, or newline
fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
