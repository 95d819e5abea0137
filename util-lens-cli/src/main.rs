mod logging;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::{Path, PathBuf};
use tracing::info;
use util_lens_common::Config;
use util_lens_core::{
    export_csv, export_json, load_traces, print_summary, HistogramReport, ReportRequest, Validation,
};

// validate bin count at CLI parse time
fn parse_bins(s: &str) -> Result<usize, String> {
    let v: usize = s.parse().map_err(|_| format!("not an integer: {s}"))?;
    if v > 0 {
        Ok(v)
    } else {
        Err("bins must be at least 1".into())
    }
}

#[derive(Parser)]
#[command(name = "util-lens", version, about = "Utilization histograms from sparse traces")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct WindowArgs {
    /// Trace file, directory of *.json traces, or glob pattern
    trace: String,
    #[arg(long, value_parser = parse_bins)]
    bins: Option<usize>,
    #[arg(long, allow_hyphen_values = true)]
    begin: Option<i64>,
    #[arg(long, allow_hyphen_values = true)]
    end: Option<i64>,
    /// Report these locations separately instead of the aggregate
    #[arg(long, value_delimiter = ',')]
    locations: Option<Vec<String>>,
    /// Skip the critical point sortedness check
    #[arg(long)]
    unchecked: bool,
}

#[derive(Subcommand)]
enum Commands {
    Histogram(WindowArgs),
    Export {
        #[command(flatten)]
        window: WindowArgs,
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        output: Option<String>,
    },
    Completions { shell: Shell },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default();
    logging::init_logging(&config.logging.level);
    match cli.command {
        Commands::Histogram(window) => run_histogram(window, &config)?,
        Commands::Export {
            window,
            format,
            output,
        } => run_export(window, format, output, &config)?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "util-lens", &mut std::io::stdout());
        }
    }
    Ok(())
}

fn build_report(window: WindowArgs, config: &Config) -> anyhow::Result<HistogramReport> {
    let set = load_traces(&window.trace).map_err(|e| anyhow::anyhow!("{e}"))?;
    info!(trace = %window.trace, locations = set.len(), "trace loaded");
    let validation = if window.unchecked {
        Validation::Unchecked
    } else {
        Validation::from_flag(config.histogram.validate)
    };
    let req = ReportRequest {
        bins: window.bins.unwrap_or(config.histogram.bins),
        begin: window.begin,
        end: window.end,
        locations: window.locations,
        validation,
    };
    HistogramReport::build(&set, &req).map_err(|e| anyhow::anyhow!("{e}"))
}

fn run_histogram(window: WindowArgs, config: &Config) -> anyhow::Result<()> {
    let report = build_report(window, config)?;
    print_summary(&report).map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}

fn run_export(
    window: WindowArgs,
    format: Option<String>,
    output: Option<String>,
    config: &Config,
) -> anyhow::Result<()> {
    let format = format.unwrap_or_else(|| config.export.format.clone());
    let report = build_report(window, config)?;
    let default_name = format!("histogram.{format}");
    let out_path: PathBuf = if let Some(ref o) = output {
        PathBuf::from(o)
    } else {
        Path::new(&config.export.output_dir).join(&default_name)
    };
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let written = match format.as_str() {
        "json" => export_json(&out_path, &report),
        "csv" => export_csv(&out_path, &report),
        other => anyhow::bail!("unsupported export format: {other} (expected json or csv)"),
    };
    written.map_err(|e| anyhow::anyhow!("{e}"))?;
    info!(path = %out_path.display(), %format, "histogram exported");
    println!("Exported to {}", out_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_export_flags() {
        let cli = Cli::try_parse_from([
            "util-lens", "export", "trace.json", "--bins", "10", "--begin", "-5",
            "--locations", "a,b", "--format", "csv",
        ])
        .unwrap();
        match cli.command {
            Commands::Export { window, format, .. } => {
                assert_eq!(window.bins, Some(10));
                assert_eq!(window.begin, Some(-5));
                assert_eq!(window.locations, Some(vec!["a".to_string(), "b".to_string()]));
                assert_eq!(format.as_deref(), Some("csv"));
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn zero_bins_rejected_at_parse_time() {
        assert!(Cli::try_parse_from(["util-lens", "histogram", "t.json", "--bins", "0"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
