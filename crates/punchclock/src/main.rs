use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use comfy_table::Table;
use tracing::info;
use tracing_subscriber::EnvFilter;

use punchclock_core::{run_pipeline, CategoryPolicy, RunSummary, Workbook};
use punchclock_parser::RawGrid;

/// Reconcile factory and office time logs into a monthly attendance workbook
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Target year (4-digit)
    #[arg(long)]
    year: i32,

    /// Target month
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: u32,

    /// Factory gate export (CSV)
    #[arg(long)]
    factory: Option<PathBuf>,

    /// Office attendance sheet (CSV)
    #[arg(long)]
    office: Option<PathBuf>,

    /// Report template workbook
    #[arg(long, default_value = "template.json")]
    template: PathBuf,

    /// Director policy file (TOML)
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if cli.factory.is_none() && cli.office.is_none() {
        bail!("at least one of --factory / --office must be supplied");
    }

    let factory = load_grid("FACTORY", cli.factory.as_deref())?;
    let office = load_grid("OFFICE", cli.office.as_deref())?;

    let policy = match &cli.policy {
        Some(path) => CategoryPolicy::load(path)
            .with_context(|| format!("loading policy file {}", path.display()))?,
        None => CategoryPolicy::default(),
    };

    let out_path = cli
        .out_dir
        .join(format!("attendance_{}_{}.json", cli.year, cli.month));
    let mut workbook = if out_path.exists() {
        info!(path = %out_path.display(), "updating existing workbook in place");
        Workbook::load(&out_path)
            .with_context(|| format!("loading workbook {}", out_path.display()))?
    } else {
        info!(template = %cli.template.display(), "creating workbook from template");
        Workbook::load(&cli.template)
            .with_context(|| format!("loading template {}", cli.template.display()))?
    };

    let summary = run_pipeline(
        &mut workbook,
        factory.as_ref(),
        office.as_ref(),
        &policy,
        cli.year,
        cli.month,
    )?;
    workbook.save(&out_path)?;

    print_summary(&summary, &out_path);
    Ok(())
}

fn load_grid(parser: &'static str, path: Option<&Path>) -> Result<Option<RawGrid>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(Some(RawGrid::from_csv_str(parser, &content)?))
}

fn print_summary(summary: &RunSummary, out_path: &Path) {
    let mut table = Table::new();
    table.set_header(vec!["Metric".to_string(), "Value".to_string()]);
    table.add_row(vec![
        "Factory records".to_string(),
        summary.factory_records.to_string(),
    ]);
    table.add_row(vec![
        "Office records".to_string(),
        summary.office_records.to_string(),
    ]);
    table.add_row(vec![
        "Merged person-days".to_string(),
        summary.merged_records.to_string(),
    ]);
    table.add_row(vec!["Projected".to_string(), summary.projected.to_string()]);
    table.add_row(vec![
        "Skipped (no grid position)".to_string(),
        summary.skipped.to_string(),
    ]);
    table.add_row(vec![
        "Report sheet".to_string(),
        summary.report_sheet.clone(),
    ]);
    println!("{table}");

    for error in &summary.source_errors {
        eprintln!("source error: {error}");
    }
    println!("workbook written to {}", out_path.display());
}
