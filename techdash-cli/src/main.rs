//! TechDash CLI — annotate, chart, dashboard and config commands.
//!
//! Commands:
//! - `annotate` — compute the indicator columns for one symbol, print or export them
//! - `chart` — emit the three-panel figure JSON for one symbol
//! - `dashboard` — build the whole session, print its summary, optionally emit a selection
//! - `config init` — write the default TOML configuration

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use techdash_chart::{assemble, Dashboard, DashboardConfig, Figure};
use techdash_core::data::{load_canonical, write_csv, write_parquet, SeriesSource, SourceKind};
use techdash_core::{annotate_with, AnnotatedSeries};

#[derive(Parser)]
#[command(
    name = "techdash",
    about = "TechDash CLI — technical indicators dashboard back end"
)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Parquet,
    Synthetic,
}

impl From<Format> for SourceKind {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => SourceKind::Csv,
            Format::Parquet => SourceKind::Parquet,
            Format::Synthetic => SourceKind::Synthetic,
        }
    }
}

/// Options shared by every command that reads price data.
#[derive(clap::Args)]
struct SourceArgs {
    /// Path to a TOML config file. Defaults are used without one.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Data directory (overrides the config).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Input format (overrides the config).
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Shorthand for `--format synthetic`.
    #[arg(long, default_value_t = false)]
    synthetic: bool,
}

impl SourceArgs {
    fn load_config(&self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => DashboardConfig::default(),
        };
        if let Some(dir) = &self.data_dir {
            config.data.dir = dir.clone();
        }
        if let Some(format) = self.format {
            config.data.format = format.into();
        }
        if self.synthetic {
            config.data.format = SourceKind::Synthetic;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compute indicator columns for one symbol.
    Annotate {
        /// Symbol to annotate (e.g., AAPL).
        symbol: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Export the annotated table (.csv or .parquet). Prints the tail without it.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Rows to print when not exporting.
        #[arg(long, default_value_t = 10)]
        tail: usize,
    },
    /// Emit the figure JSON for one symbol.
    Chart {
        /// Symbol to chart.
        symbol: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Trailing dates visible initially (overrides the config).
        #[arg(long)]
        last_n: Option<usize>,

        /// Output file. Prints to stdout without it.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Build the dashboard session and print its summary.
    Dashboard {
        #[command(flatten)]
        source: SourceArgs,

        /// Tab to select (defaults to the first tab). Prints the figure without `--out`.
        #[arg(long)]
        tab: Option<String>,

        /// Ticker to select (defaults to the tab's first ticker). Prints the figure without `--out`.
        #[arg(long)]
        ticker: Option<String>,

        /// Write the selected figure JSON here.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Configuration file commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration as TOML.
    Init {
        /// Destination file.
        #[arg(long, default_value = "techdash.toml")]
        out: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Annotate {
            symbol,
            source,
            out,
            tail,
        } => run_annotate(&symbol, &source, out.as_deref(), tail),
        Commands::Chart {
            symbol,
            source,
            last_n,
            out,
        } => run_chart(&symbol, &source, last_n, out.as_deref()),
        Commands::Dashboard {
            source,
            tab,
            ticker,
            out,
        } => run_dashboard(&source, tab.as_deref(), ticker.as_deref(), out.as_deref()),
        Commands::Config { action } => match action {
            ConfigAction::Init { out, force } => run_config_init(&out, force),
        },
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn open_source(config: &DashboardConfig, symbols: &[&str]) -> Box<dyn SeriesSource> {
    let source = config.data.open(symbols);
    info!(source = source.name(), dir = %config.data.dir.display(), "opened data source");
    source
}

fn load_annotated(config: &DashboardConfig, symbol: &str) -> Result<AnnotatedSeries> {
    let source = open_source(config, &[symbol]);
    let series = load_canonical(source.as_ref(), symbol)
        .with_context(|| format!("loading {symbol} from {}", source.name()))?;
    annotate_with(&series, &config.indicators).with_context(|| format!("annotating {symbol}"))
}

fn run_annotate(symbol: &str, source: &SourceArgs, out: Option<&Path>, tail: usize) -> Result<()> {
    let config = source.load_config()?;
    let annotated = load_annotated(&config, symbol)?;

    match out {
        Some(path) => {
            match path.extension().and_then(|e| e.to_str()) {
                Some("csv") => write_csv(annotated.series(), path)?,
                Some("parquet") => write_parquet(annotated.series(), path)?,
                _ => bail!("--out must end in .csv or .parquet: {}", path.display()),
            }
            println!(
                "Wrote {} rows × {} columns to {}",
                annotated.len(),
                annotated.series().columns().len() + 1,
                path.display()
            );
        }
        None => print_tail(&annotated, tail),
    }
    Ok(())
}

fn print_tail(annotated: &AnnotatedSeries, tail: usize) {
    let mut header = format!("{:<10} {:>10}", "Date", "Close");
    let shown: Vec<&str> = annotated
        .indicator_names()
        .iter()
        .map(|s| s.as_str())
        .collect();
    for name in &shown {
        header.push_str(&format!(" {name:>10}"));
    }
    println!("{}  ({} rows, warmup {})", annotated.symbol(), annotated.len(), annotated.warmup());
    println!("{header}");
    println!("{}", "-".repeat(header.len()));

    let close = annotated.column(techdash_core::domain::CLOSE).unwrap_or_default();
    let start = annotated.len().saturating_sub(tail);
    for i in start..annotated.len() {
        let mut line = format!("{:<10} {:>10}", annotated.dates()[i], cell(close.get(i).copied()));
        for name in &shown {
            let value = annotated.column(name).and_then(|c| c.get(i).copied());
            line.push_str(&format!(" {:>10}", cell(value)));
        }
        println!("{line}");
    }
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format!("{v:.2}"),
        _ => "-".into(),
    }
}

fn run_chart(symbol: &str, source: &SourceArgs, last_n: Option<usize>, out: Option<&Path>) -> Result<()> {
    let mut config = source.load_config()?;
    if let Some(n) = last_n {
        config.chart.last_n = n;
    }
    let annotated = load_annotated(&config, symbol)?;
    let figure = assemble(&annotated, &config.chart, &config.style)?;
    info!(
        symbol,
        panels = figure.panels.len(),
        visible = config.chart.last_n,
        "assembled figure"
    );
    emit_figure(&figure, out)
}

fn run_dashboard(
    source: &SourceArgs,
    tab: Option<&str>,
    ticker: Option<&str>,
    out: Option<&Path>,
) -> Result<()> {
    let config = source.load_config()?;
    let tickers = config.universe.all_tickers();
    let data = open_source(&config, &tickers);
    let dashboard = Dashboard::build(&config, data.as_ref())?;

    println!("{}", config.title);
    println!();
    println!(
        "{:<8} {:>6} {:<12} {:<12} {:<28} {:<16}",
        "Ticker", "Rows", "First", "Last", "Panels", "Fingerprint"
    );
    println!("{}", "-".repeat(88));
    for row in dashboard.summary() {
        let panels: Vec<String> = row.panels.iter().map(|p| p.to_string()).collect();
        println!(
            "{:<8} {:>6} {:<12} {:<12} {:<28} {:<16}",
            row.symbol,
            row.rows,
            row.first_date.map(|d| d.to_string()).unwrap_or_default(),
            row.last_date.map(|d| d.to_string()).unwrap_or_default(),
            panels.join(","),
            &row.fingerprint[..16.min(row.fingerprint.len())],
        );
    }
    for skipped in dashboard.skipped() {
        println!("{:<8} skipped: {}", skipped.symbol, skipped.reason);
    }

    if !selection_requested(tab, ticker, out) {
        return Ok(());
    }
    let tab_id = match tab {
        Some(id) => id.to_string(),
        None => match config.universe.tabs.first() {
            Some(first) => first.id.clone(),
            None => bail!("the universe has no tabs"),
        },
    };
    let selection = ticker.or_else(|| dashboard.default_selection(&tab_id));
    let figure = dashboard.select(&tab_id, selection);
    emit_figure(&figure, out)
}

/// A figure is emitted when the user picked a tab or ticker, or asked for a file.
fn selection_requested(tab: Option<&str>, ticker: Option<&str>, out: Option<&Path>) -> bool {
    tab.is_some() || ticker.is_some() || out.is_some()
}

fn emit_figure(figure: &Figure, out: Option<&Path>) -> Result<()> {
    let json = figure.to_json_pretty().context("serializing figure")?;
    match out {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            println!("Figure written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn run_config_init(out: &Path, force: bool) -> Result<()> {
    if out.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", out.display());
    }
    DashboardConfig::default().write_to(out)?;
    println!("Default configuration written to {}", out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard_args(args: &[&str]) -> (Option<String>, Option<String>, Option<PathBuf>) {
        let argv = ["techdash", "dashboard"].iter().chain(args).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Dashboard {
                tab, ticker, out, ..
            } => (tab, ticker, out),
            _ => panic!("expected the dashboard command"),
        }
    }

    fn requested(args: &[&str]) -> bool {
        let (tab, ticker, out) = dashboard_args(args);
        selection_requested(tab.as_deref(), ticker.as_deref(), out.as_deref())
    }

    #[test]
    fn tab_or_ticker_alone_emits_figure() {
        assert!(requested(&["--tab", "metals"]));
        assert!(requested(&["--ticker", "GLD"]));
        assert!(requested(&["--out", "fig.json"]));
    }

    #[test]
    fn bare_dashboard_prints_summary_only() {
        assert!(!requested(&[]));
        assert!(!requested(&["--synthetic"]));
    }
}
