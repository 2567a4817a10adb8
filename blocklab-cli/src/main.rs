//! BlockLab CLI: inspect the block catalog, draft, validate and save strategies.
//!
//! Commands:
//! - `catalog`: list block templates and their default parameters
//! - `new`: write a draft strategy document from template ids
//! - `validate`: print validation findings (exit status 1 if any)
//! - `save`: validate and submit to the strategy service or a directory
//! - `backtest`: run the SMA/RSI rules over a local bar file

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use blocklab_core::backtest::{self, bars, BacktestParams, BacktestReport};
use blocklab_core::catalog::Catalog;
use blocklab_core::config::BuilderConfig;
use blocklab_core::document::StrategyDocument;
use blocklab_core::domain::{BlockKind, BlockTemplate, ValidationFinding};
use blocklab_core::gateway::{HttpGateway, JsonFileGateway, PersistenceGateway};
use blocklab_core::logging;
use blocklab_core::save_gate::{SaveError, SaveGate, SaveNotice};

#[derive(Parser)]
#[command(
    name = "blocklab",
    about = "BlockLab CLI: compose and validate block-based trading strategies"
)]
struct Cli {
    /// Config file. Defaults to <config dir>/blocklab/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List block templates.
    Catalog {
        /// Only show one kind: indicator, condition or action.
        #[arg(long)]
        kind: Option<String>,
    },
    /// Write a draft strategy document built from catalog template ids.
    New {
        /// Output JSON file.
        file: PathBuf,

        /// Strategy name. Defaults to the configured default name.
        #[arg(long)]
        name: Option<String>,

        /// Comma-separated template ids, in order (e.g. sma,ema,cross_above,buy).
        #[arg(long, value_delimiter = ',')]
        blocks: Vec<String>,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Validate a strategy document and print its findings.
    Validate {
        file: PathBuf,
    },
    /// Validate a strategy document and submit it.
    Save {
        file: PathBuf,

        /// Name to save under. Defaults to the name in the document.
        #[arg(long)]
        name: Option<String>,

        /// Strategy service base URL (overrides config and BLOCKLAB_API_URL).
        #[arg(long)]
        api_url: Option<String>,

        /// Write to this directory instead of calling the service.
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Backtest a strategy document against a local CSV of daily bars.
    Backtest {
        file: PathBuf,

        /// Bar file with at least `date` and `close` columns.
        #[arg(long)]
        bars: PathBuf,

        #[command(flatten)]
        overrides: ParamOverrides,

        /// Print the full report, trades included, as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

/// Values that take precedence over those read from the strategy blocks.
#[derive(Args, Debug, Default)]
struct ParamOverrides {
    #[arg(long)]
    ma_window: Option<usize>,
    #[arg(long)]
    rsi_window: Option<usize>,
    #[arg(long)]
    overbought: Option<f64>,
    #[arg(long)]
    oversold: Option<f64>,
}

impl ParamOverrides {
    fn apply(&self, params: &mut BacktestParams) {
        if let Some(n) = self.ma_window {
            params.ma_window = n;
        }
        if let Some(n) = self.rsi_window {
            params.rsi_window = n;
        }
        if let Some(v) = self.overbought {
            params.rsi_overbought = v;
        }
        if let Some(v) = self.oversold {
            params.rsi_oversold = v;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = BuilderConfig::resolve(cli.config.as_deref()).context("loading configuration")?;
    logging::init_stderr(&config.log_level);
    debug!(?config, "configuration resolved");

    match cli.command {
        Commands::Catalog { kind } => run_catalog(kind.as_deref()),
        Commands::New {
            file,
            name,
            blocks,
            force,
        } => {
            let name = name.unwrap_or_else(|| config.default_strategy_name.clone());
            run_new(&file, &name, &blocks, force)
        }
        Commands::Validate { file } => {
            if run_validate(&file)? > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Save {
            file,
            name,
            api_url,
            out_dir,
        } => {
            let mut config = config;
            if let Some(url) = api_url {
                config.api_base_url = url;
            }
            run_save(&config, &file, name.as_deref(), out_dir)
        }
        Commands::Backtest {
            file,
            bars,
            overrides,
            json,
        } => {
            let report = run_backtest(&file, &bars, &overrides)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            Ok(())
        }
    }
}

fn run_catalog(kind: Option<&str>) -> Result<()> {
    let catalog = Catalog::standard();
    let filter = kind
        .map(|k| k.parse::<BlockKind>().map_err(|e| anyhow!(e)))
        .transpose()?;

    println!("{:<14} {:<10} {:<28} Parameters", "Id", "Kind", "Name");
    println!("{}", "-".repeat(72));
    for template in catalog.templates() {
        if filter.is_some_and(|k| k != template.kind) {
            continue;
        }
        println!("{}", catalog_row(template));
    }
    Ok(())
}

fn catalog_row(template: &BlockTemplate) -> String {
    let params = template
        .default_parameters
        .iter()
        .map(|(k, v)| {
            if v.is_present() {
                format!("{k}={v}")
            } else {
                k.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{:<14} {:<10} {:<28} {}",
        template.id.as_str(),
        template.kind.label(),
        template.display_name,
        params
    )
}

fn run_new(file: &Path, name: &str, blocks: &[String], force: bool) -> Result<()> {
    if file.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", file.display());
    }
    let name = name.trim();
    if name.is_empty() {
        bail!("strategy name must not be empty");
    }

    let ids: Vec<&str> = blocks
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    let document = StrategyDocument::from_templates(name, &Catalog::standard(), &ids)?;
    document.save(file)?;

    let findings = document.to_sequence()?.findings().len();
    println!(
        "Wrote '{}' with {} block(s) to {} ({findings} finding(s))",
        document.name,
        document.blocks.len(),
        file.display()
    );
    Ok(())
}

/// Print findings and return how many there were.
fn run_validate(file: &Path) -> Result<usize> {
    let document = StrategyDocument::load(file)?;
    let sequence = document.to_sequence()?;
    let findings = sequence.findings();

    if findings.is_empty() {
        println!("'{}' is valid ({} block(s))", document.name, sequence.len());
    } else {
        print_findings(findings);
    }
    Ok(findings.len())
}

fn run_save(
    config: &BuilderConfig,
    file: &Path,
    name: Option<&str>,
    out_dir: Option<PathBuf>,
) -> Result<()> {
    let document = StrategyDocument::load(file)?;
    let sequence = document.to_sequence()?;
    let name = name.unwrap_or(&document.name);

    let gateway: Box<dyn PersistenceGateway> = match out_dir {
        Some(dir) => Box::new(JsonFileGateway::new(dir)),
        None => Box::new(HttpGateway::from_config(config)?),
    };
    debug!(gateway = gateway.name(), "saving");

    let mut gate = SaveGate::new();
    match gate.save_with(gateway.as_ref(), name, &sequence) {
        Ok(notice @ SaveNotice::Saved { .. }) => {
            println!("{}", notice.message());
            Ok(())
        }
        Ok(notice @ SaveNotice::Failed { .. }) => bail!(notice.message()),
        Err(SaveError::ValidationFailed(findings)) => {
            print_findings(&findings);
            bail!("not saved: resolve the findings above first")
        }
        Err(e) => Err(e.into()),
    }
}

/// Backtest a document. Findings are reported but do not stop the run.
fn run_backtest(file: &Path, bars_path: &Path, overrides: &ParamOverrides) -> Result<BacktestReport> {
    let document = StrategyDocument::load(file)?;
    let findings = document.to_sequence()?.findings().len();
    if findings > 0 {
        eprintln!("warning: '{}' has {findings} unresolved finding(s)", document.name);
    }

    let mut params = BacktestParams::from_blocks(&document.blocks);
    overrides.apply(&mut params);
    let series = bars::load_csv(bars_path)?;
    debug!(?params, bars = series.len(), "backtesting");
    Ok(backtest::run(&series, &params)?)
}

fn print_report(report: &BacktestReport) {
    let p = &report.params;
    let m = &report.metrics;
    println!("=== Backtest Result ===");
    println!("Bars:           {}", report.bar_count);
    println!("MA window:      {}", p.ma_window);
    println!("RSI window:     {}", p.rsi_window);
    println!("RSI bands:      {} / {}", p.rsi_oversold, p.rsi_overbought);
    println!("Trades:         {}", report.trades.len());
    println!();
    println!("--- Performance ---");
    println!("Total Return:   {:.2}%", m.total_return * 100.0);
    println!("Sharpe:         {:.3}", m.sharpe_ratio);
    println!("Max Drawdown:   {:.2}%", m.max_drawdown * 100.0);
    println!("Win Rate:       {:.1}%", m.win_rate * 100.0);
}

fn print_findings(findings: &[ValidationFinding]) {
    eprintln!("{} finding(s):", findings.len());
    for finding in findings {
        eprintln!("  {finding}");
    }
}
