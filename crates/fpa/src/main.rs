mod history;
mod input;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use fpa_core::classifier::{self, QuerySide};
use fpa_core::config::{Config, CONFIG_FILE_NAME};
use fpa_core::pipeline::{self, EstimationPipeline};
use fpa_core::trend::TrendMetric;
use fpa_core::types::ComponentKind;

use fpa_report::{json, markdown, text};

#[derive(Parser)]
#[command(name = "fpa")]
#[command(about = "Function point estimates, trends, and forecasts")]
#[command(version)]
struct Cli {
    /// Log engine decisions to stderr (overridden by FPA_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single component
    Classify {
        /// Component kind: ilf, eif, ei, eo, eq (or the long names)
        kind: ComponentKind,
        /// Record groups (ILF/EIF) or file references (EI/EO/EQ)
        #[arg(allow_negative_numbers = true)]
        references: i64,
        /// Data elements
        #[arg(allow_negative_numbers = true)]
        data_elements: i64,
        /// Output-side file references of a dual-perspective query
        #[arg(long, requires = "output_data_elements", allow_negative_numbers = true)]
        output_references: Option<i64>,
        /// Output-side data elements of a dual-perspective query
        #[arg(long, requires = "output_references", allow_negative_numbers = true)]
        output_data_elements: Option<i64>,
        /// Config file path (defaults to .fpa.toml in the current directory or above)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Estimate a project from its component counts and influence factors
    Estimate {
        /// Estimate file (.toml or .json)
        file: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// Single-line JSON output
        #[arg(long)]
        compact: bool,
        /// Append the result to .fpa/history.ndjson
        #[arg(long)]
        save: bool,
    },
    /// Estimate and exit with code 0 (within budget) or 1 (over budget)
    Check {
        file: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Maximum effort in hours (overrides [check] in config)
        #[arg(long)]
        max_effort_hours: Option<f64>,
        /// Maximum adjusted function points (overrides [check] in config)
        #[arg(long)]
        max_adjusted_fp: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Analyze the trend of saved estimates and forecast the next values
    Trend {
        /// History file (defaults to .fpa/history.ndjson)
        history: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// unadjusted-fp, adjusted-fp, effort-hours or value-adjustment-factor
        #[arg(short, long)]
        metric: Option<TrendMetric>,
        /// Number of forecast periods
        #[arg(short, long)]
        periods: Option<u32>,
        /// Z-score above which a value is an anomaly
        #[arg(long)]
        threshold: Option<f64>,
        /// Only use records of this project
        #[arg(long)]
        project: Option<String>,
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
        #[arg(long)]
        compact: bool,
    },
    /// Print the complexity and function point tables
    Tables,
    /// Create a default .fpa.toml configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Classify {
            kind,
            references,
            data_elements,
            output_references,
            output_data_elements,
            config,
            json,
        } => {
            let output_side = output_references
                .zip(output_data_elements)
                .map(|(file_references, data_elements)| QuerySide {
                    file_references,
                    data_elements,
                });
            cmd_classify(
                kind,
                references,
                data_elements,
                output_side,
                config.as_deref(),
                json,
            )
        }
        Commands::Estimate {
            file,
            config,
            format,
            compact,
            save,
        } => cmd_estimate(&file, config.as_deref(), format, compact, save),
        Commands::Check {
            file,
            config,
            max_effort_hours,
            max_adjusted_fp,
            json,
        } => cmd_check(
            &file,
            config.as_deref(),
            max_effort_hours,
            max_adjusted_fp,
            json,
        ),
        Commands::Trend {
            history,
            config,
            metric,
            periods,
            threshold,
            project,
            format,
            compact,
        } => cmd_trend(TrendArgs {
            history,
            config,
            metric,
            periods,
            threshold,
            project,
            format,
            compact,
        }),
        Commands::Tables => {
            print!("{}", text::format_tables());
            Ok(())
        }
        Commands::Init { force } => cmd_init(force),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(2);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("FPA_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(p) => Config::load(p),
        None => Ok(Config::load_or_default(Path::new("."))),
    }
}

fn cmd_classify(
    kind: ComponentKind,
    references: i64,
    data_elements: i64,
    output_side: Option<QuerySide>,
    config_path: Option<&Path>,
    as_json: bool,
) -> Result<()> {
    let classification = match output_side {
        Some(output) => {
            if kind != ComponentKind::ExternalQuery {
                anyhow::bail!("output-side counts are only allowed for external queries");
            }
            let config = load_config(config_path)?;
            classifier::classify_dual_query(
                QuerySide {
                    file_references: references,
                    data_elements,
                },
                output,
                config.classifier.dual_query_strategy,
            )?
        }
        None => classifier::classify(kind, references, data_elements)?,
    };

    if as_json {
        let value = serde_json::json!({
            "kind": kind,
            "level": classification.level,
            "function_points": classification.function_points,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!(
            "{} ({}): {} complexity, {} function points",
            kind,
            kind.abbreviation(),
            classification.level,
            classification.function_points
        );
    }
    Ok(())
}

fn cmd_estimate(
    file: &Path,
    config_path: Option<&Path>,
    format: OutputFormat,
    compact: bool,
    save: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let input = input::load_input(file)?;
    let report = EstimationPipeline::new(config).estimate(&input)?;

    let output = match format {
        OutputFormat::Text => text::format_estimate(&report),
        OutputFormat::Json => json::format_estimate(&report, compact)? + "\n",
        OutputFormat::Markdown => markdown::format_estimate(&report),
    };
    print!("{output}");

    if save {
        let path = history::save_record(Path::new("."), &report.record(Utc::now()))?;
        eprintln!("Estimate saved to {}", path.display());
    }
    Ok(())
}

fn cmd_check(
    file: &Path,
    config_path: Option<&Path>,
    max_effort_hours: Option<f64>,
    max_adjusted_fp: Option<f64>,
    as_json: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if max_effort_hours.is_some() {
        config.check.max_effort_hours = max_effort_hours;
    }
    if max_adjusted_fp.is_some() {
        config.check.max_adjusted_fp = max_adjusted_fp;
    }

    let input = input::load_input(file)?;
    let pipeline = EstimationPipeline::new(config);
    let report = pipeline.estimate(&input)?;
    let check = pipeline::check_budget(&report, &pipeline.config().check)
        .context("invalid budget")?;

    let (output, passed) = if as_json {
        let (json, passed) = json::format_check(&report, &check, false)?;
        (json + "\n", passed)
    } else {
        text::format_check(&report, &check)
    };
    print!("{output}");

    if !passed {
        process::exit(1);
    }
    Ok(())
}

struct TrendArgs {
    history: Option<PathBuf>,
    config: Option<PathBuf>,
    metric: Option<TrendMetric>,
    periods: Option<u32>,
    threshold: Option<f64>,
    project: Option<String>,
    format: OutputFormat,
    compact: bool,
}

fn cmd_trend(args: TrendArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(threshold) = args.threshold {
        config.trend.anomaly_threshold = threshold;
    }

    let path = args
        .history
        .unwrap_or_else(|| history::history_path(Path::new(".")));
    let records = history::load_records(&path)?;
    let records = history::filter_project(records, args.project.as_deref());

    let report = EstimationPipeline::new(config)
        .trend(&records, args.metric, args.periods)
        .with_context(|| format!("failed to analyze history in {}", path.display()))?;

    let output = match args.format {
        OutputFormat::Text => text::format_trend(&report),
        OutputFormat::Json => json::format_trend(&report, args.compact)? + "\n",
        OutputFormat::Markdown => markdown::format_trend(&report),
    };
    print!("{output}");
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let target = PathBuf::from(CONFIG_FILE_NAME);
    if target.exists() && !force {
        anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
    }
    std::fs::write(&target, Config::default_toml())?;
    println!("Created {CONFIG_FILE_NAME} with default configuration.");
    Ok(())
}
