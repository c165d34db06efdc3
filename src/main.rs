use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

use riskgen::config::GeneratorConfig;
use riskgen::export::ExportFormat;
use riskgen::generate::deploys::DayRates;
use riskgen::generate::sampling::rng_from_seed;
use riskgen::summary::{format_summary, DatasetSummary};
use riskgen::timeline::parse_timestamp;

#[derive(Parser)]
#[command(
    name = "riskgen",
    about = "Synthetic match, deploy and incident datasets for deployment-risk modeling",
    version,
    long_about = None
)]
struct Cli {
    /// Config file (TOML). Defaults to $RISKGEN_CONFIG, then ./riskgen.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct RangeArgs {
    /// First hour of the range, e.g. 2024-01-01 or "2024-01-01 08:00"
    #[arg(long, value_parser = parse_ts)]
    start: NaiveDateTime,

    /// Last hour of the range (inclusive)
    #[arg(long, value_parser = parse_ts)]
    end: NaiveDateTime,

    /// RNG seed; overrides the config file. Unseeded runs differ every time
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate match, deploy and incident tables and write them to disk
    Generate {
        #[command(flatten)]
        range: RangeArgs,

        /// Output directory
        #[arg(long, default_value = "data")]
        out_dir: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        /// Print a dataset summary after writing
        #[arg(long)]
        summary: bool,
    },

    /// Generate a dataset in memory and print its summary only
    Summary {
        #[command(flatten)]
        range: RangeArgs,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Show the hourly deploy rate table
    Rates,

    /// Show the tournament traffic windows
    Windows,

    /// Print the effective configuration as TOML
    Config,
}

fn parse_ts(s: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(s).map_err(|e| e.to_string())
}

fn load_config(path: Option<&PathBuf>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::load(path),
        None => Ok(GeneratorConfig::load_or_default()),
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_day_rates(label: &str, rates: &DayRates) {
    println!("{:<10} | baseline {:.2}", label, rates.baseline);
    for band in &rates.bands {
        println!(
            "{:<10} | {:02}:00-{:02}:00 {:.2}",
            "", band.start_hour, band.end_hour, band.rate
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Generate {
            range,
            out_dir,
            format,
            summary,
        } => {
            config.seed = range.seed.or(config.seed);
            tracing::info!(start = %range.start, end = %range.end, seed = ?config.seed, "Generating dataset");
            let mut rng = rng_from_seed(config.seed);
            let dataset = riskgen::generate_dataset(&config, range.start, range.end, &mut rng);

            let paths = riskgen::export::write_dataset(&dataset, &out_dir, format)
                .with_context(|| format!("failed to export dataset to {}", out_dir.display()))?;
            for path in &paths {
                println!("{}", path.display());
            }
            if summary {
                println!();
                print!("{}", format_summary(&DatasetSummary::from_dataset(&dataset)));
            }
        }
        Commands::Summary { range, json } => {
            config.seed = range.seed.or(config.seed);
            let mut rng = rng_from_seed(config.seed);
            let dataset = riskgen::generate_dataset(&config, range.start, range.end, &mut rng);
            let summary = DatasetSummary::from_dataset(&dataset);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", format_summary(&summary));
            }
        }
        Commands::Rates => {
            let rates = &config.deploys.rates;
            println!("\nDeploy rate table (expected deploys per hour)");
            println!("{:-<10}-|-{:-<30}", "", "");
            print_day_rates("Mon-Thu", &rates.mon_thu);
            print_day_rates("Friday", &rates.friday);
            print_day_rates("Sat-Sun", &rates.weekend);
            println!();
        }
        Commands::Windows => {
            println!(
                "{:<20} | {:<16} | {:<11} | {:<5} | Prob",
                "Tournament", "Days", "Hours", "Base"
            );
            println!("{:-<20}-|-{:-<16}-|-{:-<11}-|-{:-<5}-|-{:-<5}", "", "", "", "", "");
            for w in &config.matches.windows {
                let days: Vec<String> = w.days.iter().map(|d| d.to_string()).collect();
                println!(
                    "{:<20} | {:<16} | {:02}:00-{:02}:00 | {:<5.2} | {:.2}",
                    w.name,
                    days.join(","),
                    w.start_hour,
                    w.end_hour,
                    w.base_intensity,
                    w.probability
                );
            }
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
