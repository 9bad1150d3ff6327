use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rainyday::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rainyday")]
#[command(about = "Dollar-cost averaging backtester with rainy-day reserve buys", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a simulation
    Run {
        //path to csv price file (date,close)
        #[arg(long)]
        data: PathBuf,

        //optional fx csv (date,close) to convert prices into another currency
        #[arg(long)]
        fx: Option<PathBuf>,

        //json config file, defaults are used when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        //overrides
        //rainy-day threshold for the smoothed indicator
        #[arg(long)]
        threshold: Option<f64>,

        //base contribution per execution date
        #[arg(long)]
        base: Option<f64>,

        //extra rainy-day amount
        #[arg(long)]
        extra: Option<f64>,

        //reserve top-up per execution date
        #[arg(long)]
        topup: Option<f64>,

        //starting reserve balance
        #[arg(long)]
        starting_reserve: Option<f64>,

        //market calendar (nyse, xetra, weekdays)
        #[arg(long)]
        market: Option<String>,

        //execution days of month (eg 1,15)
        #[arg(long, value_delimiter = ',')]
        days: Option<Vec<u32>>,

        //first date (yyyy-mm-dd)
        #[arg(long)]
        start: Option<NaiveDate>,

        //last date (yyyy-mm-dd)
        #[arg(long)]
        end: Option<NaiveDate>,

        //resume-state json, read if present and rewritten after the run
        #[arg(long)]
        state: Option<PathBuf>,

        //output options
        //output path for equity curve csv
        #[arg(long)]
        output_equity_csv: Option<PathBuf>,

        //output path for rainy-day events csv
        #[arg(long)]
        output_events_csv: Option<PathBuf>,

        //output path for per-date execution records csv
        #[arg(long)]
        output_records_csv: Option<PathBuf>,

        //output path for the full report as json
        #[arg(long)]
        output_json: Option<PathBuf>,
    },
    //write the default configuration to a json file
    InitConfig {
        path: PathBuf,
    },
}

struct RunArgs {
    data: PathBuf,
    fx: Option<PathBuf>,
    config: Option<PathBuf>,
    overrides: Overrides,
    state: Option<PathBuf>,
    output_equity_csv: Option<PathBuf>,
    output_events_csv: Option<PathBuf>,
    output_records_csv: Option<PathBuf>,
    output_json: Option<PathBuf>,
}

struct Overrides {
    threshold: Option<f64>,
    base: Option<f64>,
    extra: Option<f64>,
    topup: Option<f64>,
    starting_reserve: Option<f64>,
    market: Option<String>,
    days: Option<Vec<u32>>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            fx,
            config,
            threshold,
            base,
            extra,
            topup,
            starting_reserve,
            market,
            days,
            start,
            end,
            state,
            output_equity_csv,
            output_events_csv,
            output_records_csv,
            output_json,
        } => {
            run_simulation(RunArgs {
                data,
                fx,
                config,
                overrides: Overrides {
                    threshold,
                    base,
                    extra,
                    topup,
                    starting_reserve,
                    market,
                    days,
                    start,
                    end,
                },
                state,
                output_equity_csv,
                output_events_csv,
                output_records_csv,
                output_json,
            })?;
        }
        Commands::InitConfig { path } => {
            SimulationParams::default()
                .to_json_file(&path)
                .context(format!("Failed to write config to {:?}", path))?;
            println!("Default configuration written to {:?}", path);
        }
    }

    Ok(())
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rainyday=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_simulation(args: RunArgs) -> Result<()> {
    println!("Rainy Day DCA Backtester");
    println!("========================\n");

    //load data
    let mut prices =
        load_csv(&args.data).context(format!("Failed to load data from {:?}", args.data))?;

    if let Some(fx_path) = &args.fx {
        let fx = load_csv(fx_path).context(format!("Failed to load fx rates from {:?}", fx_path))?;
        prices = prices.convert(&fx).context("Failed to convert prices")?;
        println!("Converted prices with fx rates from {:?}", fx_path);
    }

    let (first, last) = match (prices.first_date(), prices.last_date()) {
        (Some(first), Some(last)) => (first, last),
        _ => anyhow::bail!("No price data in {:?}", args.data),
    };
    println!("Loaded {} prices ({} to {})\n", prices.len(), first, last);

    //build config
    let mut params = match &args.config {
        Some(path) => SimulationParams::from_json_file(path)
            .context(format!("Failed to load config from {:?}", path))?,
        None => SimulationParams::default(),
    };
    apply_overrides(&mut params, args.overrides)?;

    //the range can't extend past the data
    if params.start < first {
        tracing::info!(configured = %params.start, data = %first, "start moved to first price date");
        params.start = first;
    }
    if params.end > last {
        tracing::info!(configured = %params.end, data = %last, "end moved to last price date");
        params.end = last;
    }

    let config = SimulationConfig::try_from(params).context("Invalid configuration")?;

    println!(
        "Market: {:?}, days {:?}, {} to {}",
        config.market(),
        config.execution_days_of_month(),
        config.start(),
        config.end()
    );
    println!(
        "Base: ${:.2}, extra: ${:.2}, top-up: ${:.2}, threshold: {:?}\n",
        config.base_amount(),
        config.extra_amount(),
        config.topup_amount(),
        config.threshold()
    );

    //resume state
    let resume = match &args.state {
        Some(path) if path.exists() => {
            let contents = std::fs::read_to_string(path)
                .context(format!("Failed to read state from {:?}", path))?;
            let resume: ResumeState = serde_json::from_str(&contents)
                .context(format!("Failed to parse state in {:?}", path))?;
            println!("Resuming with reserve ${:.2}\n", resume.reserve_balance);
            Some(resume)
        }
        _ => None,
    };

    //run
    let simulation = Simulation::new(config);
    let report = simulation.run(&prices, resume)?;

    //display results
    println!("Simulation Results");
    println!("==================\n");
    report.summary.pretty_print_table();

    //save outputs if requested
    if let Some(path) = &args.state {
        let json = serde_json::to_string_pretty(&report.resume)?;
        std::fs::write(path, json).context(format!("Failed to write state to {:?}", path))?;
        println!("\nState saved to {:?}", path);
    }

    if let Some(path) = &args.output_equity_csv {
        save_csv(&report.equity_curve, path)?;
        println!("Equity curve saved to {:?}", path);
    }

    if let Some(path) = &args.output_events_csv {
        save_csv(&report.deployments, path)?;
        println!("Rainy-day events saved to {:?}", path);
    }

    if let Some(path) = &args.output_records_csv {
        save_csv(&report.records, path)?;
        println!("Execution records saved to {:?}", path);
    }

    if let Some(path) = &args.output_json {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).context(format!("Failed to write report to {:?}", path))?;
        println!("Report saved to {:?}", path);
    }

    Ok(())
}

fn apply_overrides(params: &mut SimulationParams, overrides: Overrides) -> Result<()> {
    if let Some(threshold) = overrides.threshold {
        params.indicator_threshold = threshold;
    }
    if let Some(base) = overrides.base {
        params.base_amount = base;
    }
    if let Some(extra) = overrides.extra {
        params.extra_amount = extra;
    }
    if let Some(topup) = overrides.topup {
        params.topup_amount = topup;
    }
    if let Some(reserve) = overrides.starting_reserve {
        params.starting_reserve = reserve;
    }
    if let Some(name) = overrides.market {
        params.market =
            Market::parse(&name).ok_or_else(|| anyhow::anyhow!("Unknown market: {}", name))?;
    }
    if let Some(days) = overrides.days {
        params.execution_days_of_month = days.into_iter().collect();
    }
    if let Some(start) = overrides.start {
        params.start = start;
    }
    if let Some(end) = overrides.end {
        params.end = end;
    }
    Ok(())
}

fn save_csv<T: Serialize>(rows: &[T], path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).context(format!("Failed to create {:?}", path))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
