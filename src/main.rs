use anyhow::Result;
use clap::{Parser, Subcommand};
use ftscraper::{
    config::{Config, OutputFormat, DEFAULT_CONFIG_PATH},
    export::{month_counts, read_csv},
    fetch, pipeline,
};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ftscraper", version, about = "Customs FTS downloader and commodity extractor")]
struct Cli {
    /// YAML config file; built-in defaults apply when it is absent
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download the workbooks linked from the FTS page
    Fetch {
        /// Download again even if the history lists the file
        #[arg(long)]
        force: bool,
    },
    /// Filter, label and concatenate the monthly workbooks
    Merge {
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Row counts per month of a merged CSV
    Summary { path: Option<PathBuf> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = Config::load(&cli.config)?;

    match cli.command {
        Command::Fetch { force } => {
            cfg.fetch.force |= force;
            let report = fetch::run_fetch(&cfg.fetch).await?;
            info!(
                found = report.found,
                downloaded = report.downloaded.len(),
                skipped = report.skipped.len(),
                "done"
            );
        }
        Command::Merge { output, format } => {
            if let Some(output) = output {
                cfg.merge.output = output;
            }
            if let Some(format) = format {
                cfg.merge.format = format;
            }
            let merge_cfg = cfg.merge.clone();
            let report = tokio::task::spawn_blocking(move || pipeline::run_merge(&merge_cfg)).await??;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Summary { path } => {
            let path = path.unwrap_or(cfg.merge.output);
            let table = read_csv(&path)?;
            let months: Vec<serde_json::Value> = month_counts(&table, &cfg.merge.month_column)?
                .into_iter()
                .map(|(month, rows)| json!({ "month": month, "rows": rows }))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "path": path,
                    "rows": table.height(),
                    "months": months,
                }))?
            );
        }
    }
    Ok(())
}
