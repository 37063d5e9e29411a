/*============================================================
  Synavera Project: Partinfo
  Module: partinfo_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for Partinfo Core. Fetches partition metadata
    from a CouchDB/Cloudant server, or decodes saved response
    bodies, and prints or persists a typed report.

  Security / Safety Notes:
    Operates within user privileges. Performs HTTP(S) GET
    requests only; credentials come from the config file.

  Dependencies:
    clap for CLI parsing, tokio for the async runtime.

  Operational Scope:
    Invoked by operators inspecting partition sizing and index
    headroom.

  Revision History:
    2026-10-19 COD  Authored Partinfo Core runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Parser};
use tokio::io::AsyncReadExt;

use partinfo_core::client::PartitionClient;
use partinfo_core::config::PartinfoConfig;
use partinfo_core::error::{PartinfoError, Result};
use partinfo_core::logger::Logger;
use partinfo_core::mapper::ResponseMapper;
use partinfo_core::partition_info::PartitionInfo;
use partinfo_core::report::{build_report, render_report, write_report, ReportDocument};

/// Command-line arguments for Partinfo-Core.
#[derive(Debug, Parser)]
#[command(
    name = "partinfo",
    version,
    author = "Synavera Systems",
    about = "Partition metadata inspector for CouchDB-compatible databases"
)]
struct Cli {
    /// Override configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Database holding the partitions.
    #[arg(long, value_name = "DB", required_unless_present = "input")]
    database: Option<String>,
    /// Partition key to inspect; repeat for several.
    #[arg(
        long = "partition",
        value_name = "KEY",
        action = ArgAction::Append,
        conflicts_with = "input"
    )]
    partitions: Vec<String>,
    /// Decode a saved response body instead of fetching (`-` for stdin).
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,
    /// Print the report as JSON instead of diagnostic lines.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    /// Persist the JSON report (defaults to the configured report path
    /// when given without a value).
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    report: Option<Option<PathBuf>>,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[Partinfo-Core] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.input.is_none() && cli.partitions.is_empty() {
        return Err(PartinfoError::Config(
            "Provide at least one --partition or an --input body".into(),
        ));
    }

    let config = PartinfoConfig::load_from_optional_path(cli.config.as_deref())?;

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli
        .log
        .clone()
        .unwrap_or_else(|| config.log_dir().join(format!("partinfo_{session_stamp}.log")));
    let logger = Logger::new(Some(log_path), cli.verbose)?;
    logger.info("INIT", "Partinfo Core starting.");

    let outcome = match collect(&cli, &config, &logger).await {
        Ok(infos) => publish(&cli, &config, &logger, infos),
        Err(err) => Err(err),
    };
    settle(&logger, outcome)?;

    Ok(ExitCode::SUCCESS)
}

/// Print the report and persist it when requested.
fn publish(
    cli: &Cli,
    config: &PartinfoConfig,
    logger: &Logger,
    infos: Vec<PartitionInfo>,
) -> Result<()> {
    let document = build_report(cli.database.as_deref(), infos);
    emit(cli, &document)?;

    if let Some(target) = &cli.report {
        let path = target.clone().unwrap_or_else(|| config.report_path());
        write_report(&document, &path)?;
        logger.info("REPORT", format!("Report written to {}", path.display()));
    }

    logger.info(
        "SUMMARY",
        format!(
            "partitions={} docs={} deleted={} without_sizes={}",
            document.metadata.total_partitions,
            document.metadata.total_doc_count,
            document.metadata.total_doc_del_count,
            document.metadata.partitions_without_sizes
        ),
    );
    Ok(())
}

/// Record the run's outcome and seal the session log either way.
fn settle(logger: &Logger, outcome: Result<()>) -> Result<()> {
    match outcome {
        Ok(()) => {
            logger.info("COMPLETE", "Partition inspection finished.");
            logger.finalize()?;
            Ok(())
        }
        Err(err) => {
            log_failure(logger, &err);
            logger.finalize()?;
            Err(err)
        }
    }
}

async fn collect(cli: &Cli, config: &PartinfoConfig, logger: &Logger) -> Result<Vec<PartitionInfo>> {
    if let Some(input) = &cli.input {
        let body = read_body(input).await?;
        logger.debug("DECODE", format!("Decoding {} bytes from {}", body.len(), input.display()));
        return Ok(vec![ResponseMapper::decode(&body)?]);
    }

    let database = cli
        .database
        .as_deref()
        .ok_or_else(|| PartinfoError::Config("--database is required when fetching".into()))?;
    let client = PartitionClient::new(&config.client)?;
    logger.info(
        "FETCH",
        format!(
            "Requesting {} partition(s) of `{database}` from {}",
            cli.partitions.len(),
            config.client.base_url
        ),
    );
    let infos = client.fetch_many(database, &cli.partitions).await?;
    for info in &infos {
        logger.debug("FETCH", info.to_string());
    }
    Ok(infos)
}

async fn read_body(input: &Path) -> Result<Vec<u8>> {
    if input == Path::new("-") {
        let mut body = Vec::new();
        tokio::io::stdin().read_to_end(&mut body).await?;
        return Ok(body);
    }
    tokio::fs::read(input).await.map_err(|err| {
        PartinfoError::Filesystem(format!("Failed to read body {}: {err}", input.display()))
    })
}

fn emit(cli: &Cli, document: &ReportDocument) -> Result<()> {
    if cli.json {
        println!("{}", render_report(document)?);
    } else {
        for info in document.partitions.values() {
            println!("{info}");
        }
    }
    Ok(())
}

fn log_failure(logger: &Logger, err: &PartinfoError) {
    match err {
        PartinfoError::Decode(decode) => match decode.field() {
            Some(field) => logger.error("DECODE", format!("Rejected field `{field}`")),
            None => logger.error("DECODE", decode.to_string()),
        },
        PartinfoError::Http { .. } => logger.error("HTTP", err.to_string()),
        other => logger.error("FAILURE", other.to_string()),
    }
}
