use std::{
    error::Error,
    io::{self, Write},
    process::ExitCode
};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{error, info};

use arxivharvest::{
    format::Formatter,
    logger::init_logger,
    HarvestConfig,
    Harvester
};

/// Harvest arXiv metadata over OAI-PMH for a date range.
#[derive(Debug, Parser)]
#[command(name = "harvest", version)]
struct Args {
    /// first datestamp to include (YYYY-MM-DD)
    #[arg(long)]
    from: NaiveDate,

    /// last datestamp to include (YYYY-MM-DD)
    #[arg(long)]
    until: NaiveDate,

    /// OAI set spec, defaults to SUBJECT_SET or physics:quant-ph
    #[arg(long)]
    set: Option<String>,

    /// rows to preview once the harvest completes
    #[arg(long, default_value_t = 5)]
    head: usize,

    /// write every row to stdout as JSON lines instead of a preview
    #[arg(long)]
    jsonl: bool,
}

fn main() -> ExitCode {
    init_logger();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("harvest failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = HarvestConfig::from_env()?;
    if let Some(set) = args.set {
        config = config.with_subject_set(&set);
    }

    let harvester = Harvester::from_config(config)?;
    let table = harvester.harvest(args.from, args.until)?;
    info!("# results: {}", table.len());

    let mut out = io::stdout().lock();
    if args.jsonl {
        for data in &table {
            out.write_all(Formatter::to_jsonl(data)?.as_bytes())?;
        }
    } else {
        out.write_all(Formatter::to_preview(&table, args.head).as_bytes())?;
    }
    out.flush()?;
    Ok(())
}
