use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use serde_json::Value;

use roster_pdf::{ExportOptions, SettleStrategy, export_users_to_pdf_with};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// JSON file holding an array of user records
    input: PathBuf,

    /// Directory the report is written into
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Comma-separated column keys, in display order (default: all)
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Keep only records whose name contains this term, case-insensitive
    #[arg(long)]
    search: Option<String>,

    /// Corner logo PNG
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Fixed settle delay before capture, in milliseconds
    #[arg(long)]
    render_delay_ms: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(&cli.input)?;
    let mut users: Vec<Value> = serde_json::from_str(&raw)?;

    if let Some(term) = &cli.search {
        let needle = term.trim().to_lowercase();
        if !needle.is_empty() {
            users.retain(|user| {
                user.get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
            });
        }
    }

    let mut options = ExportOptions::default();
    if let Some(logo) = cli.logo {
        options = options.with_logo_path(logo);
    }
    if let Some(delay) = cli.render_delay_ms {
        options = options.with_settle(SettleStrategy::FixedDelay(Duration::from_millis(delay)));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let path = runtime.block_on(export_users_to_pdf_with(
        &users,
        &cli.columns,
        &cli.output,
        &options,
    ))?;
    Ok(path)
}
