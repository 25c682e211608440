//! CLI for the archive-repo action.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use archive_repo::prelude::*;
use archive_repo::{actions, logging};
use clap::Parser;
use tracing::error;
use url::Url;

#[derive(Parser)]
#[command(name = "archive-repo")]
#[command(author, version, about = "Archive an organization repository and report back on the issue", long_about = None)]
struct Cli {
    #[command(flatten)]
    inputs: RawInputs,

    /// GitHub API root
    #[arg(long, env = "GITHUB_API_URL", default_value = archive_repo::github::DEFAULT_API_URL)]
    api_url: String,

    /// File to append step outputs to
    #[arg(long, env = "GITHUB_OUTPUT")]
    output_file: Option<PathBuf>,

    /// Log output format (actions or plain)
    #[arg(long, default_value = "actions")]
    log_format: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_format = cli.log_format.parse::<LogFormat>();
    logging::init(log_format.clone().unwrap_or_default());
    if let Err(e) = log_format {
        error!("Invalid log format '{}': {}", cli.log_format, e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<Outcome> {
    let inputs = ActionInputs::try_from(cli.inputs)?;
    let command = ArchiveCommand::parse(&inputs.body, &inputs.org)?;
    let api_url = match cli.api_url.trim() {
        "" => archive_repo::github::DEFAULT_API_URL,
        url => url,
    };
    let api_url = Url::parse(api_url)
        .with_context(|| format!("Invalid API URL '{}'", cli.api_url))?;
    let config = ClientConfig::new(api_url.as_str());

    let outcome = archive::run(&inputs, &command, &config).await;

    if let Some(path) = cli.output_file {
        actions::write_outputs(&path, &outcome.outputs())
            .with_context(|| format!("Failed to write outputs to {}", path.display()))?;
    }

    Ok(outcome)
}
