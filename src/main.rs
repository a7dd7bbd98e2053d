use std::io;
use std::process::ExitCode;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use ragflow::cli::{parse_args, run_chat, version_string, CliCommand, USAGE};
use ragflow::RagflowClient;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let args = match parse_args(std::env::args()) {
        CliCommand::Version => {
            println!("{}", version_string());
            return Ok(ExitCode::SUCCESS);
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(ExitCode::SUCCESS);
        }
        CliCommand::Invalid(reason) => {
            eprintln!("ragflow-chat: {}\n\n{}", reason, USAGE);
            return Ok(ExitCode::from(2));
        }
        CliCommand::Chat(args) => args,
    };

    init_tracing();

    let client = RagflowClient::from_env().wrap_err("failed to configure RAGFlow client")?;
    let mut stdout = io::stdout().lock();
    run_chat(&client, &args, &mut stdout).await?;
    Ok(ExitCode::SUCCESS)
}
