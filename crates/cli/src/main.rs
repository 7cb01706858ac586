use anyhow::Result;
use clap::Parser;
use nodewatch_cli::{commands, logging, CliArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    logging::init_logging(&args.log_config())?;

    commands::run(args).await
}
