use anyhow::Result;
use clap::Parser;

use promptlab_cli::{Cli, run, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    telemetry::init_logging(cli.verbose);

    let output = run(cli).await?;
    println!("{output}");
    Ok(())
}
