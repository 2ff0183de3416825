mod cli;
mod config;
mod dates;
mod download;
mod error;
mod et0;
mod merge;
mod output;
mod raster;
mod series;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cli::{command, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&cli.global.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    match dispatch(&cli).await {
        Ok(saved) => {
            for path in saved {
                println!("File saved to `{}`", path);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: &Cli) -> Result<Vec<String>> {
    let config = cli.global.run_config();

    let saved = match &cli.command {
        Commands::Et0 { pressure } => {
            vec![command::et0(&config, &cli.global.date_range()?, *pressure).await?]
        }
        Commands::Mswx { drive } => {
            vec![command::mswx(&config, &cli.global.date_range()?, drive).await?]
        }
        Commands::Temp {} => vec![command::temp(&config, &cli.global.date_range()?).await?],
        Commands::Imerg { earthdata } => {
            vec![command::imerg(&config, &cli.global.date_range()?, earthdata).await?]
        }
        Commands::Merge {
            prefix,
            variable,
            units,
            output,
        } => vec![command::merge(&cli.global.date_range()?, prefix, variable, units, output).await?],
        Commands::Crop {
            input,
            variable,
            output,
        } => vec![command::crop(&config, input, variable, output).await?],
        Commands::Run {
            drive,
            earthdata,
            pressure,
        } => command::run(&config, &cli.global.date_range()?, drive, earthdata, *pressure).await?,
    };

    Ok(saved)
}
