use anyhow::{Context, Result, anyhow};
use clap::Parser;
use cli::Cli;
use sbadmin_core::administration::AdministrationClient;

mod cli;
mod commands;
mod config;
mod logger;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let app_config = config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Err(errors) = app_config.validate() {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(anyhow!("Invalid configuration: {}", details.join("; ")));
    }
    logger::setup_logger(app_config.logging(), cli.verbose)?;

    let connection_string = cli
        .connection_string
        .as_deref()
        .or(app_config.connection_string())
        .context(
            "No connection string: pass --connection-string, set SBADMIN__CONNECTION_STRING \
             or add connection_string to config.toml",
        )?;

    let client =
        AdministrationClient::from_connection_string(connection_string, app_config.client().clone())
            .context("Failed to create administration client")?;

    let output = commands::run(&client, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
