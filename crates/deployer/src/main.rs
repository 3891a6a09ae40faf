use clap::Parser;
use cli_common::OrBail;
use deployer::cli::{Cli, Command};
use deployer::Deployer;
use orchestrator_client::Client;
use std::time::Duration;

fn main() {
    let cli = Cli::parse();
    cli_common::init_logging(&cli.log);

    run(&cli).or_bail("deployer failed");
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let client = Client::new(
        cli.base_url.clone(),
        cli.access_token.clone(),
        cli.verify_tls,
    )?;
    let deployer = Deployer::new(client, Duration::from_secs(cli.poll_timeout_secs));

    match &cli.command {
        Command::Deploy { file } => {
            tracing::info!(path = %file.display(), "reading deployment document");
            let text = std::fs::read_to_string(file)?;
            let document: model::JsonValue = serde_json::from_str(&text)?;
            deployer.deploy_group(&document)?;
        }
        Command::Delete { group_name } => {
            deployer.delete_group(group_name)?;
        }
    }
    Ok(())
}
