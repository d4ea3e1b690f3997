use clap::Parser;
use league_roster::cli::{self, Cli, Command};
use league_roster::infrastructure::logging::init_logging;
use league_roster::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_logging(&config.logging);

    match cli.command {
        Command::Serve => cli::serve::run(&config).await,
        Command::Migrate(args) => cli::migrate::run(&config, args).await,
    }
}
