use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feature_signals::catalog::Catalog;
use feature_signals::config::Config;
use feature_signals::positions::HttpPositionSource;
use feature_signals::sync::sync;
use feature_signals::tracker::GitHubClient;

#[derive(Parser)]
#[command(name = "feature-signals")]
#[command(about = "Keep one tracking issue per web platform feature in sync with web-features")]
struct Cli {
    /// Log what would change without creating or updating issues
    #[arg(long)]
    dry_run: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "feature_signals=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::load()?;
    tracing::info!(
        repository = %config.repository,
        dry_run = cli.dry_run,
        "Starting feature-signals"
    );

    let catalog = Catalog::load(&config.catalog_path)?;
    let positions = HttpPositionSource::new(config.positions_url.as_str());
    let token = Config::token();
    if token.is_none() && !cli.dry_run {
        tracing::warn!("GITHUB_TOKEN is not set, issue mutations will be rejected");
    }
    let tracker = GitHubClient::new(config.api_url.as_str(), config.repository.as_str(), token);

    let report = sync(&config, &catalog, &positions, &tracker, cli.dry_run).await?;

    println!(
        "{} created, {} updated, {} unchanged, {} skipped{}",
        report.created(),
        report.updated(),
        report.unchanged(),
        report.skipped(),
        if report.dry_run { " (dry run)" } else { "" }
    );

    Ok(())
}
