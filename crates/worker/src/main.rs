use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rankwatch_core::domain::business::BusinessRef;
use rankwatch_core::history::{RankingHistory, DEFAULT_RECENT_LIMIT};
use rankwatch_core::service::SearchService;

#[derive(Debug, Parser)]
#[command(name = "rankwatch_worker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search one keyword in one location and record the ranking snapshot.
    Search {
        #[arg(long)]
        keyword: String,
        #[arg(long)]
        location: String,
    },

    /// Search one keyword across several locations (not recorded).
    Batch {
        #[arg(long)]
        keyword: String,
        /// Repeat for each location.
        #[arg(long = "location", required = true)]
        locations: Vec<String>,
    },

    /// Rank 2 to 5 businesses against each keyword in one location.
    Competitors {
        #[arg(long)]
        location: String,
        /// `<id>=<name>`, repeat for each business.
        #[arg(long = "business", value_parser = parse_business_ref, required = true)]
        businesses: Vec<BusinessRef>,
        #[arg(long = "keyword", required = true)]
        keywords: Vec<String>,
    },

    /// Rank a business for keywords related to its category.
    Analyze {
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        /// Provider type tags, e.g. `restaurant`, `meal_takeaway`.
        #[arg(long = "type")]
        types: Vec<String>,
    },

    #[command(subcommand)]
    History(HistoryCommand),
}

#[derive(Debug, Subcommand)]
enum HistoryCommand {
    /// Latest snapshot per keyword/location, newest first.
    Recent {
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },

    /// Rank changes between the two most recent snapshots.
    Compare {
        #[arg(long)]
        keyword: String,
        #[arg(long)]
        location: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = rankwatch_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let store = rankwatch_core::storage::open_blob_store(&settings)
        .await
        .context("open history store failed")?;
    let history = RankingHistory::new(store);
    let service = SearchService::from_settings(&settings, history)?;

    let res = run(&service, args.command).await;
    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "worker command failed");
    }
    res
}

async fn run(service: &SearchService, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Search { keyword, location } => {
            let outcome = service.search_and_record(&keyword, &location).await?;
            tracing::info!(
                %keyword,
                %location,
                results = outcome.businesses.len(),
                comparisons = outcome.comparisons.len(),
                "search complete"
            );
            print_json(&outcome)
        }
        Command::Batch { keyword, locations } => {
            let results = service.batch_locations(&keyword, &locations).await?;
            let failures = results.iter().filter(|r| r.error.is_some()).count();
            tracing::info!(%keyword, locations = results.len(), failures, "batch complete");
            print_json(&results)
        }
        Command::Competitors {
            location,
            businesses,
            keywords,
        } => {
            let rows = service
                .compare_competitors(&location, &businesses, &keywords)
                .await?;
            print_json(&rows)
        }
        Command::Analyze {
            name,
            location,
            types,
        } => {
            let analysis = service.analyze_keywords(&name, &types, &location).await?;
            print_json(&analysis)
        }
        Command::History(HistoryCommand::Recent { limit }) => {
            print_json(&service.history().recent_searches(limit).await)
        }
        Command::History(HistoryCommand::Compare { keyword, location }) => {
            print_json(&service.history().comparisons(&keyword, &location).await)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("serialize output failed")?;
    println!("{out}");
    Ok(())
}

fn parse_business_ref(s: &str) -> Result<BusinessRef, String> {
    let (id, name) = s
        .split_once('=')
        .ok_or_else(|| format!("expected <id>=<name>, got {s:?}"))?;
    let (id, name) = (id.trim(), name.trim());
    if id.is_empty() || name.is_empty() {
        return Err(format!("expected <id>=<name>, got {s:?}"));
    }
    Ok(BusinessRef {
        id: id.to_string(),
        name: name.to_string(),
    })
}

fn init_sentry(settings: &rankwatch_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
