// herolist command-line front-end.
// Drives the pager or the search source and prints the resulting window.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use futures::StreamExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use herolist::api::{Hero, HeroApiClient};
use herolist::cache::{default_store_path, delete, store_path};
use herolist::paging::{LocalStore, Pager, PagingSnapshot, QuerySource};
use herolist::presentation::{EMPTY_SEARCH_MESSAGE, EmptyState, error_message};
use herolist::{ApiConfig, DEFAULT_ITEMS_PER_PAGE, PagerError, PagingConfig, Result};

const STORE_NAME: &str = "heroes";

#[derive(Debug, Parser)]
#[command(name = "herolist", version, about = "Browse heroes from a paged API with a local cache")]
struct Cli {
    /// Base URL of the hero API (defaults to HEROES_API_URL or the built-in URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Items per remote page
    #[arg(long, default_value_t = DEFAULT_ITEMS_PER_PAGE)]
    page_size: usize,

    /// Directory for cached data
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List heroes from the cache, fetching pages as needed
    List {
        /// Number of pages to have loaded before printing
        #[arg(long, default_value_t = 1)]
        pages: usize,
        /// Drop the cache and reload from the first page
        #[arg(long)]
        refresh: bool,
        /// Skip the startup refresh when the cache is younger than this many seconds
        #[arg(long)]
        max_age_secs: Option<u64>,
    },
    /// Search heroes by name without caching the results
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Delete all cached heroes and paging progress
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut api = ApiConfig::from_env();
    if let Some(url) = &cli.api_url {
        api.base_url = url.trim_end_matches('/').to_string();
    }
    api.timeout = Duration::from_secs(cli.timeout_secs);

    let paging = PagingConfig::new(cli.page_size)?;

    let store_file = match &cli.cache_dir {
        Some(dir) => store_path(dir, STORE_NAME),
        None => default_store_path(STORE_NAME)
            .ok_or_else(|| PagerError::Other("no cache directory available".into()))?,
    };

    match cli.command {
        Command::List {
            pages,
            refresh,
            max_age_secs,
        } => {
            let mut paging = paging;
            if let Some(secs) = max_age_secs {
                paging = paging.with_cache_ttl(Duration::from_secs(secs));
            }
            let client = Arc::new(HeroApiClient::new(&api)?);
            let store = LocalStore::open(&store_file)?;
            list(Pager::new(paging, store, client)?, pages, refresh).await
        }
        Command::Search { query, pages } => {
            let client = Arc::new(HeroApiClient::new(&api)?);
            search(QuerySource::new(client, query), pages).await
        }
        Command::Clear => {
            // Delete rather than open so a corrupt file can still be cleared.
            delete(&store_file)?;
            println!("Cleared {}", store_file.display());
            Ok(())
        }
    }
}

async fn list(pager: Pager<HeroApiClient>, pages: usize, refresh: bool) -> Result<()> {
    if refresh {
        pager.invalidate().await;
    } else {
        let mut windows = pager.observe();
        while let Some(snapshot) = windows.next().await {
            if !snapshot.load_states.refresh.is_loading() {
                break;
            }
        }
    }

    for _ in 1..pages {
        let states = pager.load_states();
        if states.append.end_of_pagination_reached() || states.first_error().is_some() {
            break;
        }
        pager.append().await;
    }

    print_window(&pager.snapshot());
    Ok(())
}

fn print_window(snapshot: &PagingSnapshot<Hero>) {
    if let Some(err) = snapshot.load_states.first_error() {
        info!(error = %err, "showing cached heroes after a failed load");
        eprintln!("{}", error_message(err));
    }

    if snapshot.is_empty() {
        println!("{}", EmptyState::from_load_states(&snapshot.load_states).message);
        return;
    }

    for hero in &snapshot.window {
        print_hero(hero);
    }
    if let Some(meta) = snapshot.metadata {
        let more = if meta.end_of_pagination_reached { "end" } else { "more available" };
        println!("-- {} heroes, page {} ({})", snapshot.len(), meta.last_fetched_page, more);
    }
}

async fn search(source: QuerySource<HeroApiClient>, pages: usize) -> Result<()> {
    let mut found = 0;
    let mut results = source.pages().take(pages);
    while let Some(page) = results.next().await {
        match page {
            Ok(page) => {
                found += page.items.len();
                page.items.iter().for_each(print_hero);
            }
            Err(err) => {
                eprintln!("{}", error_message(&err));
                return Err(err);
            }
        }
    }

    if found == 0 {
        println!("{}", EMPTY_SEARCH_MESSAGE);
    }
    Ok(())
}

fn print_hero(hero: &Hero) {
    println!(
        "{:>4}  {:<16} power {:>3}  rating {:.1}",
        hero.id, hero.name, hero.power, hero.rating
    );
}
