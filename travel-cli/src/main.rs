mod cli;
mod config;
mod render;
mod repl;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, SearchArgs};
use config::TravelConfig;
use tracing_subscriber::EnvFilter;
use travel_search::{
    ApiClient, DevBackend, FileSessionStore, SearchBackend, SearchCoordinator, Session,
    SessionStore, SessionUser, SuggestionFetcher,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::from_filename(".env.travel").ok();
    init_tracing();

    let cli = Cli::parse();
    let config = TravelConfig::load()?;

    match cli.command {
        Commands::Search(args) => search(backend(cli.dev, &config)?, &config, args).await,
        Commands::Suggest { query } => suggest(backend(cli.dev, &config)?, &config, query).await,
        Commands::Interactive { content_type } => {
            repl::run(backend(cli.dev, &config)?, &config, content_type).await
        }
        Commands::Health => {
            let status = backend(cli.dev, &config)?.health().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Commands::Login { token, username } => login(token, username),
        Commands::Logout => {
            let store = FileSessionStore::default_location()?;
            store.clear()?;
            println!("Logged out. Removed {}", store.path().display());
            Ok(())
        }
        Commands::ConfigPath => {
            let path = TravelConfig::config_path()?;
            if !path.exists() {
                TravelConfig::default().save_to(&path)?;
            }
            println!("{}", path.display());
            Ok(())
        }
    }
}

/// Logs go to stderr so they never mix with results. `RUST_LOG` overrides the
/// default `warn` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn backend(dev: bool, config: &TravelConfig) -> Result<Arc<dyn SearchBackend>> {
    if dev {
        tracing::info!("using in-memory dev data");
        return Ok(Arc::new(DevBackend::new()));
    }

    let session = Arc::new(FileSessionStore::default_location()?);
    let client = ApiClient::new(&config.api_url, session)
        .with_context(|| format!("Failed to create client for {}", config.api_url))?;
    Ok(Arc::new(client))
}

async fn search(
    backend: Arc<dyn SearchBackend>,
    config: &TravelConfig,
    args: SearchArgs,
) -> Result<()> {
    let mut search = SearchCoordinator::new(backend);
    search.set_content_type(args.content_type);
    for (key, value) in args.filters {
        search.filters_mut().add(key, value);
    }
    search.set_sort(args.sort_by.as_deref(), args.desc).await?;

    let response = search
        .execute_search(args.page, Some(&args.query), None)
        .await?;
    print!("{}", render::results(response, args.content_type));

    let pager = render::pager(&search.pagination(), config.page_window);
    if !pager.is_empty() {
        println!("{}", pager);
    }
    Ok(())
}

async fn suggest(
    backend: Arc<dyn SearchBackend>,
    config: &TravelConfig,
    query: String,
) -> Result<()> {
    let fetcher = SuggestionFetcher::with_delay(backend, config.debounce());
    fetcher.set_query(query).await?;

    let state = fetcher.snapshot();
    if let Some(error) = state.error {
        anyhow::bail!("Autocomplete failed: {}", error);
    }
    if !state.has_results() {
        println!("No suggestions.");
    }
    print!("{}", render::suggestions(&state.items));
    Ok(())
}

fn login(token: String, username: Option<String>) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        anyhow::bail!("Token must not be empty");
    }

    let mut session = Session::new(token);
    if let Some(username) = username {
        session = session.with_user(SessionUser {
            user_id: None,
            username,
            role: None,
            expiry: None,
        });
    }

    let store = FileSessionStore::default_location()?;
    store.save(&session).context("Failed to store session")?;
    println!("Session saved to {}", store.path().display());
    Ok(())
}
