use anyhow::Result;
use cinefeed::app::App;
use cinefeed::cli::{Cli, Command, WatchlistAction};
use cinefeed::fetch::FetchStatus;
use cinefeed::media::{format_vote_average, Catalog, MediaItem, MediaKind};
use cinefeed::search::{SearchPhase, MIN_QUERY_CHARS};
use clap::Parser;
use dotenvy::dotenv;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn check_env() -> Result<()> {
    let required = ["TMDB_API_KEY"];
    for key in required {
        if env::var(key).is_err() {
            anyhow::bail!("Missing required environment variable: {}", key);
        }
    }
    info!("All required environment variables are set");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match dotenv() {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }
    init_tracing();
    check_env()?;

    let mut app = App::from_env()?;
    match cli.command {
        Command::Home => run_home(&mut app).await,
        Command::Search { term, page } => run_search(&mut app, &term, page).await,
        Command::Detail { kind, id } => run_detail(&mut app, kind.into(), id).await,
        Command::Watchlist { action } => run_watchlist(&mut app, action).await,
    }
    Ok(())
}

async fn run_home(app: &mut App) {
    app.load_home().await;
    for catalog in Catalog::ALL {
        println!("{}:", catalog.label());
        match app.catalogs.status(catalog) {
            FetchStatus::Ready => {
                for item in app.catalogs.items(catalog).unwrap_or(&[]) {
                    println!("  {}", item_line(item));
                }
            }
            FetchStatus::Failed => {
                let message = app.catalogs.error(catalog).unwrap_or("unknown error");
                println!("  could not load: {}", message);
            }
            _ => println!("  (not loaded)"),
        }
        println!();
    }
}

async fn run_search(app: &mut App, term: &str, page: usize) {
    app.submit_search(term).await;
    match app.search.phase() {
        SearchPhase::Ready => {
            app.search.set_page(page);
            println!(
                "{} results for '{}', page {} of {}",
                app.search.results().len(),
                app.search.query(),
                app.search.page(),
                app.search.page_count().max(1)
            );
            for item in app.search.page_items() {
                println!("  [{}] {}", item.media_kind.label(), item_line(item));
            }
        }
        SearchPhase::Failed => {
            let message = app.search.error().unwrap_or("unknown error");
            println!("Search failed: {}", message);
        }
        _ => println!("Search needs at least {} characters", MIN_QUERY_CHARS),
    }
}

async fn run_detail(app: &mut App, kind: MediaKind, id: u64) {
    app.open_detail(kind, id).await;
    if let Some(detail) = app.detail.detail() {
        println!(
            "{} ({})  [{}]",
            detail.item.title,
            detail.item.year,
            detail.item.media_kind.label()
        );
        println!("Rating:   {}", format_vote_average(detail.item.vote_average));
        println!("Runtime:  {}", detail.duration_label);
        println!("Genres:   {}", detail.genres.join(", "));
        println!("Director: {}", detail.director);
        println!("Cast:     {}", detail.cast.join(", "));
        if let Some(trailer) = &detail.trailer_embed_url {
            println!("Trailer:  {}", trailer);
        }
        if !detail.item.overview.is_empty() {
            println!();
            println!("{}", detail.item.overview);
        }
        if app.watchlist.contains(detail.item.id) {
            println!();
            println!("On your watchlist");
        }
    } else {
        let message = app.detail.error().unwrap_or("unknown error");
        println!("Could not load {} {}: {}", kind.api_path(), id, message);
    }
}

async fn run_watchlist(app: &mut App, action: Option<WatchlistAction>) {
    match action.unwrap_or(WatchlistAction::Show) {
        WatchlistAction::Show => print_watchlist(app),
        WatchlistAction::Add { kind, id } => {
            let kind = MediaKind::from(kind);
            app.open_detail(kind, id).await;
            match app.detail.detail() {
                Some(detail) => {
                    let item = detail.item.clone();
                    if app.watchlist.contains(item.id) {
                        println!("'{}' is already on the watchlist", item.title);
                    } else {
                        app.watchlist.add(item.clone());
                        println!("Added '{}'", item.title);
                    }
                }
                None => {
                    let message = app.detail.error().unwrap_or("unknown error");
                    println!("Could not load {} {}: {}", kind.api_path(), id, message);
                }
            }
        }
        WatchlistAction::Remove { kind, id } => {
            let kind = MediaKind::from(kind);
            app.watchlist.remove(kind, id);
            println!("Removed {} {} from the watchlist", kind.api_path(), id);
        }
    }
}

fn print_watchlist(app: &App) {
    let movies = app.watchlist.movies();
    let shows = app.watchlist.tv_series();
    if movies.is_empty() && shows.is_empty() {
        println!("The watchlist is empty");
        return;
    }
    if !movies.is_empty() {
        println!("Movies:");
        for item in movies {
            println!("  {}", item_line(item));
        }
    }
    if !shows.is_empty() {
        println!("TV Series:");
        for item in shows {
            println!("  {}", item_line(item));
        }
    }
}

fn item_line(item: &MediaItem) -> String {
    format!(
        "{:>8}  {} ({})  rating {}",
        item.id,
        item.title,
        item.year,
        format_vote_average(item.vote_average)
    )
}
