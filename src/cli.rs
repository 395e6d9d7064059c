use crate::media::MediaKind;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the four home catalogs
    Home,
    /// Search movies and TV series
    Search {
        /// Search term, three characters minimum
        term: String,
        /// Result page to print (20 results per page)
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show the full record for one title
    Detail {
        /// Kind of title to look up
        kind: KindArg,
        /// TMDB id
        id: u64,
    },
    /// Show or edit the watchlist
    Watchlist {
        #[command(subcommand)]
        action: Option<WatchlistAction>,
    },
}

#[derive(Subcommand)]
pub enum WatchlistAction {
    /// Print both collections
    Show,
    /// Look a title up and add it
    Add { kind: KindArg, id: u64 },
    /// Remove a title
    Remove { kind: KindArg, id: u64 },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Movie,
    Tv,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Movie => MediaKind::Movie,
            KindArg::Tv => MediaKind::TvSeries,
        }
    }
}
