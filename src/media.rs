use serde::{Deserialize, Serialize};

/// Discriminator between movie and TV series items. Affects upstream field
/// mapping and which watchlist bucket an item lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
    Movie,
    TvSeries,
}

impl MediaKind {
    pub fn api_path(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::TvSeries => "tv",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Movie => "Movie",
            MediaKind::TvSeries => "TV Series",
        }
    }
}

/// The four non-personalized catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Catalog {
    PopularMovies,
    TrendingMovies,
    TopRatedMovies,
    TvSeries,
}

impl Catalog {
    pub const ALL: [Catalog; 4] = [
        Catalog::PopularMovies,
        Catalog::TrendingMovies,
        Catalog::TopRatedMovies,
        Catalog::TvSeries,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Catalog::PopularMovies => "Popular Movies",
            Catalog::TrendingMovies => "Trending Movies",
            Catalog::TopRatedMovies => "Top Rated Movies",
            Catalog::TvSeries => "TV Series",
        }
    }

    pub fn media_kind(&self) -> MediaKind {
        match self {
            Catalog::TvSeries => MediaKind::TvSeries,
            _ => MediaKind::Movie,
        }
    }
}

/// One normalized catalog/search entry. Constructed fresh from every API
/// response and never mutated; also the shape persisted in the watchlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: u64,
    pub media_kind: MediaKind,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub year: String,
    pub vote_average: Option<f32>,
}

/// Full detail-page payload. Lives for one detail visit and is replaced
/// wholesale on navigation, never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaDetail {
    pub item: MediaItem,
    pub duration_label: String,
    pub genres: Vec<String>,
    pub director: String,
    pub cast: Vec<String>,
    pub trailer_embed_url: Option<String>,
}

/// One-decimal rating for display. An absent rating reads "N/A", never 0.
pub fn format_vote_average(vote: Option<f32>) -> String {
    match vote {
        Some(v) => format!("{v:.1}"),
        None => "N/A".to_string(),
    }
}

/// First four characters of a release/first-air date, or "N/A".
pub fn year_from_date(date: Option<&str>) -> String {
    match date {
        Some(d) if !d.is_empty() => d.chars().take(4).collect(),
        _ => "N/A".to_string(),
    }
}
