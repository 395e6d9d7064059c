use crate::error::UpstreamError;
use crate::media::{year_from_date, Catalog, MediaDetail, MediaItem, MediaKind};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::time::Duration;

const TMDB_BASE: &str = "https://api.themoviedb.org/3";
const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";
const BACKDROP_BASE: &str = "https://image.tmdb.org/t/p/original";
const CAST_LIMIT: usize = 5;
// Keeps the TV listing to well-voted scripted shows; excludes news, reality and talk.
const TV_DISCOVER_FILTER: &str =
    "sort_by=vote_average.desc&vote_count.gte=100&without_genres=10763,10764,10767";

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[async_trait]
pub trait MediaApi: Send + Sync {
    async fn fetch_catalog(&self, catalog: Catalog) -> Result<Vec<MediaItem>, UpstreamError>;
    async fn search_multi(&self, term: &str) -> Result<Vec<MediaItem>, UpstreamError>;
    async fn fetch_detail(&self, kind: MediaKind, id: u64) -> Result<MediaDetail, UpstreamError>;
}

impl TmdbClient {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("TMDB_API_KEY").context("TMDB_API_KEY not set")?;
        Self::new(api_key)
    }

    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let user_agent = format!("cinefeed/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: TMDB_BASE.to_string(),
        })
    }

    /// Points the client at a different host. Tests aim it at a local mock
    /// server; production uses the default.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl MediaApi for TmdbClient {
    async fn fetch_catalog(&self, catalog: Catalog) -> Result<Vec<MediaItem>, UpstreamError> {
        let path = match catalog {
            Catalog::PopularMovies => "/movie/popular?language=en-US&page=1".to_string(),
            Catalog::TrendingMovies => "/trending/movie/day?language=en-US&page=1".to_string(),
            Catalog::TopRatedMovies => "/movie/top_rated?language=en-US&page=1".to_string(),
            Catalog::TvSeries => {
                format!("/discover/tv?language=en-US&page=1&{TV_DISCOVER_FILTER}")
            }
        };
        let data: ListResponse = self.get_json(&path).await?;
        let kind = catalog.media_kind();
        Ok(data
            .results
            .into_iter()
            .map(|entry| normalize_entry(entry, kind))
            .collect())
    }

    async fn search_multi(&self, term: &str) -> Result<Vec<MediaItem>, UpstreamError> {
        let path = format!(
            "/search/multi?language=en-US&query={}&page=1&include_adult=false",
            urlencoding::encode(term)
        );
        let data: ListResponse = self.get_json(&path).await?;
        Ok(data
            .results
            .into_iter()
            .filter_map(|entry| {
                // Multi search also returns people; only movie and tv belong here.
                let kind = match entry.media_type.as_deref() {
                    Some("movie") => MediaKind::Movie,
                    Some("tv") => MediaKind::TvSeries,
                    _ => return None,
                };
                Some(normalize_entry(entry, kind))
            })
            .collect())
    }

    async fn fetch_detail(&self, kind: MediaKind, id: u64) -> Result<MediaDetail, UpstreamError> {
        match kind {
            MediaKind::Movie => self.fetch_movie_detail(id).await,
            MediaKind::TvSeries => self.fetch_tv_detail(id).await,
        }
    }
}

impl TmdbClient {
    async fn fetch_movie_detail(&self, id: u64) -> Result<MediaDetail, UpstreamError> {
        let path_detail = format!("/movie/{id}?language=en-US");
        let path_credits = format!("/movie/{id}/credits?language=en-US");
        let path_videos = format!("/movie/{id}/videos?language=en-US");

        let (detail, credits, videos) = tokio::try_join!(
            self.get_json::<MovieDetail>(&path_detail),
            self.get_json::<Credits>(&path_credits),
            self.get_json::<Videos>(&path_videos),
        )?;

        let item = MediaItem {
            id: detail.id,
            media_kind: MediaKind::Movie,
            title: detail.title,
            overview: detail.overview,
            poster_url: image_url(POSTER_BASE, detail.poster_path.as_deref()),
            backdrop_url: image_url(BACKDROP_BASE, detail.backdrop_path.as_deref()),
            year: year_from_date(detail.release_date.as_deref()),
            vote_average: real_vote(detail.vote_average),
        };

        Ok(MediaDetail {
            item,
            duration_label: movie_duration_label(detail.runtime),
            genres: genre_names(detail.genres.as_ref()),
            director: first_crew_with_job(credits.crew.as_deref(), "Director")
                .unwrap_or_else(|| "N/A".to_string()),
            cast: top_names(&credits.cast, CAST_LIMIT),
            trailer_embed_url: select_trailer(&videos),
        })
    }

    async fn fetch_tv_detail(&self, id: u64) -> Result<MediaDetail, UpstreamError> {
        let path_detail = format!("/tv/{id}?language=en-US");
        let path_credits = format!("/tv/{id}/credits?language=en-US");
        let path_videos = format!("/tv/{id}/videos?language=en-US");

        let (detail, credits, videos) = tokio::try_join!(
            self.get_json::<ShowDetail>(&path_detail),
            self.get_json::<Credits>(&path_credits),
            self.get_json::<Videos>(&path_videos),
        )?;

        let director = detail
            .created_by
            .as_deref()
            .and_then(|c| c.first())
            .map(|c| c.name.clone())
            .or_else(|| first_crew_with_job(credits.crew.as_deref(), "Executive Producer"))
            .unwrap_or_else(|| "N/A".to_string());

        let item = MediaItem {
            id: detail.id,
            media_kind: MediaKind::TvSeries,
            title: detail.name,
            overview: detail.overview,
            poster_url: image_url(POSTER_BASE, detail.poster_path.as_deref()),
            backdrop_url: image_url(BACKDROP_BASE, detail.backdrop_path.as_deref()),
            year: year_from_date(detail.first_air_date.as_deref()),
            vote_average: real_vote(detail.vote_average),
        };

        Ok(MediaDetail {
            item,
            duration_label: tv_duration_label(
                detail.episode_run_time.as_deref(),
                detail.number_of_seasons,
            ),
            genres: genre_names(detail.genres.as_ref()),
            director,
            cast: top_names(&credits.cast, CAST_LIMIT),
            trailer_embed_url: select_trailer(&videos),
        })
    }

    /// `path` is the endpoint path plus query; the API key rides along as an
    /// extra query pair so it never appears in the URLs carried by errors.
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| UpstreamError::Transport {
                url: url.clone(),
                source: e,
            })?;
        let status = res.status();
        let text = res.text().await.map_err(|e| UpstreamError::Transport {
            url: url.clone(),
            source: e,
        })?;
        if !status.is_success() {
            return Err(UpstreamError::Status {
                url,
                status: status.as_u16(),
                message: upstream_message(&text),
            });
        }
        serde_json::from_str(&text).map_err(|e| UpstreamError::Decode { url, source: e })
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    results: Vec<ListEntry>,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    id: u64,
    title: Option<String>,
    name: Option<String>,
    #[serde(default)]
    overview: String,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    media_type: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    vote_average: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct MovieDetail {
    id: u64,
    title: String,
    #[serde(default)]
    overview: String,
    release_date: Option<String>,
    runtime: Option<u32>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    genres: Option<Vec<Genre>>,
    vote_average: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ShowDetail {
    id: u64,
    name: String,
    #[serde(default)]
    overview: String,
    first_air_date: Option<String>,
    episode_run_time: Option<Vec<u32>>,
    number_of_seasons: Option<u32>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    genres: Option<Vec<Genre>>,
    created_by: Option<Vec<Creator>>,
    vote_average: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Creator {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Credits {
    cast: Vec<CastMember>,
    crew: Option<Vec<CrewMember>>,
}

#[derive(Debug, Deserialize)]
struct CastMember {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CrewMember {
    job: Option<String>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct Videos {
    results: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    site: String,
    #[serde(rename = "type")]
    video_type: String,
    key: String,
}

fn normalize_entry(entry: ListEntry, kind: MediaKind) -> MediaItem {
    let date = entry.release_date.as_deref().or(entry.first_air_date.as_deref());
    MediaItem {
        id: entry.id,
        media_kind: kind,
        title: entry.title.or(entry.name).unwrap_or_default(),
        year: year_from_date(date),
        overview: entry.overview,
        poster_url: image_url(POSTER_BASE, entry.poster_path.as_deref()),
        backdrop_url: image_url(BACKDROP_BASE, entry.backdrop_path.as_deref()),
        vote_average: real_vote(entry.vote_average),
    }
}

fn image_url(base: &str, path: Option<&str>) -> Option<String> {
    path.map(|p| format!("{base}{p}"))
}

// TMDB reports 0.0 for unrated titles; that is "no rating", not a score.
fn real_vote(vote: Option<f32>) -> Option<f32> {
    vote.filter(|v| *v > 0.0)
}

fn movie_duration_label(runtime: Option<u32>) -> String {
    match runtime {
        Some(m) if m > 0 => format!("{m} min"),
        _ => "N/A".to_string(),
    }
}

fn tv_duration_label(episode_run_time: Option<&[u32]>, seasons: Option<u32>) -> String {
    if let Some(rt) = episode_run_time
        .and_then(|r| r.first().copied())
        .filter(|r| *r > 0)
    {
        return format!("{rt} min");
    }
    match seasons {
        Some(1) => "1 Season".to_string(),
        Some(n) if n > 1 => format!("{n} Seasons"),
        _ => "N/A".to_string(),
    }
}

fn first_crew_with_job(crew: Option<&[CrewMember]>, job: &str) -> Option<String> {
    crew?
        .iter()
        .find(|c| c.job.as_deref() == Some(job))
        .map(|c| c.name.clone())
}

fn top_names(list: &[CastMember], max: usize) -> Vec<String> {
    list.iter().take(max).map(|c| c.name.clone()).collect()
}

fn genre_names(genres: Option<&Vec<Genre>>) -> Vec<String> {
    genres
        .map(|g| g.iter().map(|x| x.name.clone()).collect())
        .unwrap_or_default()
}

fn select_trailer(videos: &Videos) -> Option<String> {
    videos
        .results
        .iter()
        .find(|v| v.site.eq_ignore_ascii_case("YouTube") && v.video_type == "Trailer")
        .map(|v| format!("https://www.youtube.com/embed/{}", v.key))
}

fn upstream_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        status_message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.status_message)
        .unwrap_or_else(|_| body.trim().to_string())
}
