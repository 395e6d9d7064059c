use crate::catalog::CatalogStore;
use crate::detail::DetailStore;
use crate::media::{Catalog, MediaItem, MediaKind};
use crate::search::{InputEffect, SearchController, SearchFetch};
use crate::storage::JsonFileStorage;
use crate::tmdb::{MediaApi, TmdbClient};
use crate::watchlist::WatchlistStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The whole client state: one store per view plus the API handle the
/// flows fetch with. Views read the stores; only the flows below write.
pub struct App {
    pub api: Arc<dyn MediaApi>,
    pub catalogs: CatalogStore,
    pub detail: DetailStore,
    pub search: SearchController,
    pub watchlist: WatchlistStore,
}

impl App {
    pub fn from_env() -> Result<Self> {
        let api: Arc<dyn MediaApi> = Arc::new(TmdbClient::from_env()?);
        let storage = JsonFileStorage::in_data_dir()?;
        debug!("Watchlist file: {}", storage.path().display());
        Ok(Self::new(api, WatchlistStore::open(storage)))
    }

    pub fn new(api: Arc<dyn MediaApi>, watchlist: WatchlistStore) -> Self {
        Self {
            api,
            catalogs: CatalogStore::new(),
            detail: DetailStore::new(),
            search: SearchController::new(),
            watchlist,
        }
    }

    /// Loads one catalog listing if it is not already loaded or in flight.
    pub async fn load_catalog(&mut self, catalog: Catalog) {
        if !self.catalogs.should_fetch(catalog) {
            debug!("{} already loaded, skipping fetch", catalog.label());
            return;
        }
        let generation = self.catalogs.begin(catalog);
        let result = self.api.fetch_catalog(catalog).await;
        if let Err(e) = &result {
            warn!("{} fetch failed: {}", catalog.label(), e);
        }
        self.catalogs.resolve(catalog, generation, result);
    }

    /// Loads every catalog the home view shows. The four requests run
    /// concurrently and settle each listing on its own; one failure never
    /// takes the others down with it.
    pub async fn load_home(&mut self) {
        let mut in_flight = Vec::new();
        for catalog in Catalog::ALL {
            if !self.catalogs.should_fetch(catalog) {
                continue;
            }
            let generation = self.catalogs.begin(catalog);
            let api = self.api.clone();
            in_flight.push((
                catalog,
                generation,
                tokio::spawn(async move { api.fetch_catalog(catalog).await }),
            ));
        }
        for (catalog, generation, handle) in in_flight {
            match handle.await {
                Ok(result) => {
                    if let Err(e) = &result {
                        warn!("{} fetch failed: {}", catalog.label(), e);
                    }
                    self.catalogs.resolve(catalog, generation, result);
                }
                Err(e) => warn!("{} fetch task panicked: {}", catalog.label(), e),
            }
        }
    }

    /// Opens the detail view for a title and fetches its full record.
    pub async fn open_detail(&mut self, kind: MediaKind, id: u64) {
        info!("Loading {} {}", kind.api_path(), id);
        let generation = self.detail.open(kind, id);
        let result = self.api.fetch_detail(kind, id).await;
        if let Err(e) = &result {
            warn!("Detail fetch for {} {} failed: {}", kind.api_path(), id, e);
        }
        self.detail.resolve(generation, result);
    }

    /// Retries the detail fetch for whatever title is currently open.
    pub async fn retry_detail(&mut self) {
        if let Some((kind, id)) = self.detail.current() {
            self.open_detail(kind, id).await;
        }
    }

    /// A keystroke in the search box. The controller arms (or clears) its
    /// quiet period; `drive_search` performs the fetch once it elapses.
    pub fn type_search(&mut self, text: &str) -> InputEffect {
        self.search.on_input(text)
    }

    /// Sleeps out the armed quiet period, then runs the fetch it commits.
    /// A no-op when nothing is armed.
    pub async fn drive_search(&mut self) {
        if let Some(wait) = self.search.time_until_fire() {
            tokio::time::sleep(wait).await;
        }
        if let Some(fetch) = self.search.poll() {
            self.run_search_fetch(fetch).await;
        }
    }

    /// Explicit submit: fetches immediately when the gate passes.
    pub async fn submit_search(&mut self, query: &str) {
        if let Some(fetch) = self.search.on_submit(query) {
            self.run_search_fetch(fetch).await;
        }
    }

    /// Re-runs the last committed query after a failure.
    pub async fn retry_search(&mut self) {
        if let Some(fetch) = self.search.retry() {
            self.run_search_fetch(fetch).await;
        }
    }

    async fn run_search_fetch(&mut self, fetch: SearchFetch) {
        info!("Searching for '{}'", fetch.query);
        let result = self.api.search_multi(&fetch.query).await;
        if let Err(e) = &result {
            warn!("Search for '{}' failed: {}", fetch.query, e);
        }
        self.search.resolve(fetch.generation, result);
    }

    /// Adds the title to the watchlist, or removes it if any bucket already
    /// has that id. Returns true when the item ended up on the list.
    pub fn toggle_watchlist(&mut self, item: &MediaItem) -> bool {
        if self.watchlist.contains(item.id) {
            info!("Removing '{}' from the watchlist", item.title);
            self.watchlist.remove(item.media_kind, item.id);
            false
        } else {
            info!("Adding '{}' to the watchlist", item.title);
            self.watchlist.add(item.clone());
            true
        }
    }
}
