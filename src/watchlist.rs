use crate::media::{MediaItem, MediaKind};
use crate::storage::WatchlistStorage;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The persisted blob: two ordered, disjoint collections. Field names stay
/// camelCase on disk (`movies`, `tvSeries`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistState {
    #[serde(default)]
    pub movies: Vec<MediaItem>,
    #[serde(default)]
    pub tv_series: Vec<MediaItem>,
}

/// Owns the two watchlist collections and the storage written after every
/// mutation. Dedup key is `(media kind, id)`; the check runs before the push
/// so no duplicate is ever observable, even mid-call. Persistence failures
/// degrade durability only: they are logged and the in-memory state stays
/// authoritative for the session.
pub struct WatchlistStore {
    state: WatchlistState,
    storage: Box<dyn WatchlistStorage>,
}

impl WatchlistStore {
    /// Loads the persisted state once. Missing or unreadable state starts
    /// the session with an empty watchlist instead of failing.
    pub fn open<S: WatchlistStorage + 'static>(storage: S) -> Self {
        let state = match storage.load() {
            Ok(Some(state)) => state,
            Ok(None) => WatchlistState::default(),
            Err(e) => {
                warn!("Could not load watchlist, starting empty: {}", e);
                WatchlistState::default()
            }
        };
        Self {
            state,
            storage: Box::new(storage),
        }
    }

    /// No-op when an entry with the same kind and id is already present.
    pub fn add(&mut self, item: MediaItem) {
        let bucket = self.bucket_mut(item.media_kind);
        if bucket.iter().any(|m| m.id == item.id) {
            return;
        }
        bucket.push(item);
        self.persist();
    }

    pub fn remove(&mut self, kind: MediaKind, id: u64) {
        self.bucket_mut(kind).retain(|m| m.id != id);
        self.persist();
    }

    /// Id-only membership check across both collections, the behavior the
    /// watchlist button relies on.
    pub fn contains(&self, id: u64) -> bool {
        self.state
            .movies
            .iter()
            .chain(self.state.tv_series.iter())
            .any(|m| m.id == id)
    }

    pub fn movies(&self) -> &[MediaItem] {
        &self.state.movies
    }

    pub fn tv_series(&self) -> &[MediaItem] {
        &self.state.tv_series
    }

    fn bucket_mut(&mut self, kind: MediaKind) -> &mut Vec<MediaItem> {
        match kind {
            MediaKind::Movie => &mut self.state.movies,
            MediaKind::TvSeries => &mut self.state.tv_series,
        }
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.state) {
            warn!("Failed to persist watchlist: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MemoryStorage {
        inner: Arc<Mutex<Option<WatchlistState>>>,
    }

    impl WatchlistStorage for MemoryStorage {
        fn load(&self) -> Result<Option<WatchlistState>, PersistenceError> {
            Ok(self.inner.lock().unwrap().clone())
        }

        fn save(&self, state: &WatchlistState) -> Result<(), PersistenceError> {
            *self.inner.lock().unwrap() = Some(state.clone());
            Ok(())
        }
    }

    struct FailingStorage;

    impl WatchlistStorage for FailingStorage {
        fn load(&self) -> Result<Option<WatchlistState>, PersistenceError> {
            Err(PersistenceError::DataDirUnavailable)
        }

        fn save(&self, _state: &WatchlistState) -> Result<(), PersistenceError> {
            Err(PersistenceError::DataDirUnavailable)
        }
    }

    fn item(id: u64, kind: MediaKind, title: &str) -> MediaItem {
        MediaItem {
            id,
            media_kind: kind,
            title: title.to_string(),
            overview: String::new(),
            poster_url: None,
            backdrop_url: None,
            year: "2024".to_string(),
            vote_average: Some(7.0),
        }
    }

    #[test]
    fn add_is_idempotent_per_kind() {
        let mut store = WatchlistStore::open(MemoryStorage::default());
        store.add(item(1, MediaKind::Movie, "One"));
        store.add(item(1, MediaKind::Movie, "One again"));
        assert_eq!(store.movies().len(), 1);
        assert_eq!(store.movies()[0].title, "One");
    }

    #[test]
    fn same_id_may_exist_in_both_collections() {
        let mut store = WatchlistStore::open(MemoryStorage::default());
        store.add(item(1, MediaKind::Movie, "Movie"));
        store.add(item(1, MediaKind::TvSeries, "Show"));
        assert_eq!(store.movies().len(), 1);
        assert_eq!(store.tv_series().len(), 1);
    }

    #[test]
    fn mixed_mutations_never_produce_duplicates() {
        let mut store = WatchlistStore::open(MemoryStorage::default());
        for id in [1, 2, 3, 2, 1, 3, 2] {
            store.add(item(id, MediaKind::Movie, "m"));
        }
        store.remove(MediaKind::Movie, 2);
        store.add(item(2, MediaKind::Movie, "m"));
        store.add(item(2, MediaKind::Movie, "m"));

        let mut ids: Vec<u64> = store.movies().iter().map(|m| m.id).collect();
        let len = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), len);
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut store = WatchlistStore::open(MemoryStorage::default());
        for id in [10, 20, 30] {
            store.add(item(id, MediaKind::TvSeries, "s"));
        }
        store.remove(MediaKind::TvSeries, 20);
        let ids: Vec<u64> = store.tv_series().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![10, 30]);
        // Removing an absent id is a quiet no-op.
        store.remove(MediaKind::TvSeries, 99);
        assert_eq!(store.tv_series().len(), 2);
    }

    #[test]
    fn contains_checks_either_collection() {
        let mut store = WatchlistStore::open(MemoryStorage::default());
        store.add(item(5, MediaKind::Movie, "m"));
        store.add(item(6, MediaKind::TvSeries, "s"));
        assert!(store.contains(5));
        assert!(store.contains(6));
        assert!(!store.contains(7));
    }

    #[test]
    fn mutations_round_trip_through_storage() {
        let storage = MemoryStorage::default();
        {
            let mut store = WatchlistStore::open(storage.clone());
            store.add(item(1, MediaKind::Movie, "A"));
            store.add(item(2, MediaKind::Movie, "B"));
            store.add(item(3, MediaKind::TvSeries, "C"));
            store.remove(MediaKind::Movie, 1);
        }
        let reopened = WatchlistStore::open(storage);
        let movie_ids: Vec<u64> = reopened.movies().iter().map(|m| m.id).collect();
        let tv_ids: Vec<u64> = reopened.tv_series().iter().map(|m| m.id).collect();
        assert_eq!(movie_ids, vec![2]);
        assert_eq!(tv_ids, vec![3]);
    }

    #[test]
    fn unreadable_storage_opens_empty() {
        let store = WatchlistStore::open(FailingStorage);
        assert!(store.movies().is_empty());
        assert!(store.tv_series().is_empty());
    }

    #[test]
    fn save_failure_keeps_memory_state() {
        let mut store = WatchlistStore::open(FailingStorage);
        store.add(item(1, MediaKind::Movie, "Kept"));
        assert_eq!(store.movies().len(), 1);
        assert!(store.contains(1));
    }
}
