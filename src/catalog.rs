use crate::error::UpstreamError;
use crate::fetch::{FetchSlot, FetchStatus};
use crate::media::{Catalog, MediaItem};

/// State for the four home-screen listings. Each catalog loads, fails and
/// retries independently; one bad listing never blanks the others.
#[derive(Default)]
pub struct CatalogStore {
    slots: [FetchSlot<Vec<MediaItem>>; 4],
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, catalog: Catalog) -> &FetchSlot<Vec<MediaItem>> {
        &self.slots[catalog as usize]
    }

    fn slot_mut(&mut self, catalog: Catalog) -> &mut FetchSlot<Vec<MediaItem>> {
        &mut self.slots[catalog as usize]
    }

    /// Whether a view showing this catalog should kick off a fetch.
    pub fn should_fetch(&self, catalog: Catalog) -> bool {
        self.slot(catalog).should_fetch()
    }

    pub fn begin(&mut self, catalog: Catalog) -> u64 {
        self.slot_mut(catalog).begin()
    }

    pub fn resolve(
        &mut self,
        catalog: Catalog,
        generation: u64,
        result: Result<Vec<MediaItem>, UpstreamError>,
    ) -> bool {
        self.slot_mut(catalog).resolve(generation, result)
    }

    pub fn status(&self, catalog: Catalog) -> FetchStatus {
        self.slot(catalog).status()
    }

    pub fn items(&self, catalog: Catalog) -> Option<&[MediaItem]> {
        self.slot(catalog).data().map(Vec::as_slice)
    }

    pub fn error(&self, catalog: Catalog) -> Option<&str> {
        self.slot(catalog).error()
    }
}
