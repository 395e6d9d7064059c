use crate::error::UpstreamError;
use crate::fetch::{FetchSlot, FetchStatus};
use crate::media::{MediaDetail, MediaKind};

/// State for the one detail view on screen. Opening a title clears whatever
/// was shown before, so a slow response for the previous title can never
/// overwrite the one the user is actually looking at.
#[derive(Default)]
pub struct DetailStore {
    slot: FetchSlot<MediaDetail>,
    current: Option<(MediaKind, u64)>,
}

impl DetailStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a visit to a title. Always fetches fresh; detail pages are
    /// never served from a previous visit.
    pub fn open(&mut self, kind: MediaKind, id: u64) -> u64 {
        self.current = Some((kind, id));
        self.slot.reset();
        self.slot.begin()
    }

    pub fn resolve(
        &mut self,
        generation: u64,
        result: Result<MediaDetail, UpstreamError>,
    ) -> bool {
        self.slot.resolve(generation, result)
    }

    /// Leaving the detail view. Anything still in flight resolves stale.
    pub fn close(&mut self) {
        self.current = None;
        self.slot.reset();
    }

    /// The title this store is (or was last) fetching for.
    pub fn current(&self) -> Option<(MediaKind, u64)> {
        self.current
    }

    pub fn status(&self) -> FetchStatus {
        self.slot.status()
    }

    pub fn detail(&self) -> Option<&MediaDetail> {
        self.slot.data()
    }

    pub fn error(&self) -> Option<&str> {
        self.slot.error()
    }
}
