use crate::error::UpstreamError;
use crate::media::MediaItem;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

pub const MIN_QUERY_CHARS: usize = 3;
pub const DEBOUNCE: Duration = Duration::from_millis(500);
pub const PAGE_SIZE: usize = 20;

/// Time source for the debounce deadline. Production uses the system clock;
/// tests drive a manual one.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Empty,
    Debouncing,
    Loading,
    Ready,
    Failed,
}

/// What the driver should do after a keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEffect {
    /// Debounce (re)armed; show or stay on the search view.
    Scheduled,
    /// Input fell below the minimum; results cleared, leave the search view.
    Cleared,
}

/// A fetch the caller must perform. The generation ties the eventual
/// response back to the state that requested it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFetch {
    pub query: String,
    pub generation: u64,
}

/// Keystroke-to-results state machine: a three-character gate, a 500 ms
/// quiet period armed on every keystroke, and a single-shot fetch whose
/// results are paged client-side. No timers run here; the controller only
/// holds a deadline and the driver polls (or sleeps until `deadline`).
pub struct SearchController {
    phase: SearchPhase,
    input: String,
    committed: String,
    results: Vec<MediaItem>,
    error: Option<String>,
    page: usize,
    generation: u64,
    deadline: Option<Instant>,
    clock: Arc<dyn Clock>,
}

impl SearchController {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            phase: SearchPhase::Empty,
            input: String::new(),
            committed: String::new(),
            results: Vec::new(),
            error: None,
            page: 1,
            generation: 0,
            deadline: None,
            clock,
        }
    }

    /// A keystroke. Short input clears the session; anything at or past the
    /// gate (re)arms the quiet period, superseding whatever was pending or
    /// in flight.
    pub fn on_input(&mut self, text: &str) -> InputEffect {
        self.input = text.to_string();
        self.generation += 1;
        if self.input.chars().count() < MIN_QUERY_CHARS {
            self.phase = SearchPhase::Empty;
            self.committed.clear();
            self.results.clear();
            self.error = None;
            self.page = 1;
            self.deadline = None;
            return InputEffect::Cleared;
        }
        self.phase = SearchPhase::Debouncing;
        self.deadline = Some(self.clock.now() + DEBOUNCE);
        InputEffect::Scheduled
    }

    /// Explicit submit: skips the quiet period when the gate passes,
    /// otherwise does nothing at all.
    pub fn on_submit(&mut self, text: &str) -> Option<SearchFetch> {
        if text.chars().count() < MIN_QUERY_CHARS {
            return None;
        }
        self.input = text.to_string();
        self.generation += 1;
        Some(self.commit())
    }

    /// Fires the pending fetch once the quiet period has elapsed. Returns
    /// None while the deadline has not passed (or nothing is pending), so
    /// callers may poll as often as they like.
    pub fn poll(&mut self) -> Option<SearchFetch> {
        if self.phase != SearchPhase::Debouncing {
            return None;
        }
        let due = self.deadline?;
        if self.clock.now() < due {
            return None;
        }
        Some(self.commit())
    }

    /// Re-issues the last committed query after a failure.
    pub fn retry(&mut self) -> Option<SearchFetch> {
        if self.committed.chars().count() < MIN_QUERY_CHARS {
            return None;
        }
        self.generation += 1;
        self.phase = SearchPhase::Loading;
        self.deadline = None;
        Some(SearchFetch {
            query: self.committed.clone(),
            generation: self.generation,
        })
    }

    fn commit(&mut self) -> SearchFetch {
        self.committed = self.input.clone();
        self.page = 1;
        self.phase = SearchPhase::Loading;
        self.deadline = None;
        SearchFetch {
            query: self.committed.clone(),
            generation: self.generation,
        }
    }

    /// Applies a fetch outcome. A response whose generation no longer
    /// matches was superseded by later input and is dropped. A failure keeps
    /// whatever results were on screen; only a successful fetch (or a
    /// below-gate clear) replaces them.
    pub fn resolve(
        &mut self,
        generation: u64,
        result: Result<Vec<MediaItem>, UpstreamError>,
    ) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "discarding stale search response"
            );
            return false;
        }
        match result {
            Ok(items) => {
                self.results = items;
                self.error = None;
                self.phase = SearchPhase::Ready;
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.phase = SearchPhase::Failed;
            }
        }
        true
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// The query the current results (or in-flight fetch) belong to.
    pub fn query(&self) -> &str {
        &self.committed
    }

    pub fn results(&self) -> &[MediaItem] {
        &self.results
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// When the armed quiet period elapses; an async driver can sleep until
    /// this instant and then call `poll`.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Remaining quiet period, measured on the controller's own clock.
    /// Zero once the deadline has passed, None when nothing is armed.
    pub fn time_until_fire(&self) -> Option<Duration> {
        Some(self.deadline?.saturating_duration_since(self.clock.now()))
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        (self.results.len() + PAGE_SIZE - 1) / PAGE_SIZE
    }

    /// Changing page only re-slices the already-fetched set; out-of-range
    /// requests clamp to the nearest valid page.
    pub fn set_page(&mut self, page: usize) {
        let count = self.page_count().max(1);
        self.page = page.clamp(1, count);
    }

    pub fn page_items(&self) -> &[MediaItem] {
        let start = (self.page - 1) * PAGE_SIZE;
        if start >= self.results.len() {
            return &[];
        }
        let end = (start + PAGE_SIZE).min(self.results.len());
        &self.results[start..end]
    }
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaKind;
    use std::sync::Mutex;

    struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(Instant::now()),
            })
        }

        fn advance(&self, d: Duration) {
            *self.now.lock().unwrap() += d;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    fn items(n: usize) -> Vec<MediaItem> {
        (0..n as u64)
            .map(|id| MediaItem {
                id,
                media_kind: MediaKind::Movie,
                title: format!("Result {id}"),
                overview: String::new(),
                poster_url: None,
                backdrop_url: None,
                year: "2024".to_string(),
                vote_average: None,
            })
            .collect()
    }

    fn upstream_error() -> UpstreamError {
        UpstreamError::Status {
            url: "http://test/search".to_string(),
            status: 502,
            message: "bad gateway".to_string(),
        }
    }

    #[test]
    fn two_characters_stay_empty() {
        let clock = ManualClock::new();
        let mut search = SearchController::with_clock(clock);
        assert_eq!(search.on_input("ab"), InputEffect::Cleared);
        assert_eq!(search.phase(), SearchPhase::Empty);
        assert!(search.results().is_empty());
        assert!(search.deadline().is_none());
    }

    #[test]
    fn three_characters_fetch_after_quiet_period() {
        let clock = ManualClock::new();
        let mut search = SearchController::with_clock(clock.clone());
        assert_eq!(search.on_input("abc"), InputEffect::Scheduled);
        assert_eq!(search.phase(), SearchPhase::Debouncing);
        assert_eq!(search.time_until_fire(), Some(DEBOUNCE));

        assert!(search.poll().is_none());
        clock.advance(Duration::from_millis(499));
        assert!(search.poll().is_none());
        clock.advance(Duration::from_millis(1));
        assert_eq!(search.time_until_fire(), Some(Duration::ZERO));

        let fetch = search.poll().expect("quiet period elapsed");
        assert_eq!(fetch.query, "abc");
        assert_eq!(search.phase(), SearchPhase::Loading);
        assert!(search.poll().is_none(), "fetch fires exactly once");
        assert!(search.time_until_fire().is_none());
    }

    #[test]
    fn rapid_typing_fetches_only_the_final_query() {
        let clock = ManualClock::new();
        let mut search = SearchController::with_clock(clock.clone());

        assert_eq!(search.on_input("a"), InputEffect::Cleared);
        assert_eq!(search.on_input("ab"), InputEffect::Cleared);
        assert_eq!(search.on_input("abc"), InputEffect::Scheduled);
        clock.advance(Duration::from_millis(300));
        assert!(search.poll().is_none());
        assert_eq!(search.on_input("abcd"), InputEffect::Scheduled);

        // The earlier deadline has long passed; only the re-armed one counts.
        clock.advance(Duration::from_millis(499));
        assert!(search.poll().is_none());
        clock.advance(Duration::from_millis(1));
        let fetch = search.poll().expect("one fetch for the final text");
        assert_eq!(fetch.query, "abcd");
        assert!(search.poll().is_none());
    }

    #[test]
    fn submit_bypasses_the_quiet_period() {
        let clock = ManualClock::new();
        let mut search = SearchController::with_clock(clock);
        let fetch = search.on_submit("dune part two").expect("gate passed");
        assert_eq!(fetch.query, "dune part two");
        assert_eq!(search.phase(), SearchPhase::Loading);
        assert!(search.on_submit("ab").is_none());
    }

    #[test]
    fn keystroke_supersedes_in_flight_fetch() {
        let clock = ManualClock::new();
        let mut search = SearchController::with_clock(clock);
        let stale = search.on_submit("abc").unwrap();
        assert_eq!(search.on_input("abcd"), InputEffect::Scheduled);

        assert!(!search.resolve(stale.generation, Ok(items(3))));
        assert_eq!(search.phase(), SearchPhase::Debouncing);
        assert!(search.results().is_empty());
    }

    #[test]
    fn clearing_discards_in_flight_fetch() {
        let clock = ManualClock::new();
        let mut search = SearchController::with_clock(clock);
        let stale = search.on_submit("abc").unwrap();
        assert_eq!(search.on_input("ab"), InputEffect::Cleared);

        assert!(!search.resolve(stale.generation, Ok(items(3))));
        assert_eq!(search.phase(), SearchPhase::Empty);
        assert!(search.results().is_empty());
    }

    #[test]
    fn failure_keeps_results_until_superseded() {
        let clock = ManualClock::new();
        let mut search = SearchController::with_clock(clock);

        let first = search.on_submit("batman").unwrap();
        assert!(search.resolve(first.generation, Ok(items(8))));
        assert_eq!(search.phase(), SearchPhase::Ready);

        let second = search.on_submit("batman returns").unwrap();
        assert!(search.resolve(second.generation, Err(upstream_error())));
        assert_eq!(search.phase(), SearchPhase::Failed);
        assert_eq!(search.results().len(), 8, "old results survive the failure");
        assert!(search.error().unwrap().contains("bad gateway"));

        let retried = search.retry().expect("a committed query to retry");
        assert_eq!(retried.query, "batman returns");
        assert!(search.resolve(retried.generation, Ok(items(2))));
        assert_eq!(search.phase(), SearchPhase::Ready);
        assert_eq!(search.results().len(), 2);
        assert!(search.error().is_none());
    }

    #[test]
    fn pagination_slices_fixed_size_pages() {
        let clock = ManualClock::new();
        let mut search = SearchController::with_clock(clock);
        let fetch = search.on_submit("forty five results").unwrap();
        assert!(search.resolve(fetch.generation, Ok(items(45))));

        assert_eq!(search.page_count(), 3);
        assert_eq!(search.page(), 1);
        assert_eq!(search.page_items().len(), 20);
        assert_eq!(search.page_items()[0].id, 0);
        assert_eq!(search.page_items()[19].id, 19);

        search.set_page(3);
        assert_eq!(search.page_items().len(), 5);
        assert_eq!(search.page_items()[0].id, 40);
        assert_eq!(search.page_items()[4].id, 44);

        search.set_page(99);
        assert_eq!(search.page(), 3, "out of range clamps");
    }

    #[test]
    fn page_resets_on_new_committed_query() {
        let clock = ManualClock::new();
        let mut search = SearchController::with_clock(clock);
        let fetch = search.on_submit("first query").unwrap();
        search.resolve(fetch.generation, Ok(items(45)));
        search.set_page(2);
        assert_eq!(search.page(), 2);

        let fetch = search.on_submit("second query").unwrap();
        assert_eq!(search.page(), 1);
        search.resolve(fetch.generation, Ok(items(5)));
        assert_eq!(search.page_count(), 1);
    }

    #[test]
    fn unicode_input_counts_characters_not_bytes() {
        let clock = ManualClock::new();
        let mut search = SearchController::with_clock(clock);
        // Three characters, nine bytes.
        assert_eq!(search.on_input("七人の"), InputEffect::Scheduled);
        assert_eq!(search.phase(), SearchPhase::Debouncing);
    }
}
