use crate::error::UpstreamError;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// State of one fetch family: status, last payload, last error, and the
/// generation of the newest request. Responses carry the generation they
/// were issued for; `resolve` drops any response whose generation no longer
/// matches, so a slow reply can never overwrite newer state.
#[derive(Debug)]
pub struct FetchSlot<T> {
    status: FetchStatus,
    data: Option<T>,
    error: Option<String>,
    generation: u64,
}

impl<T> FetchSlot<T> {
    pub fn new() -> Self {
        Self {
            status: FetchStatus::Idle,
            data: None,
            error: None,
            generation: 0,
        }
    }

    /// Marks the slot Loading and hands out the generation for the request
    /// about to be issued. Existing data stays visible while loading.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.status = FetchStatus::Loading;
        self.error = None;
        self.generation
    }

    /// Applies a response for the given generation. Returns false (and
    /// changes nothing) when the response is stale. A failure keeps the
    /// previous data so the caller can offer a retry over stale results.
    pub fn resolve(&mut self, generation: u64, result: Result<T, UpstreamError>) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "discarding stale response"
            );
            return false;
        }
        match result {
            Ok(data) => {
                self.status = FetchStatus::Ready;
                self.data = Some(data);
                self.error = None;
            }
            Err(e) => {
                self.status = FetchStatus::Failed;
                self.error = Some(e.to_string());
            }
        }
        true
    }

    /// Back to Idle with nothing loaded. Bumps the generation so anything
    /// still in flight resolves into the void.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.status = FetchStatus::Idle;
        self.data = None;
        self.error = None;
    }

    /// Whether a mount-time fetch is warranted: nothing loaded yet and no
    /// request currently in flight.
    pub fn should_fetch(&self) -> bool {
        self.data.is_none() && self.status != FetchStatus::Loading
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl<T> Default for FetchSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream_error(message: &str) -> UpstreamError {
        UpstreamError::Status {
            url: "http://test/endpoint".to_string(),
            status: 500,
            message: message.to_string(),
        }
    }

    #[test]
    fn begin_then_resolve_reaches_ready() {
        let mut slot = FetchSlot::new();
        assert_eq!(slot.status(), FetchStatus::Idle);
        let gen = slot.begin();
        assert_eq!(slot.status(), FetchStatus::Loading);
        assert!(slot.resolve(gen, Ok(vec![1, 2, 3])));
        assert_eq!(slot.status(), FetchStatus::Ready);
        assert_eq!(slot.data(), Some(&vec![1, 2, 3]));
        assert!(slot.error().is_none());
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut slot = FetchSlot::new();
        let old = slot.begin();
        let new = slot.begin();
        assert!(!slot.resolve(old, Ok(vec![1])));
        assert_eq!(slot.status(), FetchStatus::Loading);
        assert!(slot.data().is_none());
        assert!(slot.resolve(new, Ok(vec![2])));
        assert_eq!(slot.data(), Some(&vec![2]));
    }

    #[test]
    fn failure_keeps_previous_data() {
        let mut slot = FetchSlot::new();
        let gen = slot.begin();
        slot.resolve(gen, Ok(vec![7]));
        let gen = slot.begin();
        assert!(slot.resolve(gen, Err(upstream_error("boom"))));
        assert_eq!(slot.status(), FetchStatus::Failed);
        assert_eq!(slot.data(), Some(&vec![7]));
        assert!(slot.error().unwrap().contains("boom"));
    }

    #[test]
    fn reset_invalidates_in_flight_request() {
        let mut slot: FetchSlot<Vec<i32>> = FetchSlot::new();
        let gen = slot.begin();
        slot.reset();
        assert!(!slot.resolve(gen, Ok(vec![1])));
        assert_eq!(slot.status(), FetchStatus::Idle);
        assert!(slot.data().is_none());
    }

    #[test]
    fn ready_slot_does_not_warrant_refetch() {
        let mut slot = FetchSlot::new();
        assert!(slot.should_fetch());
        let gen = slot.begin();
        assert!(!slot.should_fetch());
        slot.resolve(gen, Ok(vec![1]));
        assert!(!slot.should_fetch());
    }
}
