use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Identifies one started request; higher tokens were started later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Lets only the most recently *started* request apply its result.
///
/// Completion order does not matter: a slow early request that finishes
/// after a later one is discarded. Once closed, nothing is current anymore.
#[derive(Debug, Default)]
pub struct RequestGate {
    latest: AtomicU64,
    closed: AtomicBool,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        !self.closed.load(Ordering::SeqCst) && self.latest.load(Ordering::SeqCst) == token.0
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
