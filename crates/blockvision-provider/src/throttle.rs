//! One-time rate-limit notice for the shared community key.

use std::sync::atomic::{AtomicBool, Ordering};

/// Emits a single rate-limit notice per instance, no matter how many times
/// the transport reports throttling.
///
/// Providers built with the community key share [`shared_notice`], so the
/// warning prints at most once per process. Tests construct their own
/// instances (or call [`reset`](Self::reset)) to get a clean latch.
#[derive(Debug, Default)]
pub struct ThrottleNotice {
    fired: AtomicBool,
}

impl ThrottleNotice {
    pub const fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
        }
    }

    /// Emit the notice if it has not fired yet.
    pub fn fire(&self) {
        if self.fired.swap(true, Ordering::Relaxed) {
            return;
        }
        tracing::warn!(
            "Request-Rate Exceeded (this message will not be repeated). \
             The default API key is a highly-throttled community resource for \
             low-traffic projects and early prototyping. Sign up for your own \
             API key to improve performance and increase your request rate: \
             https://docs.blockvision.org/blockvision/introduction/how-to-guides/"
        );
    }

    /// Whether the notice has been emitted.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Relaxed)
    }

    /// Re-arm the latch. Intended for tests.
    pub fn reset(&self) {
        self.fired.store(false, Ordering::Relaxed);
    }
}

/// The process-wide latch shared by all community-key providers.
/// Initialized unfired at process start, set on first trigger, never reset
/// outside of tests.
static SHARED_NOTICE: ThrottleNotice = ThrottleNotice::new();

pub fn shared_notice() -> &'static ThrottleNotice {
    &SHARED_NOTICE
}
