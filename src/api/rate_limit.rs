//! Client-side cooldown gate shared by every catalogue request

use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::core::clock::{Clock, SystemClock};
use crate::core::error::{ExtensionError, Result};

/// Cooldown applied after the catalogue answers 429
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// Client-side rate-limit guard
///
/// A single blunt cooldown: once the server answers 429, every call is
/// rejected locally until `cooldown` has elapsed. The server's `Retry-After`
/// hint is not consulted. Clones share the same state.
#[derive(Clone)]
pub struct RateLimitGuard {
    state: Arc<RwLock<RateLimitState>>,
    clock: Arc<dyn Clock>,
    cooldown: Duration,
}

/// Snapshot of the guard's state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitState {
    pub limited: bool,
    pub reset_at_epoch_ms: u64,
}

impl RateLimitGuard {
    pub fn new(cooldown: Duration) -> Self {
        Self::with_clock(cooldown, Arc::new(SystemClock))
    }

    pub fn with_clock(cooldown: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(RateLimitState::default())),
            clock,
            cooldown,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Reject the call if the cooldown is still running
    ///
    /// An expired cooldown is cleared here, so the next 429 starts a fresh one.
    pub fn check(&self) -> Result<()> {
        let now = self.clock.now_ms();
        let state = self.snapshot();

        if !state.limited {
            return Ok(());
        }

        if now < state.reset_at_epoch_ms {
            tracing::debug!(
                remaining_ms = state.reset_at_epoch_ms - now,
                "Rejecting call, rate-limit cooldown active"
            );
            return Err(ExtensionError::RateLimited);
        }

        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        // Another task may have tripped the guard again in the meantime
        if guard.reset_at_epoch_ms <= now {
            guard.limited = false;
        }
        Ok(())
    }

    /// Record a 429 from the server
    pub fn trip(&self) {
        let cooldown_ms = u64::try_from(self.cooldown.as_millis()).unwrap_or(u64::MAX);
        let reset_at = self.clock.now_ms().saturating_add(cooldown_ms);

        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.limited = true;
        state.reset_at_epoch_ms = reset_at;

        tracing::warn!(
            reset_at_epoch_ms = reset_at,
            cooldown_secs = self.cooldown.as_secs(),
            "Catalogue rate limit hit, cooling down"
        );
    }

    /// Whether calls are currently being rejected
    pub fn is_limited(&self) -> bool {
        let state = self.snapshot();
        state.limited && self.clock.now_ms() < state.reset_at_epoch_ms
    }

    pub fn snapshot(&self) -> RateLimitState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for RateLimitGuard {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

impl std::fmt::Debug for RateLimitGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitGuard")
            .field("state", &self.snapshot())
            .field("cooldown", &self.cooldown)
            .finish()
    }
}
