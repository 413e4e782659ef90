use config::MetricsConfig;
use item::Item;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{MetricsService, ServiceError, ServiceLocator};

struct State {
    service: Option<Arc<dyn MetricsService>>,
    remaining_attempts: u32,
}

/// Lazily-bound connection to the recording service.
///
/// The first [`acquire`](Self::acquire) looks the service up through the
/// locator. Each failed lookup spends one attempt; once the budget is gone the
/// connection stays unbound until [`reset`](Self::reset). A disconnect drops
/// the handle and restores the budget so the next call rebinds.
///
/// All methods take `&self`; the handle and budget sit behind one `Mutex`.
/// Submissions run on a cloned handle after the lock is released.
pub struct ServiceConnection {
    config: MetricsConfig,
    locator: Arc<dyn ServiceLocator>,
    state: Mutex<State>,
}

impl ServiceConnection {
    pub fn new(config: MetricsConfig, locator: Arc<dyn ServiceLocator>) -> Self {
        let state = State {
            service: None,
            remaining_attempts: config.bind_attempts,
        };
        Self {
            config,
            locator,
            state: Mutex::new(state),
        }
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn is_bound(&self) -> bool {
        self.state().service.is_some()
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.state().remaining_attempts
    }

    // The state is a handle plus a counter; a panic elsewhere cannot leave it
    // half-updated, so a poisoned lock is still usable.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns the bound service, binding it first if needed.
    ///
    /// `None` when delivery is disabled, when the lookup fails, or when the
    /// attempt budget is already spent.
    pub fn acquire(&self) -> Option<Arc<dyn MetricsService>> {
        if !self.config.enabled {
            let mut state = self.state();
            if state.service.take().is_some() {
                debug!("delivery disabled, dropping bound service");
            }
            return None;
        }

        let mut state = self.state();
        if state.service.is_none() && state.remaining_attempts > 0 {
            match self.locator.locate(&self.config.service_name) {
                Some(svc) => {
                    debug!(name = %self.config.service_name, "bound to metrics service");
                    state.service = Some(svc);
                }
                None => {
                    state.remaining_attempts -= 1;
                    warn!(
                        name = %self.config.service_name,
                        remaining = state.remaining_attempts,
                        "metrics service lookup failed"
                    );
                }
            }
        }
        state.service.clone()
    }

    /// Drops the bound handle and restores the full attempt budget.
    pub fn reset(&self) {
        let mut state = self.state();
        state.service = None;
        state.remaining_attempts = self.config.bind_attempts;
    }

    /// Called when the remote service goes away.
    pub fn on_disconnect(&self) {
        warn!(name = %self.config.service_name, "metrics service disconnected");
        self.reset();
    }

    /// Submits `item` to the recording service.
    ///
    /// Returns `false` when delivery is unavailable or the service reports a
    /// failure. The item is never modified.
    pub fn self_record(&self, item: &Item) -> bool {
        let Some(svc) = self.acquire() else {
            debug!(key = item.key(), "no metrics service, item not recorded");
            return false;
        };
        let result = svc.submit(item);
        self.finish("submit", item.key(), result)
    }

    /// Submits an already-encoded item.
    pub fn submit_buffer(&self, buf: &[u8]) -> bool {
        let Some(svc) = self.acquire() else {
            debug!(len = buf.len(), "no metrics service, buffer not submitted");
            return false;
        };
        let result = svc.submit_buffer(buf);
        self.finish("submit_buffer", "", result)
    }

    fn finish(&self, op: &str, key: &str, result: Result<(), ServiceError>) -> bool {
        match result {
            Ok(()) => true,
            Err(ServiceError::Disconnected) => {
                self.on_disconnect();
                false
            }
            Err(e) => {
                warn!(op, key, "metrics delivery failed: {}", e);
                false
            }
        }
    }
}

impl fmt::Debug for ServiceConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("ServiceConnection")
            .field("config", &self.config)
            .field("bound", &state.service.is_some())
            .field("remaining_attempts", &state.remaining_attempts)
            .finish()
    }
}
