//! # Service - delivery of items to the recording service
//!
//! The recording service itself lives in another process; this crate only
//! models the seams used to reach it:
//!
//! - [`MetricsService`]: a bound handle that accepts items or encoded buffers.
//! - [`ServiceLocator`]: looks a handle up by name.
//! - [`ServiceConnection`]: the process-wide, lazily-bound connection that
//!   spends a bounded number of lookup attempts and rebinds after a
//!   disconnect.
//!
//! ```text
//! self_record(item)
//!     |
//!     v
//! acquire() ── disabled ──────────────> false
//!     |
//!     | unbound, attempts left → locator.locate(name)
//!     |                               | miss → attempts -= 1
//!     v                               v
//! service.submit(item) ── Err ──> warn, false (Disconnected → reset)
//!     |
//!     v
//!   true
//! ```

mod connection;

use item::{Item, MetricsError};
use std::sync::Arc;
use thiserror::Error;

pub use connection::ServiceConnection;

/// Errors a [`MetricsService`] may report for a single submission.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The item could not be encoded for transport.
    #[error("encode failed: {0}")]
    Encode(#[from] MetricsError),

    /// An underlying I/O error in the transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The service refused the submission.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The remote end went away; the handle must not be reused.
    #[error("service disconnected")]
    Disconnected,
}

/// A bound handle to the recording service.
pub trait MetricsService: Send + Sync {
    /// Delivers an already-encoded item (byte-codec form).
    fn submit_buffer(&self, buf: &[u8]) -> Result<(), ServiceError>;

    /// Delivers `item`. By default it is encoded with the byte codec and
    /// passed to [`submit_buffer`](Self::submit_buffer).
    fn submit(&self, item: &Item) -> Result<(), ServiceError> {
        let buf = bytestring::write_to_byte_string(item)?;
        self.submit_buffer(&buf)
    }
}

/// Finds the recording service by name.
pub trait ServiceLocator: Send + Sync {
    /// Returns a handle, or `None` when no service is registered under `name`.
    fn locate(&self, name: &str) -> Option<Arc<dyn MetricsService>>;
}
