//! Lazily created, resettable HTTP client handle.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::client::{ChatClient, ClientError, ClientFactory};

/// Owns at most one live client.
///
/// [`acquire`](Self::acquire) reuses the current client or creates one;
/// [`invalidate`](Self::invalidate) drops it so the next acquire reconnects.
/// The lock is never held while a client is created or used, so two threads
/// may race to create a client; the later one simply replaces the earlier.
pub struct ClientSlot {
    factory: Arc<dyn ClientFactory>,
    timeout: Duration,
    current: Mutex<Option<Arc<dyn ChatClient>>>,
}

impl ClientSlot {
    pub fn new(factory: Arc<dyn ClientFactory>, timeout: Duration) -> Self {
        Self {
            factory,
            timeout,
            current: Mutex::new(None),
        }
    }

    /// Return the current client, creating one if none is live.
    pub fn acquire(&self) -> Result<Arc<dyn ChatClient>, ClientError> {
        if let Some(client) = self.current.lock().as_ref() {
            return Ok(Arc::clone(client));
        }
        let client = self.factory.create(self.timeout)?;
        *self.current.lock() = Some(Arc::clone(&client));
        Ok(client)
    }

    /// Drop the current client, if any. Idempotent.
    pub fn invalidate(&self) {
        let stale = self.current.lock().take();
        drop(stale);
    }

    /// Whether a client is currently held.
    pub fn is_live(&self) -> bool {
        self.current.lock().is_some()
    }
}

impl std::fmt::Debug for ClientSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSlot")
            .field("timeout", &self.timeout)
            .field("live", &self.is_live())
            .finish()
    }
}
