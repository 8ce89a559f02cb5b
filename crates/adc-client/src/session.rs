//! Session management with one-shot recovery.
//!
//! [`SessionManager`] owns the directory capability and the bind account.
//! Every directory call goes through [`SessionManager::execute`]: on a
//! transient connection failure the session is re-established once and the
//! operation re-issued once. Everything else is surfaced as is.
//!
//! ## Concurrency
//!
//! Rebinds are serialised. Each successful bind bumps a generation counter;
//! a caller whose failure was observed on an older generation skips the
//! rebind and retries on the session another caller already restored.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use adc_directory::{DirectoryCapability, DirectoryError, DirectoryResult};
use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::config::BindAccount;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session. Initial state and state after `close`.
    Unbound,
    /// Initial bind in progress.
    Binding,
    /// Session usable.
    Bound,
    /// Re-establishing the session after a transient failure.
    Rebinding,
    /// The last bind or rebind failed.
    Failed,
}

/// Owns one directory session and its recovery policy.
pub struct SessionManager<D> {
    directory: Arc<D>,
    account: BindAccount,
    state: RwLock<SessionState>,
    generation: AtomicU64,
    rebind_lock: Mutex<()>,
}

impl<D: DirectoryCapability> SessionManager<D> {
    /// Creates an unbound session manager.
    pub fn new(directory: Arc<D>, account: BindAccount) -> Self {
        Self {
            directory,
            account,
            state: RwLock::new(SessionState::Unbound),
            generation: AtomicU64::new(0),
            rebind_lock: Mutex::new(()),
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Returns the number of successful binds so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Returns the underlying directory.
    #[must_use]
    pub fn directory(&self) -> &Arc<D> {
        &self.directory
    }

    /// Performs the initial bind.
    pub async fn bind(&self) -> DirectoryResult<()> {
        let _guard = self.rebind_lock.lock().await;
        self.set_state(SessionState::Binding);

        match self
            .directory
            .bind(&self.account.dn, &self.account.password)
            .await
        {
            Ok(()) => {
                self.generation.fetch_add(1, Ordering::AcqRel);
                self.set_state(SessionState::Bound);
                tracing::info!(bind_dn = %self.account.dn, "directory session established");
                Ok(())
            }
            Err(e) => {
                self.set_state(SessionState::Failed);
                tracing::warn!(bind_dn = %self.account.dn, error = %e, "directory bind failed");
                Err(e)
            }
        }
    }

    /// Runs a directory operation against the bound session.
    ///
    /// `op` is called at most twice: once, and once more after a rebind if
    /// the first call failed transiently. The second result is returned
    /// verbatim.
    ///
    /// ## Errors
    ///
    /// - [`DirectoryError::NotBound`] without touching the directory if the
    ///   session was never bound or has been closed.
    /// - The rebind error if re-establishing the session fails. `op` is not
    ///   re-run in that case.
    /// - Otherwise the operation's own error.
    pub async fn execute<T, F, Fut>(&self, operation: &str, op: F) -> DirectoryResult<T>
    where
        F: Fn(Arc<D>) -> Fut,
        Fut: Future<Output = DirectoryResult<T>>,
    {
        if self.state() == SessionState::Unbound {
            return Err(DirectoryError::NotBound);
        }

        let observed = self.generation();
        match op(Arc::clone(&self.directory)).await {
            Err(e) if e.is_transient() => {
                tracing::warn!(operation, error = %e, "transient directory failure, rebinding");
                self.rebind(observed).await?;
                op(Arc::clone(&self.directory)).await
            }
            other => other,
        }
    }

    /// Re-establishes the session unless another caller already did.
    async fn rebind(&self, observed: u64) -> DirectoryResult<()> {
        let _guard = self.rebind_lock.lock().await;

        if self.generation() != observed {
            tracing::debug!(observed, "session already re-established");
            return Ok(());
        }
        if self.state() == SessionState::Unbound {
            return Err(DirectoryError::NotBound);
        }

        self.set_state(SessionState::Rebinding);

        // The old session is unusable; closing it may fail too.
        if let Err(e) = self.directory.unbind().await {
            tracing::debug!(error = %e, "closing broken session failed");
        }

        match self
            .directory
            .bind(&self.account.dn, &self.account.password)
            .await
        {
            Ok(()) => {
                let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
                self.set_state(SessionState::Bound);
                tracing::info!(generation, "directory session re-established");
                Ok(())
            }
            Err(e) => {
                self.set_state(SessionState::Failed);
                tracing::warn!(error = %e, "directory rebind failed");
                Err(e)
            }
        }
    }

    /// Unbinds the session. Later operations fail with `NotBound`.
    pub async fn close(&self) -> DirectoryResult<()> {
        let _guard = self.rebind_lock.lock().await;
        if self.state() == SessionState::Unbound {
            return Ok(());
        }
        self.set_state(SessionState::Unbound);
        self.directory.unbind().await?;
        tracing::info!("directory session closed");
        Ok(())
    }

    fn set_state(&self, state: SessionState) {
        *self.state.write() = state;
    }
}
