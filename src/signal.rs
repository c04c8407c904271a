//! Interrupt handling.
//!
//! A generation pass is not resumable: on SIGINT or SIGTERM the whole pass
//! is abandoned. The signal is watched from its own task and recorded on a
//! [`ShutdownToken`], so work that blocks its thread (the write phase) still
//! sees it at its next check. Work parked on an `.await` is dropped right
//! away, and any staged output is dropped with it.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::error::SinkholeError;

#[derive(Debug, Default)]
struct Shutdown {
    requested: AtomicBool,
    notify: Notify,
}

/// Shared cancellation flag for one generation pass.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    inner: Arc<Shutdown>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation on this token and every clone of it.
    pub fn cancel(&self) {
        self.inner.requested.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancellation was requested.
    #[inline]
    pub fn check(&self) -> Result<(), SinkholeError> {
        if self.is_cancelled() {
            Err(SinkholeError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolve once cancellation was requested.
    pub async fn cancelled(&self) {
        loop {
            // Registered before the flag is read so a concurrent cancel is not missed
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Resolve when the process receives SIGINT or SIGTERM.
///
/// If no handler can be registered (restricted environments) this never
/// resolves, so the guarded work simply runs to completion.
pub async fn interrupted() {
    let sigint = signal(SignalKind::interrupt())
        .map_err(|e| warn!("Failed to register SIGINT handler: {}", e))
        .ok();
    let sigterm = signal(SignalKind::terminate())
        .map_err(|e| warn!("Failed to register SIGTERM handler: {}", e))
        .ok();

    match (sigint, sigterm) {
        (Some(mut int), Some(mut term)) => {
            tokio::select! {
                _ = int.recv() => info!("Received SIGINT, aborting"),
                _ = term.recv() => info!("Received SIGTERM, aborting"),
            }
        }
        (Some(mut int), None) => {
            int.recv().await;
            info!("Received SIGINT, aborting");
        }
        (None, Some(mut term)) => {
            term.recv().await;
            info!("Received SIGTERM, aborting");
        }
        (None, None) => {
            warn!("No signal handlers registered - interrupts will not abort cleanly");
            std::future::pending::<()>().await;
        }
    }
}

/// Run `work` unless `cancel` resolves first.
///
/// `cancel` is awaited on a spawned task that cancels `token`, so it fires
/// even while `work` is inside a synchronous section. `work` is expected to
/// check `token` in such sections.
pub async fn cancel_on<T, W, C>(
    work: W,
    cancel: C,
    token: &ShutdownToken,
) -> Result<T, SinkholeError>
where
    W: Future<Output = T>,
    C: Future<Output = ()> + Send + 'static,
{
    let watcher = {
        let token = token.clone();
        tokio::spawn(async move {
            cancel.await;
            token.cancel();
        })
    };

    let result = tokio::select! {
        output = work => Ok(output),
        _ = token.cancelled() => Err(SinkholeError::Cancelled),
    };

    watcher.abort();
    result
}

/// Run `work`, abandoning it on SIGINT or SIGTERM.
pub async fn cancellable<T, W>(work: W, token: &ShutdownToken) -> Result<T, SinkholeError>
where
    W: Future<Output = T>,
{
    cancel_on(work, interrupted(), token).await
}
