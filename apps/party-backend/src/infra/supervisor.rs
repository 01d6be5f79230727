//! Connection supervisor for the backing store.
//!
//! Owns the current connection handle, probes it on a fixed interval from a
//! background task, and rebuilds it when a probe fails. Callers only ever see
//! `connection()`; a rebuilt handle is picked up on their next call.
//!
//! Rebuilds are serialized by an async mutex. A rebuild that was requested
//! against a generation that has already been replaced is skipped, so a burst
//! of failed probes produces one reconnect.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{timeout, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::errors::domain::{DomainError, InfraErrorKind};

/// Builds and probes connection handles for one store.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Cheaply clonable handle shared by every caller.
    type Conn: Clone + Send + Sync + 'static;

    /// Human-readable target for logs. Must not contain credentials.
    fn target(&self) -> String;

    async fn connect(&self) -> Result<Self::Conn, DomainError>;

    async fn ping(&self, conn: &mut Self::Conn) -> Result<(), DomainError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorSettings {
    pub probe_interval: Duration,
    /// Bound on connect (initial and rebuild) and on each probe.
    pub timeout: Duration,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            probe_interval: Duration::from_secs(5),
            timeout: Duration::from_millis(2000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    Rebuilt,
    RebuildFailed,
    /// Another rebuild replaced the handle while this one waited.
    Skipped,
}

pub struct ConnectionSupervisor<C: Connector> {
    connector: C,
    settings: SupervisorSettings,
    current: RwLock<C::Conn>,
    rebuild_lock: tokio::sync::Mutex<()>,
    generation: AtomicU64,
    cancel: CancellationToken,
    probe_task: Mutex<Option<JoinHandle<()>>>,
}

impl<C: Connector> ConnectionSupervisor<C> {
    /// Connect once and start the background probe.
    pub async fn start(connector: C, settings: SupervisorSettings) -> Result<Arc<Self>, DomainError> {
        let supervisor = Self::connect_only(connector, settings).await?;

        let task = tokio::spawn(probe_loop(
            Arc::downgrade(&supervisor),
            settings.probe_interval,
            supervisor.cancel.clone(),
        ));
        *supervisor.probe_task.lock() = Some(task);

        Ok(supervisor)
    }

    /// Connect without starting the probe; `probe_once` drives it manually.
    pub async fn connect_only(
        connector: C,
        settings: SupervisorSettings,
    ) -> Result<Arc<Self>, DomainError> {
        let conn = connect_with_timeout(&connector, settings.timeout).await?;
        info!(
            target_store = %connector.target(),
            probe_interval_ms = settings.probe_interval.as_millis() as u64,
            timeout_ms = settings.timeout.as_millis() as u64,
            "store connection established"
        );

        Ok(Arc::new(Self {
            connector,
            settings,
            current: RwLock::new(conn),
            rebuild_lock: tokio::sync::Mutex::new(()),
            generation: AtomicU64::new(0),
            cancel: CancellationToken::new(),
            probe_task: Mutex::new(None),
        }))
    }

    /// Handle to the current connection.
    pub fn connection(&self) -> C::Conn {
        self.current.read().clone()
    }

    /// Number of completed rebuilds.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn settings(&self) -> SupervisorSettings {
        self.settings
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Ping the current handle and rebuild it if the ping fails.
    pub async fn probe_once(&self) -> ProbeOutcome {
        let seen = self.generation();
        let mut conn = self.connection();

        match timeout(self.settings.timeout, self.connector.ping(&mut conn)).await {
            Ok(Ok(())) => {
                debug!(generation = seen, "store probe ok");
                ProbeOutcome::Healthy
            }
            Ok(Err(err)) => {
                error!(error = %err, generation = seen, "store probe failed, rebuilding connection");
                self.rebuild_from(seen).await
            }
            Err(_) => {
                error!(
                    timeout_ms = self.settings.timeout.as_millis() as u64,
                    generation = seen,
                    "store probe timed out, rebuilding connection"
                );
                self.rebuild_from(seen).await
            }
        }
    }

    /// Replace the current handle unconditionally.
    pub async fn force_rebuild(&self) -> ProbeOutcome {
        self.rebuild_from(self.generation()).await
    }

    async fn rebuild_from(&self, seen_generation: u64) -> ProbeOutcome {
        let _guard = self.rebuild_lock.lock().await;

        if self.generation() != seen_generation {
            debug!(
                seen_generation,
                current_generation = self.generation(),
                "store rebuild skipped, already replaced"
            );
            return ProbeOutcome::Skipped;
        }

        match connect_with_timeout(&self.connector, self.settings.timeout).await {
            Ok(conn) => {
                let previous = std::mem::replace(&mut *self.current.write(), conn);
                drop(previous);
                let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
                info!(
                    target_store = %self.connector.target(),
                    generation,
                    "store connection rebuilt"
                );
                ProbeOutcome::Rebuilt
            }
            Err(err) => {
                error!(
                    target_store = %self.connector.target(),
                    error = %err,
                    "store reconnect failed, keeping previous handle"
                );
                ProbeOutcome::RebuildFailed
            }
        }
    }

    /// Stop the probe and wait for it to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let task = self.probe_task.lock().take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                warn!(error = %err, "store probe task ended abnormally");
            }
        }
        info!(target_store = %self.connector.target(), "store supervisor stopped");
    }
}

impl<C: Connector> Drop for ConnectionSupervisor<C> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn connect_with_timeout<C: Connector>(
    connector: &C,
    limit: Duration,
) -> Result<C::Conn, DomainError> {
    match timeout(limit, connector.connect()).await {
        Ok(result) => result,
        Err(_) => Err(DomainError::infra(
            InfraErrorKind::Timeout,
            format!(
                "connecting to {} timed out after {}ms",
                connector.target(),
                limit.as_millis()
            ),
        )),
    }
}

async fn probe_loop<C: Connector>(
    supervisor: Weak<ConnectionSupervisor<C>>,
    every: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; the handle was just connected.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let Some(supervisor) = supervisor.upgrade() else {
            break;
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = supervisor.probe_once() => {}
        }
    }

    debug!("store probe loop exited");
}
