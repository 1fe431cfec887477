//! Kitchen-delay watcher
//!
//! 会话打开时启动，关闭/销毁时取消。每个周期查询一次厨房延迟，
//! 把 ETA 写回本地条目，并通过 watch channel 广播最新结果。

use crate::store::SessionStore;
use dine_client::DineBackend;
use futures::FutureExt;
use parking_lot::RwLock;
use shared::SessionId;
use shared::response::KitchenDelay;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Handle to a running watcher. Dropping it cancels the task.
pub struct DelayWatcher {
    session_id: SessionId,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl DelayWatcher {
    pub fn spawn(
        backend: Arc<dyn DineBackend>,
        session_id: SessionId,
        store: Arc<RwLock<SessionStore>>,
        delays_tx: watch::Sender<Vec<KitchenDelay>>,
        interval: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        let task = poll_loop(
            backend,
            session_id.clone(),
            store,
            delays_tx,
            interval,
            token.clone(),
        );
        let watched = session_id.clone();
        let handle = tokio::spawn(async move {
            if let Err(panic_info) = AssertUnwindSafe(task).catch_unwind().await {
                let msg = panic_info
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic_info.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(session_id = %watched, panic = %msg, "Delay watcher panicked");
            }
        });
        tracing::debug!(session_id = %session_id, interval_secs = interval.as_secs(), "Delay watcher started");
        Self {
            session_id,
            token,
            handle,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled() && !self.handle.is_finished()
    }

    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            self.token.cancel();
            tracing::debug!(session_id = %self.session_id, "Delay watcher stopped");
        }
    }
}

impl Drop for DelayWatcher {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn poll_loop(
    backend: Arc<dyn DineBackend>,
    session_id: SessionId,
    store: Arc<RwLock<SessionStore>>,
    delays_tx: watch::Sender<Vec<KitchenDelay>>,
    interval: Duration,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match backend.kitchen_delays(&session_id).await {
            Ok(delays) => {
                if token.is_cancelled() {
                    break;
                }
                if !delays.is_empty() {
                    tracing::info!(session_id = %session_id, delayed = delays.len(), "Kitchen delays reported");
                }
                {
                    let mut store = store.write();
                    if store.session_id() == Some(&session_id) {
                        store.apply_delays(&delays);
                    }
                }
                delays_tx.send_replace(delays);
            }
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "Kitchen delay check failed");
            }
        }
    }
}
