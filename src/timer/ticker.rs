//! Periodic elapsed-time publisher bound to the Running state.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{Clock, TimerState, TimerStatus};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::log_info;

pub struct Ticker {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl Ticker {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Spawns the tick loop, replacing any loop that is still around.
    pub async fn start(
        &mut self,
        state: Arc<Mutex<TimerState>>,
        clock: Arc<dyn Clock>,
        elapsed_tx: Arc<watch::Sender<u64>>,
        interval: Duration,
    ) {
        if let Err(err) = self.stop().await {
            log::warn!("previous ticker did not shut down cleanly: {err:#}");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(tick_loop(
            state,
            clock,
            elapsed_tx,
            interval,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
    }

    /// Cancels the loop and waits for it to exit. The caller must not hold the
    /// timer state lock.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle.await.context("tick loop failed to join")
        } else {
            Ok(())
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

async fn tick_loop(
    state: Arc<Mutex<TimerState>>,
    clock: Arc<dyn Clock>,
    elapsed_tx: Arc<watch::Sender<u64>>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                log_info!("tick loop cancelled");
                break;
            }
            _ = ticker.tick() => {
                let elapsed = {
                    let mut guard = state.lock().await;
                    if guard.status() != TimerStatus::Running {
                        break;
                    }
                    guard.sync_elapsed(clock.now());
                    guard.elapsed_secs()
                };
                elapsed_tx.send_replace(elapsed);
            }
        }
    }
}
