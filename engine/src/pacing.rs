//! Cancellable pacing pauses.
//!
//! Dealer draws and end-of-round resets are deliberately slowed down for
//! presentation. Those pauses must die instantly when the session closes,
//! so they race a watch channel instead of sleeping unconditionally.

use std::time::Duration;
use tokio::sync::watch;

/// Held by the session owner; dropping it cancels every token.
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Sleep for `duration` unless cancelled first. Returns `true` when the full
/// pause elapsed, `false` when it was cut short. A dropped [`CancelHandle`]
/// counts as cancellation.
pub async fn pause(duration: Duration, cancel: &CancelToken) -> bool {
    if duration.is_zero() {
        return !cancel.is_cancelled();
    }
    let mut rx = cancel.rx.clone();
    if *rx.borrow() {
        return false;
    }
    let sleep = tokio::time::sleep(duration);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return true,
            changed = rx.changed() => {
                if changed.is_err() || *rx.borrow() {
                    return false;
                }
            }
        }
    }
}
