//! Post-success auto-redirect timer
//!
//! Counts down once per second and navigates exactly once at zero. Dropping
//! or cancelling the handle aborts the timer, so a page that is torn down
//! mid-countdown never fires a stray redirect.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

use super::view::{ControllerEvent, EventSender};
use crate::navigation::{Navigator, Route};

const TICK: Duration = Duration::from_secs(1);

pub struct Countdown {
    remaining: watch::Receiver<u32>,
    handle: JoinHandle<()>,
    done: bool,
}

impl Countdown {
    pub fn start(
        seconds: u32,
        route: Route,
        navigator: Arc<dyn Navigator>,
        events: Option<EventSender>,
    ) -> Self {
        let (tx, remaining) = watch::channel(seconds);

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            let mut left = seconds;

            while left > 0 {
                ticker.tick().await;
                left -= 1;
                let _ = tx.send(left);
                if let Some(events) = &events {
                    let _ = events.send(ControllerEvent::Tick { remaining: left });
                }
            }

            info!("Redirect countdown finished, navigating to {}", route);
            navigator.navigate(&route);
        });

        Self {
            remaining,
            handle,
            done: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        *self.remaining.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.remaining.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.done || self.handle.is_finished()
    }

    /// Wait for the navigation to fire (or the timer to be aborted)
    pub async fn finished(&mut self) {
        if self.done {
            return;
        }
        let _ = (&mut self.handle).await;
        self.done = true;
    }

    /// Clear the timer; no navigation happens afterwards
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if !self.is_finished() {
            debug!(
                "Redirect countdown cancelled with {}s remaining",
                self.remaining()
            );
        }
        self.handle.abort();
    }
}
