//! Stream activation polling.
//!
//! The decoder offers no push notification for "first valid frame", so a
//! background thread retries playback on a fixed cadence until the stream
//! reports a valid resolution. Sessions are cancellable: waiting happens in a
//! `select!` over the cancel channel instead of a plain sleep, so a stop does
//! not have to ride out the remainder of an interval.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Sender, after, select};

/// Handle to a running polling thread.
pub(crate) struct PollSession {
    cancel_tx: Sender<()>,
    active: Arc<AtomicBool>,
    join: JoinHandle<()>,
}

impl PollSession {
    /// Whether the loop is still running (it exits on its own once the stream
    /// reports a valid resolution).
    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Signal the loop and wait for its thread to exit.
    pub(crate) fn cancel(self) {
        let _ = self.cancel_tx.send(());
        let _ = self.join.join();
    }
}

/// Spawn a polling thread that runs `tick` immediately and then once per
/// `interval` until `tick` reports the stream active or the session is
/// cancelled.
pub(crate) fn spawn<F>(interval: Duration, mut tick: F) -> PollSession
where
    F: FnMut() -> bool + Send + 'static,
{
    // Buffered so a cancel sent mid-tick is picked up at the next wait.
    let (cancel_tx, cancel_rx) = crossbeam_channel::bounded(1);
    let active = Arc::new(AtomicBool::new(true));
    let active_in_loop = active.clone();
    let join = std::thread::spawn(move || {
        loop {
            if tick() {
                break;
            }
            select! {
                recv(cancel_rx) -> _ => break,
                recv(after(interval)) -> _ => {}
            }
        }
        active_in_loop.store(false, Ordering::Relaxed);
    });
    PollSession {
        cancel_tx,
        active,
        join,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    use super::*;

    fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if check() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        check()
    }

    #[test]
    fn tick_runs_immediately_and_stops_when_active() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticks_in_loop = ticks.clone();
        let session = spawn(Duration::from_secs(60), move || {
            ticks_in_loop.fetch_add(1, Ordering::Relaxed);
            true
        });

        assert!(wait_until(Duration::from_secs(1), || !session.is_active()));
        assert_eq!(ticks.load(Ordering::Relaxed), 1);
        session.cancel();
    }

    #[test]
    fn loop_repeats_until_tick_reports_active() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticks_in_loop = ticks.clone();
        let session = spawn(Duration::from_millis(5), move || {
            ticks_in_loop.fetch_add(1, Ordering::Relaxed) + 1 >= 3
        });

        assert!(wait_until(Duration::from_secs(1), || !session.is_active()));
        assert_eq!(ticks.load(Ordering::Relaxed), 3);
        session.cancel();
    }

    #[test]
    fn cancel_interrupts_a_pending_wait() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticks_in_loop = ticks.clone();
        let session = spawn(Duration::from_secs(60), move || {
            ticks_in_loop.fetch_add(1, Ordering::Relaxed);
            false
        });

        assert!(wait_until(Duration::from_secs(1), || {
            ticks.load(Ordering::Relaxed) >= 1
        }));
        let started = Instant::now();
        session.cancel();
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(ticks.load(Ordering::Relaxed), 1);
    }
}
