//! Polling helpers for background watch sessions.
//!
//! Filesystem notifications arrive asynchronously and with platform
//! dependent latency; tests poll with a generous deadline instead of
//! sleeping a fixed amount.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Poll `condition` until it holds or `timeout` elapses.
///
/// Returns whether the condition was observed.
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Receive messages until one matches `predicate`, returning it.
///
/// Messages that do not match are discarded. Returns `None` on timeout or
/// when the sender hangs up.
pub fn recv_until<T>(
    rx: &Receiver<T>,
    timeout: Duration,
    mut predicate: impl FnMut(&T) -> bool,
) -> Option<T> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(message) if predicate(&message) => return Some(message),
            Ok(_) => continue,
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
        }
    }
}
