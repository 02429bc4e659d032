// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::Notify;

/// A stop guard is shared between a one-shot voice and the task timing its
/// playback. Stopping is idempotent: only the first call to [`StopGuard::stop`]
/// transitions the guard, no matter how many paths (natural end, cap expiry,
/// retrigger, slot removal) race to end the same playback.
#[derive(Clone)]
pub struct StopGuard {
    inner: Arc<Inner>,
}

struct Inner {
    /// True once the playback this guard belongs to has been stopped.
    stopped: AtomicBool,
    /// Wakes tasks waiting on the stop.
    notify: Notify,
}

impl StopGuard {
    /// Creates a new, unstopped guard.
    pub fn new() -> StopGuard {
        StopGuard {
            inner: Arc::new(Inner {
                stopped: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    /// Returns true if the playback has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Stops the playback. Returns true if this call performed the transition,
    /// false if the guard was already stopped.
    pub fn stop(&self) -> bool {
        if self
            .inner
            .stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.inner.notify.notify_waiters();
            return true;
        }
        false
    }

    /// Waits until the guard is stopped. Returns immediately if it already is.
    pub async fn stopped(&self) {
        let notified = self.inner.notify.notified();
        tokio::pin!(notified);
        // Register interest before checking the flag so a concurrent stop
        // between the check and the await cannot be missed.
        notified.as_mut().enable();
        if self.is_stopped() {
            return;
        }
        notified.await;
    }

    /// Returns true if both guards refer to the same playback.
    pub fn same_as(&self, other: &StopGuard) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for StopGuard {
    fn default() -> Self {
        StopGuard::new()
    }
}
