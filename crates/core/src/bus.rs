//! In-process notification fan-out.
//!
//! State holders (the goal synchronizer, the session provider) publish what
//! changed; presentation layers subscribe. Publishing never blocks and never
//! fails because of a slow or departed subscriber.
//!
//! ```ignore
//! let notifier: Notifier<SyncNotice> = Notifier::new();
//! let subscription = notifier.subscribe();
//!
//! while let Ok(notice) = subscription.try_recv() {
//!     render(notice);
//! }
//! ```

use std::sync::mpsc::{self, Receiver, RecvError, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Mutex;
use std::time::Duration;

/// A subscription to a notifier (broadcast semantics: every subscription gets
/// a copy of every message published after it was created).
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything published so far.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Best-effort pub/sub over std channels. No IO, no async.
#[derive(Debug)]
pub struct Notifier<M> {
    subscribers: Mutex<Vec<Sender<M>>>,
}

impl<M> Notifier<M> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M> Default for Notifier<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M: Clone> Notifier<M> {
    pub fn publish(&self, message: M) {
        let Ok(mut subs) = self.subscribers.lock() else {
            tracing::warn!("notifier lock poisoned; dropping message");
            return;
        };

        // Drop any dead subscribers while publishing.
        subs.retain(|tx| tx.send(message.clone()).is_ok());
    }

    pub fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        // A poisoned lock still yields a subscription; it just never fires.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|subs| subs.len()).unwrap_or(0)
    }
}
