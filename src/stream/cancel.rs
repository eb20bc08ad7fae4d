//! Cooperative cancellation of a streaming run.
//!
//! A [`CancellationToken`] can be polled with
//! [`is_cancelled`](CancellationToken::is_cancelled) or waited on inside a
//! `crossbeam_channel::select!` through [`receiver`](CancellationToken::receiver):
//! the receiver never yields a message and becomes ready (disconnected) as
//! soon as the token is cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use parking_lot::Mutex;

/// A cloneable handle that signals every clone when cancelled.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    sender: Arc<Mutex<Option<Sender<()>>>>,
    receiver: Receiver<()>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        let (sender, receiver) = bounded(0);
        CancellationToken {
            cancelled: Arc::new(AtomicBool::new(false)),
            sender: Arc::new(Mutex::new(Some(sender))),
            receiver,
        }
    }

    /// Cancel. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        // dropping the only sender disconnects every receiver
        self.sender.lock().take();
    }

    /// Check whether the token has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// A receiver that becomes ready once the token is cancelled.
    pub fn receiver(&self) -> &Receiver<()> {
        &self.receiver
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
