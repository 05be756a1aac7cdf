//! Thread-safe queue between a speech-recognition producer and the main
//! loop. This is the only structure in the system with a genuine
//! multi-thread access pattern.

use crate::traits::VoiceInput;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Inner {
    queue: VecDeque<String>,
    armed: bool,
}

/// Cloneable handle; the recognizer thread pushes with `push`, the loop
/// consumes through the `VoiceInput` trait. Pushes while disarmed (before
/// `start`, after `stop`, during an emergency stop) are dropped.
#[derive(Clone, Default)]
pub struct VoicePipe {
    inner: Arc<(Mutex<Inner>, Condvar)>,
}

impl VoicePipe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, text: impl Into<String>) {
        let (lock, ready) = &*self.inner;
        let mut inner = lock.lock();
        if !inner.armed {
            tracing::debug!("voice pipe disarmed, dropping phrase");
            return;
        }
        inner.queue.push_back(text.into());
        ready.notify_one();
    }
}

impl VoiceInput for VoicePipe {
    fn start(&self) {
        let (lock, _) = &*self.inner;
        lock.lock().armed = true;
        tracing::info!("voice input armed");
    }

    fn stop(&self) {
        let (lock, _) = &*self.inner;
        let mut inner = lock.lock();
        inner.armed = false;
        inner.queue.clear();
        tracing::info!("voice input stopped");
    }

    fn has_command(&self) -> bool {
        let (lock, _) = &*self.inner;
        let inner = lock.lock();
        inner.armed && !inner.queue.is_empty()
    }

    fn get_command(&self, timeout: Duration) -> Option<String> {
        let (lock, ready) = &*self.inner;
        let mut inner = lock.lock();
        if inner.queue.is_empty() {
            ready.wait_for(&mut inner, timeout);
        }
        if !inner.armed {
            return None;
        }
        inner.queue.pop_front()
    }
}
