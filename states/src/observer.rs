//! Minimal subscribe/notify fan-out over `flume` channels.

use flume::{Receiver, Sender};

/// A set of subscribers interested in events of type `E`.
///
/// Each subscriber owns the receiving half of an unbounded channel. Dropping
/// the receiver unsubscribes; dead senders are pruned on the next notify.
#[derive(Debug)]
pub struct Observers<E> {
    subscribers: Vec<Sender<E>>,
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<E: Clone> Observers<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber and returns its receiving end.
    pub fn subscribe(&mut self) -> Receiver<E> {
        let (send, recv) = flume::unbounded();
        self.subscribers.push(send);
        recv
    }

    /// Delivers `event` to every live subscriber, returning how many received it.
    pub fn notify(&mut self, event: &E) -> usize {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
        self.subscribers.len()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
