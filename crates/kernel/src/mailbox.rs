use std::collections::VecDeque;
use std::collections::vec_deque::IntoIter;

/// Per-entity event inbox.
///
/// Events are kept in arrival order. Draining hands the whole batch to the
/// caller and leaves the inbox empty, so anything posted while the batch is
/// being handled waits for the next drain.
#[derive(Debug, Clone)]
pub struct Mailbox<E> {
    queue: VecDeque<E>,
}

impl<E> Default for Mailbox<E> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<E> Mailbox<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next drain.
    pub fn post(&mut self, event: E) {
        self.queue.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> IntoIter<E> {
        std::mem::take(&mut self.queue).into_iter()
    }

    /// Drain and hand each event to `handler` in arrival order. Returns the
    /// number of events dispatched.
    pub fn dispatch<F>(&mut self, mut handler: F) -> usize
    where
        F: FnMut(E),
    {
        let mut count = 0;
        for event in self.drain() {
            handler(event);
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Signal {
        Hit(u32),
        OutOfBounds,
    }

    #[test]
    fn starts_empty() {
        let mailbox: Mailbox<Signal> = Mailbox::new();
        assert!(mailbox.is_empty());
        assert_eq!(mailbox.len(), 0);
    }

    #[test]
    fn dispatch_preserves_arrival_order_and_clears() {
        let mut mailbox = Mailbox::new();
        mailbox.post(Signal::Hit(1));
        mailbox.post(Signal::OutOfBounds);
        mailbox.post(Signal::Hit(2));

        let mut seen = Vec::new();
        let count = mailbox.dispatch(|event| seen.push(event));

        assert_eq!(count, 3);
        assert_eq!(
            seen,
            vec![Signal::Hit(1), Signal::OutOfBounds, Signal::Hit(2)]
        );
        assert!(mailbox.is_empty());
    }

    #[test]
    fn events_posted_after_drain_wait_for_next_round() {
        let mut mailbox = Mailbox::new();
        mailbox.post(Signal::Hit(1));

        let batch = mailbox.drain();
        mailbox.post(Signal::Hit(2));

        assert_eq!(batch.collect::<Vec<_>>(), vec![Signal::Hit(1)]);
        assert_eq!(mailbox.len(), 1);
        assert_eq!(mailbox.dispatch(|_| {}), 1);
        assert_eq!(mailbox.dispatch(|_| {}), 0);
    }
}
