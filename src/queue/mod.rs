// src/queue/mod.rs

use std::collections::VecDeque;


/// Unbounded FIFO buffer of opaque messages.
///
/// Dequeue order always equals enqueue order; messages are never reordered,
/// duplicated, or dropped before being dequeued.
#[derive(Debug, Default)]
pub struct MessageQueue<T> {
    messages: VecDeque<T>,
}

impl<T> MessageQueue<T> {
    pub fn new() -> Self {
        Self {
            messages: VecDeque::new(),
        }
    }

    /// Appends a message at the tail; always succeeds.
    pub fn enqueue(&mut self, message: T) {
        self.messages.push_back(message);
    }

    /// Removes and returns the head, or `None` when empty.
    pub fn dequeue(&mut self) -> Option<T> {
        self.messages.pop_front()
    }

    /// Puts a message back at the head, ahead of everything still queued.
    /// Used to undo a dequeue when the message could not be handled.
    pub fn requeue_front(&mut self, message: T) {
        self.messages.push_front(message);
    }

    /// Returns the head without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.messages.front()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Dequeues up to `batch_size` messages, returning them in dequeue order.
/// Remaining messages are left untouched and in their original order.
pub fn process_batch<T>(queue: &mut MessageQueue<T>, batch_size: usize) -> Vec<T> {
    let mut batch = Vec::with_capacity(batch_size.min(queue.len()));
    for _ in 0..batch_size {
        match queue.dequeue() {
            Some(message) => batch.push(message),
            None => break,
        }
    }
    batch
}
