//! Ready queue plus delayed retries, keyed by the instant they become due.

use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, VecDeque},
};

use tokio::time::Instant;

use crate::domain::models::{Message, Priority};

struct Delayed {
    ready_at: Instant,
    seq: u64,
    message: Message,
}

impl PartialEq for Delayed {
    fn eq(&self, other: &Self) -> bool {
        self.ready_at == other.ready_at && self.seq == other.seq
    }
}

impl Eq for Delayed {}

impl PartialOrd for Delayed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Delayed {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ready_at
            .cmp(&other.ready_at)
            .then(self.seq.cmp(&other.seq))
    }
}

#[derive(Default)]
pub struct DeliveryQueue {
    ready: VecDeque<Message>,
    delayed: BinaryHeap<Reverse<Delayed>>,
    high_priority_len: usize,
    next_seq: u64,
}

impl DeliveryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a fresh submission and returns its 1-based position in the ready
    /// queue. High-priority messages go behind earlier high-priority ones but
    /// ahead of everything else.
    pub fn push(&mut self, message: Message) -> usize {
        match message.options.priority {
            Priority::High => {
                let index = self.high_priority_len.min(self.ready.len());
                self.ready.insert(index, message);
                self.high_priority_len += 1;
                index + 1
            }
            Priority::Normal => {
                self.ready.push_back(message);
                self.ready.len()
            }
        }
    }

    /// Parks a message until `ready_at`; it then joins the back of the queue.
    pub fn push_delayed(&mut self, message: Message, ready_at: Instant) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.delayed.push(Reverse(Delayed {
            ready_at,
            seq,
            message,
        }));
    }

    /// Moves every due retry to the back of the ready queue and pops the front.
    pub fn pop_ready(&mut self, now: Instant) -> Option<Message> {
        self.promote_due(now);
        let message = self.ready.pop_front()?;
        self.high_priority_len = self.high_priority_len.saturating_sub(1);
        Some(message)
    }

    /// When the earliest parked retry becomes due.
    pub fn next_ready_at(&self) -> Option<Instant> {
        self.delayed.peek().map(|Reverse(entry)| entry.ready_at)
    }

    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    pub fn delayed_len(&self) -> usize {
        self.delayed.len()
    }

    pub fn len(&self) -> usize {
        self.ready.len() + self.delayed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn promote_due(&mut self, now: Instant) {
        while let Some(Reverse(entry)) = self.delayed.peek() {
            if entry.ready_at > now {
                break;
            }
            if let Some(Reverse(entry)) = self.delayed.pop() {
                self.ready.push_back(entry.message);
            }
        }
    }
}
