//! Job queue contract and the in-memory implementation
//!
//! The broker delivers work items at-least-once. A delivery is removed
//! with `ack` and redelivered with `nack`; acknowledgement must happen
//! exactly once per successfully completed or permanently failed item.

use async_trait::async_trait;
use codeaudit_types::{QueueError, WorkItem};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Notify;

/// One delivery of a queue message. The payload is raw text: a malformed
/// message must still be deliverable so the consumer can reject it.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Broker-assigned delivery id
    pub id: u64,
    /// Raw message payload (JSON-encoded [`WorkItem`] when well-formed)
    pub payload: String,
    /// How many times this message has been delivered, starting at 1
    pub attempt: u32,
}

/// At-least-once job queue
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Next delivery; `None` once the queue is closed and drained
    async fn receive(&self) -> Option<Delivery>;

    /// Remove a delivery permanently
    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError>;

    /// Return a delivery for redelivery (or dead-lettering)
    async fn nack(&self, delivery: &Delivery) -> Result<(), QueueError>;
}

/// In-memory queue with bounded redelivery.
///
/// A nacked delivery goes back to the tail with its attempt count bumped;
/// once `max_attempts` is reached it moves to the dead-letter list instead
/// of looping forever.
pub struct MemoryQueue {
    items: Mutex<VecDeque<Delivery>>,
    dead: Mutex<Vec<Delivery>>,
    next_id: AtomicU64,
    closed: AtomicBool,
    notify: Notify,
    max_attempts: u32,
}

impl MemoryQueue {
    /// Queue allowing `max_attempts` deliveries per message
    pub fn new(max_attempts: u32) -> Self {
        MemoryQueue {
            items: Mutex::new(VecDeque::new()),
            dead: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
            notify: Notify::new(),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Enqueue one work item
    pub fn publish(&self, item: &WorkItem) -> Result<(), QueueError> {
        let payload =
            serde_json::to_string(item).map_err(|e| QueueError::Publish(e.to_string()))?;
        self.publish_raw(payload);
        Ok(())
    }

    /// Enqueue a raw payload; used by tests to model malformed messages
    pub fn publish_raw(&self, payload: String) {
        let delivery = Delivery {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            payload,
            attempt: 1,
        };
        self.items.lock().push_back(delivery);
        self.notify.notify_waiters();
    }

    /// No further messages will be published; consumers drain and stop
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Messages that exhausted their delivery attempts
    pub fn dead_letters(&self) -> Vec<Delivery> {
        self.dead.lock().clone()
    }

    /// Messages currently waiting for delivery
    pub fn pending(&self) -> usize {
        self.items.lock().len()
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn receive(&self) -> Option<Delivery> {
        loop {
            // Register interest before checking, so a publish between the
            // check and the await cannot be missed.
            let notified = self.notify.notified();
            if let Some(delivery) = self.items.lock().pop_front() {
                return Some(delivery);
            }
            if self.closed.load(Ordering::SeqCst) {
                return None;
            }
            notified.await;
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        tracing::debug!("acked delivery {}", delivery.id);
        Ok(())
    }

    async fn nack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        if delivery.attempt >= self.max_attempts {
            tracing::warn!(
                "delivery {} exhausted {} attempts, dead-lettering",
                delivery.id,
                delivery.attempt
            );
            self.dead.lock().push(delivery.clone());
        } else {
            let mut redelivery = delivery.clone();
            redelivery.attempt += 1;
            self.items.lock().push_back(redelivery);
        }
        self.notify.notify_waiters();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn work_item(id: &str) -> WorkItem {
        WorkItem {
            submission_id: id.to_string(),
            source_locator: format!("uploads/{id}.py"),
            language: "python".to_string(),
            enqueued_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn delivers_in_fifo_order() {
        let queue = MemoryQueue::new(3);
        queue.publish(&work_item("a")).unwrap();
        queue.publish(&work_item("b")).unwrap();
        queue.close();

        let first = queue.receive().await.unwrap();
        let second = queue.receive().await.unwrap();
        assert!(first.payload.contains("\"a\""));
        assert!(second.payload.contains("\"b\""));
        assert!(queue.receive().await.is_none());
    }

    #[tokio::test]
    async fn nack_redelivers_with_bumped_attempt() {
        let queue = MemoryQueue::new(3);
        queue.publish(&work_item("a")).unwrap();
        queue.close();

        let delivery = queue.receive().await.unwrap();
        assert_eq!(delivery.attempt, 1);
        queue.nack(&delivery).await.unwrap();

        let redelivery = queue.receive().await.unwrap();
        assert_eq!(redelivery.id, delivery.id);
        assert_eq!(redelivery.attempt, 2);
    }

    #[tokio::test]
    async fn exhausted_deliveries_dead_letter() {
        let queue = MemoryQueue::new(2);
        queue.publish(&work_item("a")).unwrap();
        queue.close();

        let d1 = queue.receive().await.unwrap();
        queue.nack(&d1).await.unwrap();
        let d2 = queue.receive().await.unwrap();
        queue.nack(&d2).await.unwrap();

        assert!(queue.receive().await.is_none());
        assert_eq!(queue.dead_letters().len(), 1);
    }
}
