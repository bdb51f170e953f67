//! Fixed-size batching with static pauses between upstream calls.
//!
//! Entities are split into groups of `batch_size`. Within a group the action
//! runs once per entity with `entity_delay` between consecutive entities;
//! `batch_delay` separates groups. Nothing is slept after the final entity.
//! No backoff, no jitter: the policy never adapts to what the upstream does.

use std::time::Duration;

/// Batch size and pauses for one kind of entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    pub batch_size: usize,
    pub entity_delay: Duration,
    pub batch_delay: Duration,
}

impl Default for PacingPolicy {
    /// Groups of 3, 1 s between entities, 2 s between groups.
    fn default() -> Self {
        Self {
            batch_size: 3,
            entity_delay: Duration::from_secs(1),
            batch_delay: Duration::from_secs(2),
        }
    }
}

impl PacingPolicy {
    /// Same grouping, no pauses. For tests and dry runs.
    pub fn immediate(batch_size: usize) -> Self {
        Self {
            batch_size,
            entity_delay: Duration::ZERO,
            batch_delay: Duration::ZERO,
        }
    }

    /// Effective group size; a zero size is treated as 1.
    pub fn group_size(&self) -> usize {
        self.batch_size.max(1)
    }

    /// Number of groups `len` entities split into.
    pub fn batch_count(&self, len: usize) -> usize {
        len.div_ceil(self.group_size())
    }
}

/// How a pause is carried out.
pub trait Pause: Send + Sync {
    fn pause(&self, duration: Duration);
}

/// Blocks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Pause for ThreadSleep {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Where an entity sits in the batch schedule. Batch and slot numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPosition {
    pub batch: usize,
    pub batch_count: usize,
    pub slot: usize,
    pub index: usize,
    pub total: usize,
}

/// Totals for one batched pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchStats {
    pub batches: usize,
    pub invoked: usize,
}

/// Drives a per-entity action through a [`PacingPolicy`].
pub struct Batcher<'a> {
    policy: PacingPolicy,
    pause: &'a dyn Pause,
}

impl<'a> Batcher<'a> {
    pub fn new(policy: PacingPolicy, pause: &'a dyn Pause) -> Self {
        Self { policy, pause }
    }

    pub fn policy(&self) -> &PacingPolicy {
        &self.policy
    }

    /// The groups `items` is split into, in order.
    pub fn groups<'b, T>(&self, items: &'b [T]) -> std::slice::Chunks<'b, T> {
        items.chunks(self.policy.group_size())
    }

    /// Run `action` once per item, in order, pausing per the policy.
    pub fn run<T, F>(&self, items: &[T], mut action: F) -> BatchStats
    where
        F: FnMut(BatchPosition, &T),
    {
        let total = items.len();
        let batch_count = self.policy.batch_count(total);
        let mut stats = BatchStats::default();

        for (b, group) in self.groups(items).enumerate() {
            if b > 0 {
                tracing::debug!(
                    batch = b,
                    of = batch_count,
                    pause_ms = self.policy.batch_delay.as_millis() as u64,
                    "batch complete, pausing"
                );
                self.pause.pause(self.policy.batch_delay);
            }

            for (s, item) in group.iter().enumerate() {
                if s > 0 {
                    self.pause.pause(self.policy.entity_delay);
                }
                let position = BatchPosition {
                    batch: b + 1,
                    batch_count,
                    slot: s + 1,
                    index: stats.invoked,
                    total,
                };
                action(position, item);
                stats.invoked += 1;
            }
            stats.batches += 1;
        }

        stats
    }
}
