use std::sync::atomic::{AtomicI64, Ordering};

use rand::Rng;

/// Largest id a client may supply or the random strategy may produce.
pub const MAX_ID: i64 = i32::MAX as i64;

/// Hands out ids for todos created without one.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> i64;

    /// Called with every explicitly supplied id.
    fn observe(&self, _id: i64) {}
}

/// Monotonic counter scoped to one store instance. The first id is `1`.
#[derive(Debug, Default)]
pub struct SequentialIds {
    last: AtomicI64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_after(last: i64) -> Self {
        Self { last: AtomicI64::new(last.min(MAX_ID)) }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> i64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    // A client-chosen id above the counter moves the counter past it.
    // Ids beyond MAX_ID are ignored so the counter cannot be pushed to overflow.
    fn observe(&self, id: i64) {
        if id <= MAX_ID {
            self.last.fetch_max(id, Ordering::SeqCst);
        }
    }
}

/// Random non-negative ids in the 32-bit range, never `0`.
#[derive(Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> i64 {
        rand::rng().random_range(1..=MAX_ID)
    }
}
