//! Operations descriptors used by the shared suites.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::data_structures::{ListOperations, TreeOperations};

/// Hook calls recorded for one payload.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefCounts {
    pub inc: usize,
    pub dec: usize,
}

impl RefCounts {
    /// References the container still holds.
    ///
    pub fn held(&self) -> usize {
        self.inc
            .checked_sub(self.dec)
            .expect("more releases than acquisitions")
    }
}

/// Natural ordering that records every `ref_count_inc`/`ref_count_dec`.
///
/// Clones share the same ledger, so a test can keep one clone and hand the
/// other to the container under test.
///
#[derive(Debug, Clone, Default)]
pub struct RefTracker {
    ledger: Arc<Mutex<HashMap<i32, RefCounts>>>,
}

impl RefTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self, key: i32) -> RefCounts {
        self.ledger.lock().get(&key).copied().unwrap_or_default()
    }

    pub fn total_inc(&self) -> usize {
        self.ledger.lock().values().map(|counts| counts.inc).sum()
    }

    pub fn total_dec(&self) -> usize {
        self.ledger.lock().values().map(|counts| counts.dec).sum()
    }

    /// Sum of references still held across all payloads.
    ///
    pub fn held(&self) -> usize {
        self.ledger.lock().values().map(RefCounts::held).sum()
    }

    fn record(&self, key: i32, update: impl FnOnce(&mut RefCounts)) {
        update(self.ledger.lock().entry(key).or_default());
    }
}

impl TreeOperations<i32> for RefTracker {
    type Key = i32;

    fn compare(&self, a: &i32, b: &i32) -> Ordering {
        a.cmp(b)
    }

    fn find_compare(&self, data: &i32, key: &i32) -> Ordering {
        data.cmp(key)
    }

    fn ref_count_inc(&self, data: &i32) {
        self.record(*data, |counts| counts.inc += 1);
    }

    fn ref_count_dec(&self, data: &i32) {
        self.record(*data, |counts| counts.dec += 1);
    }
}

impl ListOperations<i32> for RefTracker {
    fn ref_count_inc(&self, data: &i32) {
        self.record(*data, |counts| counts.inc += 1);
    }

    fn ref_count_dec(&self, data: &i32) {
        self.record(*data, |counts| counts.dec += 1);
    }
}

/// Descending order. Keeps the suites honest about following the
/// comparator instead of `Ord`.
///
#[derive(Debug, Clone, Copy, Default)]
pub struct ReverseOrder;

impl TreeOperations<i32> for ReverseOrder {
    type Key = i32;

    fn compare(&self, a: &i32, b: &i32) -> Ordering {
        b.cmp(a)
    }

    fn find_compare(&self, data: &i32, key: &i32) -> Ordering {
        key.cmp(data)
    }
}
