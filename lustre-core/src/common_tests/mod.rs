//! Test suites shared by the integration tests in `tests/`.

pub mod collection_stress_tests;
pub mod ref_tracker;

pub use ref_tracker::{RefCounts, RefTracker, ReverseOrder};
