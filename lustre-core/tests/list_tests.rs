use lustre_core::common_tests::RefTracker;
use lustre_core::common_tests::list_core_tests::*;
use lustre_core::{DefaultOperations, ListOperations};
use rstest::rstest;

// Trait for type-level parametrization
trait TestListOperations {
    type Operations: ListOperations<i32> + Default;
}

struct UseDefault;
struct UseTracker;

impl TestListOperations for UseDefault {
    type Operations = DefaultOperations;
}

impl TestListOperations for UseTracker {
    type Operations = RefTracker;
}

#[rstest]
#[case::default(UseDefault)]
#[case::tracker(UseTracker)]
fn fifo<T: TestListOperations>(#[case] _type: T) {
    test_fifo::<T::Operations>();
}

#[rstest]
#[case::default(UseDefault)]
#[case::tracker(UseTracker)]
fn lifo<T: TestListOperations>(#[case] _type: T) {
    test_lifo::<T::Operations>();
}

#[rstest]
#[case::default(UseDefault)]
#[case::tracker(UseTracker)]
fn mixed_ends<T: TestListOperations>(#[case] _type: T) {
    test_mixed_ends::<T::Operations>();
}

#[rstest]
#[case::default(UseDefault)]
#[case::tracker(UseTracker)]
fn empty_and_reuse<T: TestListOperations>(#[case] _type: T) {
    test_empty_and_reuse::<T::Operations>();
}

#[test]
fn list_reference_counting() {
    test_list_reference_counting();
}

#[test]
fn list_exhaustion() {
    test_list_exhaustion();
}
