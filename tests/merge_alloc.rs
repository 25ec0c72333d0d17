//! Allocation budget for the namespace merge
//!
//! The subset case of the merge must return its input by move; renewals
//! that repeat an existing subscription pay no allocator traffic.

use std::alloc::System;

use stats_alloc::{Region, StatsAlloc, INSTRUMENTED_SYSTEM};

use pushmon_rs::{merge_namespaces, NamespaceId};

#[global_allocator]
static GLOBAL: &StatsAlloc<System> = &INSTRUMENTED_SYSTEM;

fn ids(v: &[i16]) -> Vec<NamespaceId> {
    v.iter().map(|&n| NamespaceId::new(n)).collect()
}

#[test]
fn subset_merge_does_not_allocate() {
    let a = ids(&[1, 2, 3, 5, 8, 13]);
    let b = ids(&[2, 8]);

    let region = Region::new(GLOBAL);
    let merged = merge_namespaces(a, b);
    let change = region.change();

    assert_eq!(change.allocations, 0, "subset merge allocated: {change:?}");
    assert_eq!(change.reallocations, 0);
    assert_eq!(merged, ids(&[1, 2, 3, 5, 8, 13]));
}

#[test]
fn identical_merge_does_not_allocate() {
    let a = ids(&[1, 4, 9]);
    let b = ids(&[1, 4, 9]);

    let region = Region::new(GLOBAL);
    let merged = merge_namespaces(a, b);
    let change = region.change();

    assert_eq!(change.allocations, 0, "identical merge allocated: {change:?}");
    assert_eq!(merged, ids(&[1, 4, 9]));
}

#[test]
fn overlapping_merge_allocates_once() {
    let a = ids(&[1, 3, 5]);
    let b = ids(&[2, 3, 6]);

    let region = Region::new(GLOBAL);
    let merged = merge_namespaces(a, b);
    let change = region.change();

    assert_eq!(change.allocations, 1, "merge should build one vector: {change:?}");
    assert_eq!(change.reallocations, 0);
    assert_eq!(merged, ids(&[1, 2, 3, 5, 6]));
}
