// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Membership
//!
//! Sets of directory uids and the diff between them.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Value objects for current/desired membership, the minimal
//!   add/remove diff and the outcome of one reconciliation
//!
//! `MembershipSet` is backed by a `BTreeSet`, so it is duplicate-free and
//! iterates in sorted order no matter how it was built. Two sets with the
//! same members compare equal regardless of the order their values arrived in.

use std::collections::BTreeSet;
use std::fmt;

/// Duplicate-free, sorted set of directory uids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipSet(BTreeSet<String>);

impl MembershipSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, uid: impl Into<String>) -> bool {
        self.0.insert(uid.into())
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.0.contains(uid)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn as_set(&self) -> &BTreeSet<String> {
        &self.0
    }

    /// Members of `self` that are not in `other`
    pub fn difference(&self, other: &MembershipSet) -> MembershipSet {
        Self(self.0.difference(&other.0).cloned().collect())
    }
}

impl<S: Into<String>> FromIterator<S> for MembershipSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for MembershipSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<MembershipSet> for BTreeSet<String> {
    fn from(set: MembershipSet) -> Self {
        set.0
    }
}

/// Renders as `a, b, c`
impl fmt::Display for MembershipSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<&str> = self.0.iter().map(|m| m.as_str()).collect();
        f.write_str(&members.join(", "))
    }
}

/// Minimal change that turns current membership into desired membership
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    pub to_add: MembershipSet,
    pub to_remove: MembershipSet,
}

impl MembershipDiff {
    /// `to_add = desired - current`, `to_remove = current - desired`
    pub fn between(current: &MembershipSet, desired: &MembershipSet) -> Self {
        Self {
            to_add: desired.difference(current),
            to_remove: current.difference(desired),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Result of comparing the directory group with the on-call rotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationOutcome {
    pub changed: bool,
    pub diff: MembershipDiff,
    /// Group membership before the run
    pub previous: MembershipSet,
    /// Membership derived from the rotation
    pub desired: MembershipSet,
}

impl ReconciliationOutcome {
    pub fn new(previous: MembershipSet, desired: MembershipSet) -> Self {
        let diff = MembershipDiff::between(&previous, &desired);
        Self {
            changed: !diff.is_empty(),
            diff,
            previous,
            desired,
        }
    }
}
