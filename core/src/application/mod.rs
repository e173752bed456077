// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod window;
pub mod aggregator;
pub mod identity_mapper;
pub mod group_reader;
pub mod reconciler;
pub mod updater;
pub mod notifier;
pub mod reconcile_on_call;

#[cfg(test)]
pub(crate) mod fakes;

// Re-export the use case for convenience
pub use reconcile_on_call::{
    ReconcileOnCallUseCase, RunOptions, RunReport, RunState, StandardReconcileOnCallUseCase,
};
