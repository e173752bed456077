// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Types, capability traits and errors shared by every reconciliation step.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer

pub mod config;
pub mod directory;
pub mod errors;
pub mod membership;
pub mod messaging;
pub mod schedule;
pub mod secrets;
