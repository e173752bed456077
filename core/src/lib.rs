// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Deputize Core
//!
//! Keeps an LDAP on-call group in step with the people currently on call in
//! PagerDuty.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain model, the reconciliation pass and its adapters

pub mod domain;
pub mod application;
pub mod infrastructure;
