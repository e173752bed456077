// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod pagerduty;
pub mod ldap;
pub mod slack;
pub mod vault;

pub use ldap::LdapDirectory;
pub use pagerduty::PagerDutyClient;
pub use slack::SlackClient;
pub use vault::VaultSecretProvider;
