// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! `deputize run`
//!
//! Loads configuration, pulls credentials from Vault, opens the directory
//! session and hands everything to the reconciliation use case.

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use deputize_core::application::{
    ReconcileOnCallUseCase, RunOptions, RunReport, StandardReconcileOnCallUseCase,
};
use deputize_core::domain::config::DeputizeConfig;
use deputize_core::domain::errors::ReconcileError;
use deputize_core::domain::messaging::MessagingProvider;
use deputize_core::domain::secrets::{SecretProvider, Secrets};
use deputize_core::infrastructure::{LdapDirectory, PagerDutyClient, SlackClient, VaultSecretProvider};

pub async fn execute(config_override: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let config = DeputizeConfig::load(config_override).context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    let secrets = VaultSecretProvider::from_settings(&config.vault)
        .fetch()
        .await
        .context("Failed to read secrets from Vault")?;

    let scheduling = Arc::new(PagerDutyClient::new(
        config.pagerduty.api_url.clone(),
        secrets.scheduling_token.clone(),
    ));
    let directory = Arc::new(
        LdapDirectory::connect(&config.ldap)
            .await
            .with_context(|| format!("Failed to connect to LDAP server {}", config.ldap.server))?,
    );
    let messaging = messaging_client(&config, &secrets);

    if dry_run {
        info!("Dry run: the directory will not be modified");
    }

    let use_case = StandardReconcileOnCallUseCase::new(
        &config,
        scheduling,
        directory,
        messaging,
        secrets.directory_password.clone(),
        RunOptions { dry_run },
    );

    finish(use_case.run(Utc::now()).await, dry_run)
}

/// Print the summary of a finished pass; a failed pass is left for `main` to report
fn finish(result: Result<RunReport, ReconcileError>, dry_run: bool) -> Result<()> {
    let report = result.context("Reconciliation failed")?;
    print_summary(&report, dry_run);
    Ok(())
}

/// Slack client when notifications are enabled and a token is available
fn messaging_client(config: &DeputizeConfig, secrets: &Secrets) -> Option<Arc<dyn MessagingProvider>> {
    if !config.slack.enabled {
        return None;
    }

    match &secrets.messaging_token {
        Some(token) => {
            let client: Arc<dyn MessagingProvider> =
                Arc::new(SlackClient::new(config.slack.api_url.clone(), token.clone()));
            Some(client)
        }
        None => {
            warn!("Slack notifications enabled but slackAuthToken is missing from Vault");
            None
        }
    }
}

fn print_summary(report: &RunReport, dry_run: bool) {
    let outcome = &report.outcome;

    println!("{}", "Reconciliation summary:".bold());
    println!("  Window: {}", report.window);
    println!("  Previous: {{{}}}", outcome.previous);
    println!("  On call:  {{{}}}", outcome.desired);

    if !outcome.changed {
        println!("{}", "✓ Group already up to date".green());
        return;
    }

    if dry_run {
        println!("  Would remove: {{{}}}", outcome.diff.to_remove);
        println!("  Would add:    {{{}}}", outcome.diff.to_add);
        println!("{}", "Dry run: no changes written".yellow());
        return;
    }

    if let Some(applied) = &report.applied {
        println!("  Removed: {{{}}}", applied.removed);
        println!("  Added:   {{{}}}", applied.added);
    }
    if report.notified {
        println!("  Notification: {}", "sent".green());
    }
    println!("{}", "✓ Group updated".green());
}
