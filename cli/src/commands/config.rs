// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use deputize_core::domain::config::DeputizeConfig;

const MINIMAL_TEMPLATE: &str = include_str!("../../templates/config-minimal.yaml");
const EXAMPLES_TEMPLATE: &str = include_str!("../../templates/config-with-examples.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./deputize-config.yaml)
        #[arg(short, long, default_value = "./deputize-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        match &config_override {
            Some(path) => println!("  --config flag: {}", path.display()),
            None => println!("  --config flag: {}", "(not set)".dimmed()),
        }
        for (i, path) in DeputizeConfig::search_paths().iter().enumerate() {
            let marker = if path.exists() { "✓".green() } else { "-".dimmed() };
            println!("  {}. {} {}", i + 1, marker, path.display());
        }
        println!();
    }

    let config = DeputizeConfig::load(config_override).context("Failed to load configuration")?;

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Schedules:".bold());
    for schedule in &config.schedules {
        println!("  - {}", schedule);
    }
    println!();

    let ldap = &config.ldap;
    println!("{}", "LDAP:".bold());
    println!("  Server: {}:{}", ldap.server, ldap.port);
    println!("  StartTLS: {}", ldap.starttls);
    if let Some(ca) = &ldap.root_ca_file {
        println!("  Root CA: {}", ca.display());
    }
    println!("  Base DN: {}", ldap.base_dn);
    println!("  Group: {} ({})", ldap.group_dn, ldap.group_filter);
    println!(
        "  Attributes: mail={} uid={} member={}",
        ldap.mail_attribute, ldap.uid_attribute, ldap.member_attribute
    );
    println!("  Update user: {}", ldap.mod_user_dn);
    println!("  Ambiguous identities: {:?}", ldap.identity_ambiguity);
    println!("  Allow empty group: {}", ldap.allow_empty_group);
    println!();

    println!("{}", "PagerDuty:".bold());
    println!("  API: {}", config.pagerduty.api_url);
    println!();

    println!("{}", "Slack:".bold());
    if config.slack.enabled {
        println!(
            "  Channel: {}",
            config.slack.channel.as_deref().unwrap_or("(none)")
        );
    } else {
        println!("  {}", "disabled".dimmed());
    }
    println!();

    println!("{}", "Vault:".bold());
    println!("  Server: {}", config.vault.server);
    println!("  Secret: {}", config.vault.secret_path);
    match &config.vault.token_path {
        Some(path) => println!("  Token file: {}", path.display()),
        None => println!("  Token: {}", "$VAULT_TOKEN".dimmed()),
    }
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = DeputizeConfig::load(config_path).context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        EXAMPLES_TEMPLATE
    } else {
        MINIMAL_TEMPLATE
    };

    std::fs::write(&output, sample)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}
