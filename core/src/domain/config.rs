// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Deputize Configuration Types
//
// Defines the configuration schema for a reconciliation run:
// - Watched PagerDuty schedules
// - LDAP connection, search and group settings
// - PagerDuty / Slack endpoints
// - Vault location of the run's credentials
//
// YAML is the native format; `.json` files are read with serde_json so an
// existing `config.json` keeps working.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::schedule::ScheduleName;

/// Top-level configuration for a reconciliation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeputizeConfig {
    /// Schedule names whose on-call people belong in the group
    pub schedules: Vec<ScheduleName>,

    /// Directory settings
    pub ldap: LdapSettings,

    #[serde(default)]
    pub pagerduty: PagerDutySettings,

    #[serde(default)]
    pub slack: SlackSettings,

    pub vault: VaultSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapSettings {
    /// LDAP server hostname; also names the server in notifications
    pub server: String,

    #[serde(default = "default_ldap_port")]
    pub port: u16,

    /// Upgrade the connection with STARTTLS
    #[serde(default = "default_true")]
    pub starttls: bool,

    /// Extra PEM root CA trusted for the TLS handshake
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_ca_file: Option<PathBuf>,

    /// Search base for users and the group (e.g. "dc=example,dc=com")
    pub base_dn: String,

    /// Attribute holding a user's email address
    #[serde(default = "default_mail_attribute")]
    pub mail_attribute: String,

    /// Attribute holding a user's short id
    #[serde(default = "default_uid_attribute")]
    pub uid_attribute: String,

    /// Multi-valued group attribute listing member uids
    #[serde(default = "default_member_attribute")]
    pub member_attribute: String,

    /// Filter locating the on-call group (e.g. "(cn=lg-oncall)")
    pub group_filter: String,

    /// DN of the on-call group; target of the modify calls
    pub group_dn: String,

    /// Human-readable group name for notifications (default: group_dn)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,

    /// DN used to bind before modifying the group
    pub mod_user_dn: String,

    /// What to do when an email matches several directory entries
    #[serde(default)]
    pub identity_ambiguity: AmbiguityPolicy,

    /// Allow a run to remove every member when nobody is on call
    #[serde(default)]
    pub allow_empty_group: bool,
}

impl LdapSettings {
    pub fn group_display_name(&self) -> &str {
        self.group_name.as_deref().unwrap_or(&self.group_dn)
    }
}

/// Policy for an email address that matches more than one directory entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Abort the run
    #[default]
    Fail,
    /// Use the first entry returned by the server
    FirstMatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagerDutySettings {
    #[serde(default = "default_pagerduty_api_url")]
    pub api_url: String,
}

impl Default for PagerDutySettings {
    fn default() -> Self {
        Self {
            api_url: default_pagerduty_api_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackSettings {
    #[serde(default)]
    pub enabled: bool,

    /// Channel receiving change announcements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,

    #[serde(default = "default_slack_api_url")]
    pub api_url: String,
}

impl Default for SlackSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            channel: None,
            api_url: default_slack_api_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultSettings {
    /// Vault address; VAULT_ADDR overrides it
    #[serde(default)]
    pub server: String,

    /// File holding the Vault token; falls back to VAULT_TOKEN when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,

    /// KV v1 location of the credentials, "<mount>/<path>"
    #[serde(default = "default_secret_path")]
    pub secret_path: String,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_ldap_port() -> u16 {
    389
}

fn default_mail_attribute() -> String {
    "mail".to_string()
}

fn default_uid_attribute() -> String {
    "uid".to_string()
}

fn default_member_attribute() -> String {
    "memberUid".to_string()
}

fn default_pagerduty_api_url() -> String {
    "https://api.pagerduty.com".to_string()
}

fn default_slack_api_url() -> String {
    "https://slack.com/api".to_string()
}

fn default_secret_path() -> String {
    "secret/deputize".to_string()
}

impl DeputizeConfig {
    /// Load configuration from a YAML or JSON file (by extension)
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config = serde_json::from_str(json)?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Candidate locations, in precedence order, after the CLI flag
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(path) = std::env::var("DEPUTIZE_CONFIG_PATH") {
            paths.push(PathBuf::from(path));
        }

        paths.push(PathBuf::from("./deputize-config.yaml"));
        paths.push(PathBuf::from("./config.json"));

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".deputize").join("config.yaml"));
        }

        paths.push(PathBuf::from("/etc/deputize/config.yaml"));
        paths
    }

    /// First existing file among [`Self::search_paths`]
    pub fn discover_config() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|p| p.exists())
    }

    /// Load from the explicit path, else from discovery
    ///
    /// There is no usable default configuration, so finding nothing is an error.
    pub fn load(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let path = match cli_path {
            Some(path) => {
                tracing::info!("Loading configuration from explicit path: {:?}", path);
                path
            }
            None => {
                let path = Self::discover_config().ok_or_else(|| {
                    anyhow::anyhow!(
                        "No configuration file found. Pass --config or set DEPUTIZE_CONFIG_PATH"
                    )
                })?;
                tracing::info!("Loading configuration from discovered path: {:?}", path);
                path
            }
        };

        let mut config = Self::from_file(&path)
            .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` as the environment
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("DEPUTIZE_SLACK_ENABLED") {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => {
                    tracing::info!("Environment override: DEPUTIZE_SLACK_ENABLED=true");
                    self.slack.enabled = true;
                }
                "false" | "0" | "no" | "off" => {
                    tracing::info!("Environment override: DEPUTIZE_SLACK_ENABLED=false");
                    self.slack.enabled = false;
                }
                _ => {
                    tracing::warn!(
                        "Invalid value for DEPUTIZE_SLACK_ENABLED: '{}'. Expected true/false. Ignoring.",
                        val
                    );
                }
            }
        }

        if let Some(addr) = lookup("VAULT_ADDR") {
            if !addr.is_empty() {
                tracing::info!("Environment override: VAULT_ADDR={}", addr);
                self.vault.server = addr;
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.schedules.is_empty() {
            anyhow::bail!("schedules must list at least one schedule name");
        }

        if self.schedules.iter().any(|s| s.as_str().trim().is_empty()) {
            anyhow::bail!("schedule names cannot be empty");
        }

        let ldap = &self.ldap;
        let required = [
            ("ldap.server", &ldap.server),
            ("ldap.base_dn", &ldap.base_dn),
            ("ldap.mail_attribute", &ldap.mail_attribute),
            ("ldap.uid_attribute", &ldap.uid_attribute),
            ("ldap.member_attribute", &ldap.member_attribute),
            ("ldap.group_filter", &ldap.group_filter),
            ("ldap.group_dn", &ldap.group_dn),
            ("ldap.mod_user_dn", &ldap.mod_user_dn),
            ("pagerduty.api_url", &self.pagerduty.api_url),
            ("vault.server", &self.vault.server),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!("{} cannot be empty", field);
            }
        }

        if !(ldap.group_filter.starts_with('(') && ldap.group_filter.ends_with(')')) {
            anyhow::bail!(
                "ldap.group_filter must be a parenthesised LDAP filter, got '{}'",
                ldap.group_filter
            );
        }

        if ldap.port == 0 {
            anyhow::bail!("ldap.port cannot be 0");
        }

        if self.slack.enabled {
            match self.slack.channel.as_deref() {
                Some(channel) if !channel.trim().is_empty() => {}
                _ => anyhow::bail!("slack.channel is required when slack.enabled is true"),
            }
        }

        match self.vault.secret_path.trim_matches('/').split_once('/') {
            Some((mount, path)) if !mount.is_empty() && !path.is_empty() => {}
            _ => anyhow::bail!(
                "vault.secret_path must look like '<mount>/<path>', got '{}'",
                self.vault.secret_path
            ),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL_YAML: &str = r#"
schedules:
  - Ops Primary
ldap:
  server: ldap.example.com
  base_dn: dc=example,dc=com
  group_filter: (cn=lg-oncall)
  group_dn: cn=lg-oncall,ou=groups,dc=example,dc=com
  mod_user_dn: cn=deputize,ou=services,dc=example,dc=com
vault:
  server: https://vault.example.com:8200
"#;

    #[test]
    fn test_minimal_yaml_defaults() {
        let config = DeputizeConfig::from_yaml_str(MINIMAL_YAML).unwrap();

        assert_eq!(config.schedules, vec![ScheduleName::new("Ops Primary")]);
        assert_eq!(config.ldap.port, 389);
        assert!(config.ldap.starttls);
        assert_eq!(config.ldap.mail_attribute, "mail");
        assert_eq!(config.ldap.uid_attribute, "uid");
        assert_eq!(config.ldap.member_attribute, "memberUid");
        assert_eq!(config.ldap.identity_ambiguity, AmbiguityPolicy::Fail);
        assert!(!config.ldap.allow_empty_group);
        assert_eq!(config.pagerduty.api_url, "https://api.pagerduty.com");
        assert!(!config.slack.enabled);
        assert_eq!(config.vault.secret_path, "secret/deputize");
        assert_eq!(config.ldap.group_display_name(), config.ldap.group_dn);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_file_is_parsed_as_json() {
        let json = r##"{
            "schedules": ["Ops Primary", "Ops Secondary"],
            "ldap": {
                "server": "ldap.example.com",
                "port": 10389,
                "base_dn": "dc=example,dc=com",
                "group_filter": "(cn=lg-oncall)",
                "group_dn": "cn=lg-oncall,ou=groups,dc=example,dc=com",
                "group_name": "lg-oncall",
                "mod_user_dn": "cn=deputize,ou=services,dc=example,dc=com",
                "identity_ambiguity": "first_match"
            },
            "slack": { "enabled": true, "channel": "#ops" },
            "vault": { "server": "https://vault.example.com:8200", "token_path": "/etc/vault-token" }
        }"##;

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = DeputizeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.schedules.len(), 2);
        assert_eq!(config.ldap.port, 10389);
        assert_eq!(config.ldap.identity_ambiguity, AmbiguityPolicy::FirstMatch);
        assert_eq!(config.ldap.group_display_name(), "lg-oncall");
        assert_eq!(config.slack.channel.as_deref(), Some("#ops"));
        assert_eq!(config.vault.token_path, Some(PathBuf::from("/etc/vault-token")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let config = DeputizeConfig::from_yaml_str(MINIMAL_YAML).unwrap();
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(config.to_yaml_string().unwrap().as_bytes()).unwrap();

        let parsed = DeputizeConfig::from_file(file.path()).unwrap();
        assert_eq!(parsed.ldap.group_dn, config.ldap.group_dn);
        assert_eq!(parsed.schedules, config.schedules);
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let result = DeputizeConfig::load(Some(PathBuf::from("/nonexistent/deputize.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = DeputizeConfig::from_yaml_str(MINIMAL_YAML).unwrap();

        config.apply_overrides_from(|key| match key {
            "DEPUTIZE_SLACK_ENABLED" => Some("yes".to_string()),
            "VAULT_ADDR" => Some("https://vault.internal:8200".to_string()),
            _ => None,
        });
        assert!(config.slack.enabled);
        assert_eq!(config.vault.server, "https://vault.internal:8200");

        config.apply_overrides_from(|key| match key {
            "DEPUTIZE_SLACK_ENABLED" => Some("maybe".to_string()),
            _ => None,
        });
        assert!(config.slack.enabled);
    }

    #[test]
    fn test_validation() {
        let mut config = DeputizeConfig::from_yaml_str(MINIMAL_YAML).unwrap();
        assert!(config.validate().is_ok());

        config.schedules.clear();
        assert!(config.validate().is_err());
        config.schedules.push(ScheduleName::new("Ops Primary"));

        config.ldap.group_dn = "".to_string();
        assert!(config.validate().is_err());
        config.ldap.group_dn = "cn=lg-oncall,ou=groups,dc=example,dc=com".to_string();

        config.ldap.group_filter = "cn=lg-oncall".to_string();
        assert!(config.validate().is_err());
        config.ldap.group_filter = "(cn=lg-oncall)".to_string();

        config.slack.enabled = true;
        assert!(config.validate().is_err());
        config.slack.channel = Some("#ops".to_string());
        assert!(config.validate().is_ok());

        config.vault.secret_path = "deputize".to_string();
        assert!(config.validate().is_err());
        config.vault.secret_path = "secret/deputize".to_string();

        config.vault.server = "".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secret_path_slashes_are_trimmed() {
        let mut config = DeputizeConfig::from_yaml_str(MINIMAL_YAML).unwrap();

        config.vault.secret_path = "/secret/deputize/".to_string();
        assert!(config.validate().is_ok());

        config.vault.secret_path = "/deputize".to_string();
        assert!(config.validate().is_err());
    }
}
