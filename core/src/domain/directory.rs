// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Directory
//!
//! Domain interface for the LDAP directory holding the on-call group.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Search/bind/modify capability used by the identity mapper,
//!   the reconciler and the group updater

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A single entry returned by a directory search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attributes: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.attributes.insert(name.into(), values);
        self
    }

    /// All values of `name`, empty when the attribute is absent
    pub fn values(&self, name: &str) -> &[String] {
        self.attributes
            .get(name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// First value of `name`
    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(|v| v.as_str())
    }
}

/// Modification of a single multi-valued attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeModification {
    Add {
        attribute: String,
        values: BTreeSet<String>,
    },
    Delete {
        attribute: String,
        values: BTreeSet<String>,
    },
}

impl AttributeModification {
    pub fn attribute(&self) -> &str {
        match self {
            Self::Add { attribute, .. } | Self::Delete { attribute, .. } => attribute,
        }
    }

    pub fn values(&self) -> &BTreeSet<String> {
        match self {
            Self::Add { values, .. } | Self::Delete { values, .. } => values,
        }
    }
}

impl fmt::Display for AttributeModification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (op, attribute, values) = match self {
            Self::Add { attribute, values } => ("add", attribute, values),
            Self::Delete { attribute, values } => ("delete", attribute, values),
        };
        let joined: Vec<&str> = values.iter().map(|v| v.as_str()).collect();
        write!(f, "{} {}: {}", op, attribute, joined.join(", "))
    }
}

/// Connected directory session
///
/// The session is opened (and TLS-wrapped) by infrastructure before the core
/// sees it. Searches run with whatever identity the session currently has;
/// `bind` upgrades it to the update credentials.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Subtree search under `base_dn`
    async fn search(
        &self,
        base_dn: &str,
        filter: &str,
        attributes: &[&str],
    ) -> Result<Vec<DirectoryEntry>, DirectoryError>;

    /// Simple bind
    async fn bind(&self, dn: &str, password: &str) -> Result<(), DirectoryError>;

    /// Apply one modification to the entry at `dn`
    async fn modify(&self, dn: &str, modification: &AttributeModification) -> Result<(), DirectoryError>;

    /// Release the session
    async fn close(&self) -> Result<(), DirectoryError>;
}

/// Errors returned by a directory session
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid credentials for {0}")]
    InvalidCredentials(String),

    #[error("Operation failed with code {code}: {message}")]
    Operation { code: u32, message: String },

    #[error("Directory error: {0}")]
    Other(String),
}

/// Escape a value for use inside an LDAP search filter (RFC 4515)
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\5c"),
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// `(attribute=value)` with the value escaped
pub fn equality_filter(attribute: &str, value: &str) -> String {
    format!("({}={})", attribute, escape_filter_value(value))
}
