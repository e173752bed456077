// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-memory capability fakes shared by the application unit tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::directory::{AttributeModification, DirectoryClient, DirectoryEntry, DirectoryError};
use crate::domain::membership::MembershipSet;
use crate::domain::messaging::{MessagingError, MessagingProvider};
use crate::domain::schedule::{
    OnCallEntry, Schedule, ScheduleName, SchedulingError, SchedulingProvider, TimeWindow,
};

const MEMBER_ATTRIBUTE: &str = "memberUid";

#[derive(Default)]
pub struct FakeScheduling {
    schedules: Vec<(Schedule, Vec<String>)>,
    fail_list: bool,
    fail_on_call: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl FakeScheduling {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(mut self, id: &str, name: &str, emails: &[&str]) -> Self {
        let schedule = Schedule {
            id: id.to_string(),
            name: ScheduleName::new(name),
        };
        self.schedules
            .push((schedule, emails.iter().map(|e| e.to_string()).collect()));
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_on_call(mut self, schedule_id: &str) -> Self {
        self.fail_on_call = Some(schedule_id.to_string());
        self
    }

    pub fn on_call_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SchedulingProvider for FakeScheduling {
    async fn list_schedules(&self) -> Result<Vec<Schedule>, SchedulingError> {
        if self.fail_list {
            return Err(SchedulingError::Network("connection refused".to_string()));
        }
        Ok(self.schedules.iter().map(|(s, _)| s.clone()).collect())
    }

    async fn list_on_call(
        &self,
        schedule_id: &str,
        _window: &TimeWindow,
    ) -> Result<Vec<OnCallEntry>, SchedulingError> {
        self.queries.lock().unwrap().push(schedule_id.to_string());
        if self.fail_on_call.as_deref() == Some(schedule_id) {
            return Err(SchedulingError::Api("HTTP 500".to_string()));
        }
        Ok(self
            .schedules
            .iter()
            .find(|(s, _)| s.id == schedule_id)
            .map(|(_, emails)| emails.iter().map(OnCallEntry::new).collect())
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryCall {
    Bind(String),
    Modify(String, String),
    Close,
}

#[derive(Default)]
pub struct FakeDirectory {
    entries: Mutex<Vec<DirectoryEntry>>,
    fail_bind: bool,
    fail_delete: bool,
    fail_add: bool,
    calls: Mutex<Vec<DirectoryCall>>,
    searches: Mutex<Vec<String>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, entry: DirectoryEntry) -> Self {
        self.entries.lock().unwrap().push(entry);
        self
    }

    pub fn with_user(self, uid: &str, email: &str) -> Self {
        self.with_entry(
            DirectoryEntry::new(format!("uid={},ou=people,dc=example,dc=com", uid))
                .with_attribute("uid", vec![uid.to_string()])
                .with_attribute("mail", vec![email.to_string()]),
        )
    }

    pub fn with_group(self, dn: &str, cn: &str, members: &[&str]) -> Self {
        self.with_entry(
            DirectoryEntry::new(dn)
                .with_attribute("cn", vec![cn.to_string()])
                .with_attribute(
                    MEMBER_ATTRIBUTE,
                    members.iter().map(|m| m.to_string()).collect(),
                ),
        )
    }

    pub fn failing_bind(mut self) -> Self {
        self.fail_bind = true;
        self
    }

    pub fn failing_delete(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub fn failing_add(mut self) -> Self {
        self.fail_add = true;
        self
    }

    pub fn calls(&self) -> Vec<DirectoryCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn group_members(&self, dn: &str) -> MembershipSet {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.dn == dn)
            .map(|e| e.values(MEMBER_ATTRIBUTE).iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DirectoryClient for FakeDirectory {
    async fn search(
        &self,
        _base_dn: &str,
        filter: &str,
        _attributes: &[&str],
    ) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        self.searches.lock().unwrap().push(filter.to_string());

        let (attribute, value) = filter
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split_once('=')
            .ok_or_else(|| DirectoryError::Other(format!("unsupported filter {}", filter)))?;

        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.values(attribute).iter().any(|v| v == value))
            .cloned()
            .collect())
    }

    async fn bind(&self, dn: &str, _password: &str) -> Result<(), DirectoryError> {
        self.calls.lock().unwrap().push(DirectoryCall::Bind(dn.to_string()));
        if self.fail_bind {
            return Err(DirectoryError::InvalidCredentials(dn.to_string()));
        }
        Ok(())
    }

    async fn modify(&self, dn: &str, modification: &AttributeModification) -> Result<(), DirectoryError> {
        self.calls
            .lock()
            .unwrap()
            .push(DirectoryCall::Modify(dn.to_string(), modification.to_string()));

        let failing = match modification {
            AttributeModification::Delete { .. } => self.fail_delete,
            AttributeModification::Add { .. } => self.fail_add,
        };
        if failing {
            return Err(DirectoryError::Operation {
                code: 50,
                message: "insufficient access rights".to_string(),
            });
        }

        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .iter_mut()
            .find(|e| e.dn == dn)
            .ok_or_else(|| DirectoryError::Operation {
                code: 32,
                message: format!("no such object: {}", dn),
            })?;
        let values = entry
            .attributes
            .entry(modification.attribute().to_string())
            .or_default();

        match modification {
            AttributeModification::Delete { values: removed, .. } => {
                values.retain(|v| !removed.contains(v));
            }
            AttributeModification::Add { values: added, .. } => {
                for value in added {
                    if !values.contains(value) {
                        values.push(value.clone());
                    }
                }
            }
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), DirectoryError> {
        self.calls.lock().unwrap().push(DirectoryCall::Close);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeMessaging {
    fail: bool,
    messages: Mutex<Vec<(String, String)>>,
}

impl FakeMessaging {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingProvider for FakeMessaging {
    async fn post_message(&self, channel: &str, text: &str) -> Result<(), MessagingError> {
        if self.fail {
            return Err(MessagingError::Api("channel_not_found".to_string()));
        }
        self.messages
            .lock()
            .unwrap()
            .push((channel.to_string(), text.to_string()));
        Ok(())
    }
}
