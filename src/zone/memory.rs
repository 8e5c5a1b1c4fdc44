//! In-process provider backed by a JSON account state file.
//!
//! `MemoryProvider` implements both provider seams over an [`AccountState`]
//! snapshot. Submitted changes report a scripted status sequence so callers
//! can exercise eventual consistency without a network.

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::api::{CreatedZone, HostedZoneApi, Page, RegistrarApi};
use super::types::{
    resource_id, ChangeAction, ChangeInfo, ChangeSet, ChangeStatus, HostedZone, OperationDetail,
    OperationStatus, RecordType, ResourceRecordSet, Tag,
};
use crate::domain::normalize_domain;
use crate::error_handling::ApiError;

const DEFAULT_PAGE_SIZE: usize = 100;
const NS_TTL: i64 = 172_800;
const SOA_TTL: i64 = 900;
const NAMESERVERS_PER_ZONE: usize = 4;

/// A zone with its records and tags, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredZone {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub records: Vec<ResourceRecordSet>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl StoredZone {
    fn hosted_zone(&self) -> HostedZone {
        HostedZone {
            id: self.id.clone(),
            name: self.name.clone(),
            record_count: self.records.len() as i64,
            comment: self.comment.clone(),
        }
    }
}

/// A domain held by the registrar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredDomain {
    pub name: String,
    #[serde(default)]
    pub nameservers: Vec<String>,
}

/// Persisted contents of one provider account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    #[serde(default)]
    pub zones: Vec<StoredZone>,
    #[serde(default)]
    pub domains: Vec<RegisteredDomain>,
    #[serde(default)]
    pub next_id: u64,
}

#[derive(Default)]
struct Inner {
    account: AccountState,
    changes: HashMap<String, VecDeque<ChangeStatus>>,
    operations: HashMap<String, OperationDetail>,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.account.next_id += 1;
        self.account.next_id
    }

    fn zone(&self, zone_id: &str) -> Option<&StoredZone> {
        let wanted = resource_id(zone_id);
        self.account
            .zones
            .iter()
            .find(|zone| resource_id(&zone.id) == wanted)
    }

    fn zone_mut(&mut self, zone_id: &str) -> Option<&mut StoredZone> {
        let wanted = resource_id(zone_id);
        self.account
            .zones
            .iter_mut()
            .find(|zone| resource_id(&zone.id) == wanted)
    }

    fn domain_mut(&mut self, domain: &str) -> Option<&mut RegisteredDomain> {
        let wanted = normalize_domain(domain);
        self.account
            .domains
            .iter_mut()
            .find(|d| normalize_domain(&d.name) == wanted)
    }
}

/// Provider account kept in memory.
pub struct MemoryProvider {
    inner: Mutex<Inner>,
    status_script: Vec<ChangeStatus>,
    page_size: usize,
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new(AccountState::default())
    }
}

impl MemoryProvider {
    pub fn new(mut account: AccountState) -> Self {
        for zone in &mut account.zones {
            zone.name = normalize_domain(&zone.name);
            for record in &mut zone.records {
                record.name = normalize_domain(&record.name);
            }
        }
        Self {
            inner: Mutex::new(Inner {
                account,
                ..Inner::default()
            }),
            status_script: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Statuses reported by successive `get_change` polls of every submitted
    /// change. The last status repeats. Empty means changes are in sync at once.
    pub fn with_change_statuses(mut self, statuses: Vec<ChangeStatus>) -> Self {
        self.status_script = statuses;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Loads an account from `path`. A missing file is an empty account.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read account state {}", path.display()))?;
        let account: AccountState = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse account state {}", path.display()))?;
        Ok(Self::new(account))
    }

    /// Writes the account to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.snapshot())
            .context("Failed to serialize account state")?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write account state {}", path.display()))
    }

    /// A copy of the current account contents.
    pub fn snapshot(&self) -> AccountState {
        self.lock().account.clone()
    }

    /// Adds a zone holding exactly `records`, bypassing change batches.
    pub fn insert_zone(&self, name: &str, records: Vec<ResourceRecordSet>) -> HostedZone {
        let mut inner = self.lock();
        let id = format!("/hostedzone/Z{:012}", inner.next_id());
        let zone = StoredZone {
            id,
            name: normalize_domain(name),
            comment: None,
            records,
            tags: Vec::new(),
        };
        let hosted = zone.hosted_zone();
        inner.account.zones.push(zone);
        hosted
    }

    /// Registers `domain` with the registrar.
    pub fn register_domain(&self, domain: &str, nameservers: Vec<String>) {
        self.lock().account.domains.push(RegisteredDomain {
            name: domain.to_string(),
            nameservers,
        });
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State stays consistent across a panicking holder: every mutation is
        // built on a copy and committed last.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn submit_change(&self, inner: &mut Inner, comment: Option<&str>) -> ChangeInfo {
        let id = format!("/change/C{:012}", inner.next_id());
        let status = if self.status_script.is_empty() {
            ChangeStatus::Insync
        } else {
            ChangeStatus::Pending
        };
        inner
            .changes
            .insert(id.clone(), self.status_script.iter().copied().collect());
        ChangeInfo {
            id,
            status,
            comment: comment.map(str::to_string),
        }
    }

    fn page<T: Clone>(&self, items: &[T], start: Option<&str>) -> Result<Page<T>, ApiError> {
        let offset = match start.filter(|token| !token.is_empty()) {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| ApiError::new("List", format!("invalid pagination token {token}")))?,
            None => 0,
        };
        let end = (offset + self.page_size).min(items.len());
        let slice = items.get(offset..end).unwrap_or_default().to_vec();
        let next = (end < items.len()).then(|| end.to_string());
        Ok(Page { items: slice, next })
    }
}

fn zone_records(name: &str, seq: u64) -> (Vec<String>, Vec<ResourceRecordSet>) {
    let nameservers: Vec<String> = (1..=NAMESERVERS_PER_ZONE)
        .map(|i| format!("ns-{seq}-{i}.memory.invalid."))
        .collect();
    let soa = format!(
        "{} hostmaster.{name} 1 7200 900 1209600 86400",
        nameservers[0]
    );
    let records = vec![
        ResourceRecordSet::new(name, RecordType::Ns, NS_TTL, nameservers.clone()),
        ResourceRecordSet::new(name, RecordType::Soa, SOA_TTL, vec![soa]),
    ];
    (nameservers, records)
}

fn apply_changes(
    records: &[ResourceRecordSet],
    changes: &ChangeSet,
) -> Result<Vec<ResourceRecordSet>, ApiError> {
    let invalid = |message: String| ApiError::new("ChangeResourceRecordSets", message);
    let mut updated = records.to_vec();

    for change in changes.changes() {
        change
            .record
            .validate()
            .map_err(|e| invalid(format!("InvalidChangeBatch: {e}")))?;
        let position = updated.iter().position(|r| r.key() == change.record.key());
        match (change.action, position) {
            (ChangeAction::Upsert, Some(index)) => updated[index] = change.record.clone(),
            (ChangeAction::Upsert, None) => updated.push(change.record.clone()),
            (ChangeAction::Delete, Some(index)) => {
                updated.remove(index);
            }
            (ChangeAction::Delete, None) => {
                return Err(invalid(format!(
                    "InvalidChangeBatch: record {} {} not found",
                    change.record.name, change.record.record_type
                )));
            }
        }
    }

    updated.sort_by(|a, b| (&a.name, a.record_type).cmp(&(&b.name, b.record_type)));
    Ok(updated)
}

#[async_trait]
impl HostedZoneApi for MemoryProvider {
    async fn list_hosted_zones(&self, marker: Option<&str>) -> Result<Page<HostedZone>, ApiError> {
        let mut zones: Vec<HostedZone> = self
            .lock()
            .account
            .zones
            .iter()
            .map(StoredZone::hosted_zone)
            .collect();
        zones.sort_by(|a, b| a.name.cmp(&b.name));
        self.page(&zones, marker)
    }

    async fn list_hosted_zones_by_name(
        &self,
        dns_name: &str,
        max_items: usize,
    ) -> Result<Vec<HostedZone>, ApiError> {
        let start = normalize_domain(dns_name);
        let mut zones: Vec<HostedZone> = self
            .lock()
            .account
            .zones
            .iter()
            .filter(|zone| zone.name >= start)
            .map(StoredZone::hosted_zone)
            .collect();
        zones.sort_by(|a, b| a.name.cmp(&b.name));
        zones.truncate(max_items);
        Ok(zones)
    }

    async fn get_hosted_zone(&self, zone_id: &str) -> Result<HostedZone, ApiError> {
        self.lock()
            .zone(zone_id)
            .map(StoredZone::hosted_zone)
            .ok_or_else(|| ApiError::new("GetHostedZone", format!("NoSuchHostedZone: {zone_id}")))
    }

    async fn create_hosted_zone(
        &self,
        name: &str,
        _caller_reference: &str,
        comment: &str,
    ) -> Result<CreatedZone, ApiError> {
        let name = normalize_domain(name);
        let mut inner = self.lock();
        if inner.account.zones.iter().any(|zone| zone.name == name) {
            return Err(ApiError::new(
                "CreateHostedZone",
                format!("HostedZoneAlreadyExists: {name}"),
            ));
        }

        let seq = inner.next_id();
        let (nameservers, records) = zone_records(&name, seq);
        let zone = StoredZone {
            id: format!("/hostedzone/Z{seq:012}"),
            name,
            comment: Some(comment.to_string()),
            records,
            tags: Vec::new(),
        };
        let hosted = zone.hosted_zone();
        inner.account.zones.push(zone);
        let change = self.submit_change(&mut inner, None);

        Ok(CreatedZone {
            zone: hosted,
            change,
            nameservers,
        })
    }

    async fn delete_hosted_zone(&self, zone_id: &str) -> Result<ChangeInfo, ApiError> {
        let mut inner = self.lock();
        let zone = inner
            .zone(zone_id)
            .ok_or_else(|| ApiError::new("DeleteHostedZone", format!("NoSuchHostedZone: {zone_id}")))?;
        if zone
            .records
            .iter()
            .any(|record| !record.record_type.is_zone_infrastructure())
        {
            return Err(ApiError::new(
                "DeleteHostedZone",
                format!("HostedZoneNotEmpty: {}", zone.name),
            ));
        }

        let wanted = resource_id(zone_id).to_string();
        inner
            .account
            .zones
            .retain(|zone| resource_id(&zone.id) != wanted);
        Ok(self.submit_change(&mut inner, None))
    }

    async fn list_record_sets(
        &self,
        zone_id: &str,
        start: Option<&str>,
    ) -> Result<Page<ResourceRecordSet>, ApiError> {
        let records = self
            .lock()
            .zone(zone_id)
            .map(|zone| zone.records.clone())
            .ok_or_else(|| {
                ApiError::new("ListResourceRecordSets", format!("NoSuchHostedZone: {zone_id}"))
            })?;
        self.page(&records, start)
    }

    async fn change_record_sets(
        &self,
        zone_id: &str,
        changes: &ChangeSet,
        comment: Option<&str>,
    ) -> Result<ChangeInfo, ApiError> {
        let mut inner = self.lock();
        let zone = inner.zone_mut(zone_id).ok_or_else(|| {
            ApiError::new("ChangeResourceRecordSets", format!("NoSuchHostedZone: {zone_id}"))
        })?;
        zone.records = apply_changes(&zone.records, changes)?;
        Ok(self.submit_change(&mut inner, comment))
    }

    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo, ApiError> {
        let mut inner = self.lock();
        let queue = inner
            .changes
            .get_mut(change_id)
            .ok_or_else(|| ApiError::new("GetChange", format!("NoSuchChange: {change_id}")))?;
        let status = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().copied()
        }
        .unwrap_or(ChangeStatus::Insync);

        Ok(ChangeInfo {
            id: change_id.to_string(),
            status,
            comment: None,
        })
    }

    async fn list_tags(&self, resource: &str) -> Result<Vec<Tag>, ApiError> {
        self.lock()
            .zone(resource)
            .map(|zone| zone.tags.clone())
            .ok_or_else(|| ApiError::new("ListTagsForResource", format!("NoSuchHostedZone: {resource}")))
    }

    async fn add_tags(&self, resource: &str, tags: &[Tag]) -> Result<(), ApiError> {
        let mut inner = self.lock();
        let zone = inner.zone_mut(resource).ok_or_else(|| {
            ApiError::new("ChangeTagsForResource", format!("NoSuchHostedZone: {resource}"))
        })?;
        for tag in tags {
            match zone.tags.iter_mut().find(|existing| existing.key == tag.key) {
                Some(existing) => existing.value = tag.value.clone(),
                None => zone.tags.push(tag.clone()),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RegistrarApi for MemoryProvider {
    async fn get_domain_nameservers(&self, domain: &str) -> Result<Vec<String>, ApiError> {
        self.lock()
            .domain_mut(domain)
            .map(|d| d.nameservers.clone())
            .ok_or_else(|| ApiError::new("GetDomainDetail", format!("domain not registered: {domain}")))
    }

    async fn update_domain_nameservers(
        &self,
        domain: &str,
        nameservers: &[String],
    ) -> Result<String, ApiError> {
        let mut inner = self.lock();
        let registered = inner.domain_mut(domain).ok_or_else(|| {
            ApiError::new(
                "UpdateDomainNameservers",
                format!("domain not registered: {domain}"),
            )
        })?;
        registered.nameservers = nameservers.to_vec();

        let id = format!("op-{:012}", inner.next_id());
        inner.operations.insert(
            id.clone(),
            OperationDetail {
                id: id.clone(),
                status: OperationStatus::Successful,
                message: None,
            },
        );
        Ok(id)
    }

    async fn get_operation_detail(&self, operation_id: &str) -> Result<OperationDetail, ApiError> {
        self.lock()
            .operations
            .get(operation_id)
            .cloned()
            .ok_or_else(|| {
                ApiError::new("GetOperationDetail", format!("invalid operation id: {operation_id}"))
            })
    }
}
