//! Zone record store and diff/apply engine.
//!
//! `RouteManager` owns one provider session. Zones are fetched fresh on every
//! call and never cached.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio_util::sync::CancellationToken;

use super::api::{HostedZoneApi, RegistrarApi};
use super::filter::find_ns_record;
use super::matcher::match_ns_records;
use super::operation::wait_for_operation;
use super::types::{
    resource_id, ChangeAction, ChangeInfo, ChangeSet, ChangeStatus, HostedZone,
    OperationStatus, ResourceRecordSet, Tag,
};
use crate::config::{CREATED_ZONE_COMMENT, CREATE_MAX_WAIT, NAMESERVER_UPDATE_MAX_WAIT};
use crate::domain::{denormalize_domain, normalize_domain};
use crate::error_handling::{ApiError, ZoneError};
use crate::waiter::{PollDecision, Waiter};

/// Session options.
#[derive(Debug, Clone, Default)]
pub struct RouteManagerOptions {
    /// Skip every propagation wait.
    pub no_wait: bool,
    /// Cancels waits in flight.
    pub cancel: CancellationToken,
}

/// Builds the change set copying `records` into the zone `domain`.
///
/// Every record becomes an upsert, verbatim, except the apex NS and SOA sets.
pub fn diff(domain: &str, records: &[ResourceRecordSet]) -> ChangeSet {
    let mut changes = ChangeSet::new(domain);
    for record in records {
        if !changes.push(ChangeAction::Upsert, record.clone()) {
            debug!("Skipping apex {} record of {}", record.record_type, changes.apex());
        }
    }
    changes
}

/// Provider session for hosted zones and, optionally, the registrar.
pub struct RouteManager {
    api: Arc<dyn HostedZoneApi>,
    registrar: Option<Arc<dyn RegistrarApi>>,
    options: RouteManagerOptions,
    change_waiter: Waiter,
}

impl RouteManager {
    pub fn new(api: Arc<dyn HostedZoneApi>, options: RouteManagerOptions) -> Self {
        Self {
            api,
            registrar: None,
            options,
            change_waiter: Waiter::for_changes(),
        }
    }

    pub fn with_registrar(mut self, registrar: Arc<dyn RegistrarApi>) -> Self {
        self.registrar = Some(registrar);
        self
    }

    pub fn options(&self) -> &RouteManagerOptions {
        &self.options
    }

    /// Lists every hosted zone of the account.
    pub async fn list_zones(&self) -> Result<Vec<HostedZone>, ZoneError> {
        let mut zones = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let page = self.api.list_hosted_zones(marker.as_deref()).await?;
            marker = page.next_token().map(str::to_string);
            zones.extend(page.items);
            if marker.is_none() {
                break;
            }
        }
        Ok(zones)
    }

    /// Looks up the zone named exactly `domain`.
    ///
    /// # Errors
    ///
    /// Returns `ZoneError::ZoneNotFound` unless the first zone in name order
    /// starting at `domain` has exactly that name.
    pub async fn get_zone(&self, domain: &str) -> Result<HostedZone, ZoneError> {
        let wanted = normalize_domain(domain);
        let candidates = self.api.list_hosted_zones_by_name(&wanted, 1).await?;
        match candidates.into_iter().next() {
            Some(zone) if normalize_domain(&zone.name) == wanted => Ok(zone),
            _ => Err(ZoneError::ZoneNotFound {
                zone: denormalize_domain(&wanted).to_string(),
            }),
        }
    }

    /// Fetches every record set of a zone.
    pub async fn fetch_records(&self, zone_id: &str) -> Result<Vec<ResourceRecordSet>, ZoneError> {
        let mut records = Vec::new();
        let mut start: Option<String> = None;
        loop {
            let page = self.api.list_record_sets(zone_id, start.as_deref()).await?;
            start = page.next_token().map(str::to_string);
            records.extend(page.items);
            if start.is_none() {
                break;
            }
        }
        debug!("Fetched {} record sets from {zone_id}", records.len());
        Ok(records)
    }

    /// Submits a change set.
    ///
    /// # Errors
    ///
    /// Returns `ZoneError::InvalidRecord` before submitting if any record
    /// carries both values and an alias target, or neither.
    pub async fn apply(
        &self,
        zone_id: &str,
        changes: &ChangeSet,
        comment: Option<&str>,
    ) -> Result<ChangeInfo, ZoneError> {
        for change in changes.changes() {
            change.record.validate()?;
        }
        let info = self
            .api
            .change_record_sets(zone_id, changes, comment)
            .await?;
        info!(
            "Submitted {} changes to {zone_id} (change {}, {})",
            changes.len(),
            info.id,
            info.status
        );
        Ok(info)
    }

    /// Polls a change until it is in sync, unless waiting is disabled.
    pub async fn wait_for_propagation(
        &self,
        change_id: &str,
        max_wait: Duration,
    ) -> Result<(), ZoneError> {
        if self.options.no_wait {
            debug!("Not waiting for change {change_id}");
            return Ok(());
        }
        info!("Waiting for change {change_id} to propagate");
        self.change_waiter
            .wait(
                &self.options.cancel,
                max_wait,
                || self.api.get_change(change_id),
                classify_change,
            )
            .await?;
        Ok(())
    }

    /// Waits for `info` unless it is already in sync.
    pub async fn settle(&self, info: &ChangeInfo, max_wait: Duration) -> Result<(), ZoneError> {
        if info.status == ChangeStatus::Insync {
            return Ok(());
        }
        self.wait_for_propagation(&info.id, max_wait).await
    }

    /// Creates a zone and returns it as the provider reports it afterwards.
    pub async fn create_zone(&self, domain: &str) -> Result<HostedZone, ZoneError> {
        let name = normalize_domain(domain);
        let caller_reference = format!(
            "{}-{}",
            denormalize_domain(&name),
            chrono::Utc::now().timestamp()
        );
        let created = self
            .api
            .create_hosted_zone(&name, &caller_reference, CREATED_ZONE_COMMENT)
            .await?;
        info!(
            "Created zone {name} ({}) with nameservers {}",
            created.zone.id,
            created.nameservers.join(", ")
        );

        self.settle(&created.change, CREATE_MAX_WAIT).await?;
        // Creation responses can be incomplete.
        Ok(self.api.get_hosted_zone(&created.zone.id).await?)
    }

    /// Returns the zone named `domain`, creating it if it does not exist.
    pub async fn get_or_create_zone(&self, domain: &str) -> Result<HostedZone, ZoneError> {
        match self.get_zone(domain).await {
            Ok(zone) => Ok(zone),
            Err(e) if e.is_zone_not_found() => self.create_zone(domain).await,
            Err(e) => Err(e),
        }
    }

    /// Returns the NS record set of a zone.
    pub async fn get_ns_records(&self, zone_id: &str) -> Result<ResourceRecordSet, ZoneError> {
        let records = self.fetch_records(zone_id).await?;
        find_ns_record(zone_id, &records).cloned()
    }

    /// Points the registrar at the zone's nameservers if it does not already.
    ///
    /// # Returns
    ///
    /// `true` if the registrar was updated.
    pub async fn update_registrar_ns(&self, domain: &str, zone_id: &str) -> Result<bool, ZoneError> {
        let registrar = self.registrar.as_ref().ok_or_else(|| ZoneError::NoRegistrar {
            domain: domain.to_string(),
        })?;
        let domain = denormalize_domain(domain);

        let ns_record = self.get_ns_records(zone_id).await?;
        let registered = registrar.get_domain_nameservers(domain).await?;
        if match_ns_records(registered.as_slice(), ns_record.values.as_slice()) {
            info!("Registrar nameservers of {domain} already match the zone");
            return Ok(false);
        }

        let nameservers: Vec<String> = ns_record
            .values
            .iter()
            .map(|ns| denormalize_domain(ns).to_string())
            .collect();
        let operation_id = registrar
            .update_domain_nameservers(domain, &nameservers)
            .await?;
        info!(
            "Updating registrar nameservers of {domain} to {} (operation {operation_id})",
            nameservers.join(", ")
        );

        if !self.options.no_wait {
            wait_for_operation(
                registrar.as_ref(),
                &self.options.cancel,
                &operation_id,
                OperationStatus::Successful,
                NAMESERVER_UPDATE_MAX_WAIT,
            )
            .await?;
        }
        Ok(true)
    }

    /// Deletes every record except NS and SOA sets.
    ///
    /// # Returns
    ///
    /// The submitted change, or `None` if there was nothing to delete.
    pub async fn delete_records(
        &self,
        zone_id: &str,
        zone_name: &str,
        records: &[ResourceRecordSet],
    ) -> Result<Option<ChangeInfo>, ZoneError> {
        let mut changes = ChangeSet::new(zone_name);
        for record in records
            .iter()
            .filter(|record| !record.record_type.is_zone_infrastructure())
        {
            changes.push(ChangeAction::Delete, record.clone());
        }
        if changes.is_empty() {
            debug!("No records to delete in {zone_id}");
            return Ok(None);
        }
        self.apply(zone_id, &changes, None).await.map(Some)
    }

    /// Deletes an empty zone.
    pub async fn delete_zone(&self, zone_id: &str) -> Result<ChangeInfo, ZoneError> {
        let info = self.api.delete_hosted_zone(zone_id).await?;
        info!("Deleted zone {zone_id} (change {})", info.id);
        Ok(info)
    }

    pub async fn get_zone_tags(&self, zone_id: &str) -> Result<Vec<Tag>, ZoneError> {
        Ok(self.api.list_tags(resource_id(zone_id)).await?)
    }

    /// Adds or overwrites tags on a zone. Last writer wins.
    pub async fn upsert_tags(&self, zone_id: &str, tags: &[Tag]) -> Result<(), ZoneError> {
        Ok(self.api.add_tags(resource_id(zone_id), tags).await?)
    }
}

fn classify_change(result: &Result<ChangeInfo, ApiError>) -> PollDecision {
    match result {
        Ok(info) if info.status == ChangeStatus::Insync => PollDecision::Succeed,
        Ok(_) => PollDecision::Retry,
        Err(e) => PollDecision::Fail(e.to_string()),
    }
}
