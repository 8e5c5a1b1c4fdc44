//! Provider API seams.
//!
//! [`HostedZoneApi`] covers the DNS-hosting service and [`RegistrarApi`] the
//! domain registrar. List operations are paginated: a page carries the token
//! of the next page, and `None` or an empty token ends the listing.

use async_trait::async_trait;

use super::types::{
    ChangeInfo, ChangeSet, HostedZone, OperationDetail, ResourceRecordSet, Tag,
};
use crate::error_handling::ApiError;

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    /// The token of the next page, if the listing continues.
    pub fn next_token(&self) -> Option<&str> {
        self.next.as_deref().filter(|token| !token.is_empty())
    }
}

/// Result of creating a hosted zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedZone {
    pub zone: HostedZone,
    pub change: ChangeInfo,
    /// Nameservers the provider assigned to the zone.
    pub nameservers: Vec<String>,
}

/// DNS-hosting service.
#[async_trait]
pub trait HostedZoneApi: Send + Sync {
    async fn list_hosted_zones(&self, marker: Option<&str>) -> Result<Page<HostedZone>, ApiError>;

    /// Zones in name order, starting at `dns_name`.
    async fn list_hosted_zones_by_name(
        &self,
        dns_name: &str,
        max_items: usize,
    ) -> Result<Vec<HostedZone>, ApiError>;

    async fn get_hosted_zone(&self, zone_id: &str) -> Result<HostedZone, ApiError>;

    async fn create_hosted_zone(
        &self,
        name: &str,
        caller_reference: &str,
        comment: &str,
    ) -> Result<CreatedZone, ApiError>;

    async fn delete_hosted_zone(&self, zone_id: &str) -> Result<ChangeInfo, ApiError>;

    async fn list_record_sets(
        &self,
        zone_id: &str,
        start: Option<&str>,
    ) -> Result<Page<ResourceRecordSet>, ApiError>;

    async fn change_record_sets(
        &self,
        zone_id: &str,
        changes: &ChangeSet,
        comment: Option<&str>,
    ) -> Result<ChangeInfo, ApiError>;

    async fn get_change(&self, change_id: &str) -> Result<ChangeInfo, ApiError>;

    async fn list_tags(&self, resource_id: &str) -> Result<Vec<Tag>, ApiError>;

    async fn add_tags(&self, resource_id: &str, tags: &[Tag]) -> Result<(), ApiError>;
}

/// Domain registrar.
#[async_trait]
pub trait RegistrarApi: Send + Sync {
    async fn get_domain_nameservers(&self, domain: &str) -> Result<Vec<String>, ApiError>;

    /// Starts a nameserver update and returns its operation id.
    async fn update_domain_nameservers(
        &self,
        domain: &str,
        nameservers: &[String],
    ) -> Result<String, ApiError>;

    async fn get_operation_detail(&self, operation_id: &str) -> Result<OperationDetail, ApiError>;
}
