//! Hosted zones: data model, provider seams and the diff/apply engine.
//!
//! This module provides:
//! - The record set and change set model
//! - [`HostedZoneApi`] / [`RegistrarApi`] provider traits
//! - [`RouteManager`], the zone record store and diff/apply engine
//! - The NS matcher and record filters
//! - [`MemoryProvider`], an account kept in a JSON state file
//! - The zone-file writer

mod api;
mod export;
mod filter;
mod manager;
mod matcher;
mod memory;
mod operation;
mod types;

// Re-export public API
pub use api::{CreatedZone, HostedZoneApi, Page, RegistrarApi};
pub use export::{most_common_ttl, render_zone_file};
pub use filter::{find_ns_record, find_parked_records, remove_record_types, ParkedResources};
pub use manager::{diff, RouteManager, RouteManagerOptions};
pub use matcher::match_ns_records;
pub use memory::{AccountState, MemoryProvider, RegisteredDomain, StoredZone};
pub use operation::{classify_operation, wait_for_operation};
pub use types::{
    resource_id, AliasTarget, Change, ChangeAction, ChangeInfo, ChangeSet, ChangeStatus,
    GeoLocation, HostedZone, OperationDetail, OperationStatus, RecordType, ResourceRecordSet, Tag,
};
