//! Zone data model.
//!
//! Record sets mirror the hosted-zone provider's shape: every routing-policy
//! field is carried so that copying a zone never silently drops one.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::domain::normalize_domain;
use crate::error_handling::ZoneError;

/// DNS record types supported by the hosted-zone provider.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RecordType {
    A,
    Aaaa,
    Caa,
    Cname,
    Ds,
    Mx,
    Naptr,
    Ns,
    Ptr,
    Soa,
    Spf,
    Srv,
    Txt,
}

impl RecordType {
    /// Wire type code.
    pub fn code(self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::Ns => 2,
            RecordType::Cname => 5,
            RecordType::Soa => 6,
            RecordType::Ptr => 12,
            RecordType::Mx => 15,
            RecordType::Txt => 16,
            RecordType::Aaaa => 28,
            RecordType::Srv => 33,
            RecordType::Naptr => 35,
            RecordType::Ds => 43,
            RecordType::Spf => 99,
            RecordType::Caa => 257,
        }
    }

    /// NS and SOA records are managed by the provider at the apex.
    pub fn is_zone_infrastructure(self) -> bool {
        matches!(self, RecordType::Ns | RecordType::Soa)
    }
}

/// Alias to a provider-managed resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasTarget {
    pub hosted_zone_id: String,
    pub dns_name: String,
    #[serde(default)]
    pub evaluate_target_health: bool,
}

/// Geolocation routing selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continent_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdivision_code: Option<String>,
}

/// A record set: every record of one name and type.
///
/// A record set carries either literal values or an alias target, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecordSet {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_target: Option<AliasTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failover: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_location: Option<GeoLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_value_answer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_check_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_policy_instance_id: Option<String>,
}

impl ResourceRecordSet {
    /// A plain record set with literal values.
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        ttl: i64,
        values: Vec<String>,
    ) -> Self {
        Self {
            ttl: Some(ttl),
            values,
            ..Self::empty(name, record_type)
        }
    }

    /// An alias record set.
    pub fn alias(name: impl Into<String>, record_type: RecordType, target: AliasTarget) -> Self {
        Self {
            alias_target: Some(target),
            ..Self::empty(name, record_type)
        }
    }

    fn empty(name: impl Into<String>, record_type: RecordType) -> Self {
        Self {
            name: normalize_domain(&name.into()),
            record_type,
            ttl: None,
            values: Vec::new(),
            alias_target: None,
            set_identifier: None,
            weight: None,
            region: None,
            failover: None,
            geo_location: None,
            multi_value_answer: None,
            health_check_id: None,
            traffic_policy_instance_id: None,
        }
    }

    pub fn is_alias(&self) -> bool {
        self.alias_target.is_some()
    }

    /// The alias DNS name, or the first literal value.
    pub fn destination(&self) -> Option<&str> {
        match &self.alias_target {
            Some(alias) => Some(alias.dns_name.as_str()),
            None => self.values.first().map(String::as_str),
        }
    }

    /// Checks the values-or-alias invariant.
    pub fn validate(&self) -> Result<(), ZoneError> {
        let invalid = |reason: &str| ZoneError::InvalidRecord {
            name: self.name.clone(),
            reason: reason.to_string(),
        };
        match (self.values.is_empty(), self.alias_target.is_some()) {
            (false, true) => Err(invalid("record has both values and an alias target")),
            (true, false) => Err(invalid("record has neither values nor an alias target")),
            _ => Ok(()),
        }
    }

    /// Identity of the set within a zone.
    pub fn key(&self) -> (&str, RecordType, Option<&str>) {
        (
            self.name.as_str(),
            self.record_type,
            self.set_identifier.as_deref(),
        )
    }
}

/// Change action applied to a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ChangeAction {
    Upsert,
    Delete,
}

/// One change in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub action: ChangeAction,
    pub record: ResourceRecordSet,
}

/// A batch of changes for one zone.
///
/// The apex NS and SOA sets are never part of a change set: [`ChangeSet::push`]
/// refuses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    apex: String,
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new(apex: &str) -> Self {
        Self {
            apex: normalize_domain(apex),
            changes: Vec::new(),
        }
    }

    /// Adds a change. Returns `false` if the record is the apex NS or SOA set.
    pub fn push(&mut self, action: ChangeAction, record: ResourceRecordSet) -> bool {
        if self.is_apex_infrastructure(&record) {
            return false;
        }
        self.changes.push(Change { action, record });
        true
    }

    pub fn is_apex_infrastructure(&self, record: &ResourceRecordSet) -> bool {
        record.record_type.is_zone_infrastructure() && normalize_domain(&record.name) == self.apex
    }

    pub fn apex(&self) -> &str {
        &self.apex
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Propagation status of a submitted change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ChangeStatus {
    Pending,
    Insync,
}

/// Handle on a submitted change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInfo {
    pub id: String,
    pub status: ChangeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A hosted zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedZone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub record_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl HostedZone {
    /// The bare zone identifier, without any `/hostedzone/` style prefix.
    pub fn resource_id(&self) -> &str {
        resource_id(&self.id)
    }
}

/// Returns the last `/`-separated segment of a provider identifier.
pub fn resource_id(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

/// A key/value tag on a hosted zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Status of a registrar operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Submitted,
    InProgress,
    Error,
    Successful,
    Failed,
}

impl OperationStatus {
    pub fn is_failure(self) -> bool {
        matches!(self, OperationStatus::Error | OperationStatus::Failed)
    }
}

/// Registrar operation details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDetail {
    pub id: String,
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
