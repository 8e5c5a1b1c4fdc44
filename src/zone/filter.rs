//! Record set filters.

use super::types::{RecordType, ResourceRecordSet};
use crate::domain::normalize_domain;
use crate::error_handling::ZoneError;

/// What a parked zone already has in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParkedResources {
    pub has_a: bool,
    pub has_aaaa: bool,
    pub has_www_cname: bool,
}

impl ParkedResources {
    /// A parked zone has an apex address and the `www` CNAME.
    pub fn is_parked(&self) -> bool {
        (self.has_a || self.has_aaaa) && self.has_www_cname
    }
}

/// Drops every record whose type is in `types`.
pub fn remove_record_types(
    records: Vec<ResourceRecordSet>,
    types: &[RecordType],
) -> Vec<ResourceRecordSet> {
    records
        .into_iter()
        .filter(|record| !types.contains(&record.record_type))
        .collect()
}

/// Returns the first NS record set.
pub fn find_ns_record<'a>(
    zone_id: &str,
    records: &'a [ResourceRecordSet],
) -> Result<&'a ResourceRecordSet, ZoneError> {
    records
        .iter()
        .find(|record| record.record_type == RecordType::Ns)
        .ok_or_else(|| ZoneError::NoNsRecord {
            zone_id: zone_id.to_string(),
        })
}

/// Finds the apex A/AAAA records and the `www` CNAME of a parked zone.
pub fn find_parked_records<'a>(
    records: &'a [ResourceRecordSet],
    zone_name: &str,
) -> (Vec<&'a ResourceRecordSet>, ParkedResources) {
    let apex = normalize_domain(zone_name);
    let www = format!("www.{apex}");
    let mut found = Vec::new();
    let mut resources = ParkedResources::default();

    for record in records {
        let name = normalize_domain(&record.name);
        match record.record_type {
            RecordType::A if name == apex => resources.has_a = true,
            RecordType::Aaaa if name == apex => resources.has_aaaa = true,
            RecordType::Cname if name == www => resources.has_www_cname = true,
            _ => continue,
        }
        found.push(record);
    }
    (found, resources)
}
