//! Takeover detectors.
//!
//! Each detector checks one family of external resources. Every detector runs
//! against every record, in declaration order, whether or not an earlier one
//! already reported the record.

use log::debug;
use strum_macros::{Display, EnumIter};

use super::probe::Prober;
use crate::config::{
    CDN_SUFFIX, OBJECT_STORAGE_SUFFIX, OBJECT_STORAGE_WEBSITE_MARKER, PAAS_SUFFIX,
};
use crate::dns::Resolve;
use crate::domain::denormalize_domain;
use crate::zone::{RecordType, ResourceRecordSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Detector {
    CdnAlias,
    CdnCname,
    PaasAlias,
    PaasCname,
    ObjectStorageCname,
    ObjectStorageAlias,
    CnameResolves,
    AliasResolves,
}

/// Result of one detector on one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NotApplicable,
    Clean,
    Vulnerable(String),
    Misconfigured(String),
}

/// Lowercased, dot-less alias destination.
fn alias_destination(record: &ResourceRecordSet) -> Option<String> {
    record
        .alias_target
        .as_ref()
        .map(|alias| denormalize_domain(&alias.dns_name).to_lowercase())
}

/// Lowercased, dot-less first value of a CNAME record.
fn cname_destination(record: &ResourceRecordSet) -> Option<String> {
    if record.record_type != RecordType::Cname {
        return None;
    }
    record
        .values
        .first()
        .map(|value| denormalize_domain(value.trim()).to_lowercase())
}

fn is_object_storage(destination: &str) -> bool {
    (destination.ends_with(OBJECT_STORAGE_SUFFIX) && destination.contains("s3"))
        || destination.contains(OBJECT_STORAGE_WEBSITE_MARKER)
}

impl Detector {
    /// Runs this detector against `record`.
    ///
    /// Probe failures never propagate: an unclassified failure is logged and
    /// the record is considered clean for this detector.
    pub async fn run(
        self,
        record: &ResourceRecordSet,
        resolver: &dyn Resolve,
        prober: &dyn Prober,
    ) -> Outcome {
        match self {
            Detector::CdnAlias => match alias_destination(record) {
                Some(dst) if dst.ends_with(CDN_SUFFIX) && record.record_type != RecordType::Aaaa => {
                    probe(prober, &record.name).await
                }
                _ => Outcome::NotApplicable,
            },
            Detector::CdnCname => match cname_destination(record) {
                Some(dst) if dst.ends_with(CDN_SUFFIX) => probe(prober, &record.name).await,
                _ => Outcome::NotApplicable,
            },
            Detector::PaasAlias => match alias_destination(record) {
                Some(dst) if dst.ends_with(PAAS_SUFFIX) => {
                    missing_environment(resolver, &record.name, false).await
                }
                _ => Outcome::NotApplicable,
            },
            Detector::PaasCname => match cname_destination(record) {
                Some(dst) if dst.ends_with(PAAS_SUFFIX) => {
                    missing_environment(resolver, &record.name, true).await
                }
                _ => Outcome::NotApplicable,
            },
            Detector::ObjectStorageCname => match cname_destination(record) {
                Some(dst) if is_object_storage(&dst) => probe(prober, &dst).await,
                _ => Outcome::NotApplicable,
            },
            Detector::ObjectStorageAlias => match alias_destination(record) {
                Some(dst) if is_object_storage(&dst) => probe(prober, &dst).await,
                _ => Outcome::NotApplicable,
            },
            Detector::CnameResolves => match cname_destination(record) {
                Some(_) => missing_name(resolver, &record.name).await,
                None => Outcome::NotApplicable,
            },
            Detector::AliasResolves => match alias_destination(record) {
                Some(_) => missing_name(resolver, &record.name).await,
                None => Outcome::NotApplicable,
            },
        }
    }
}

async fn probe(prober: &dyn Prober, host: &str) -> Outcome {
    match prober.missing_bucket(host).await {
        Ok(true) => Outcome::Vulnerable("dangling reference".to_string()),
        Ok(false) => Outcome::Clean,
        Err(e) => match e.misconfiguration() {
            Some(reason) => Outcome::Misconfigured(reason),
            None => {
                debug!("Probe of {host} inconclusive: {e}");
                Outcome::Clean
            }
        },
    }
}

/// `true` if an A query for `name` gets a definitive NXDOMAIN.
async fn resolves_to_nothing(resolver: &dyn Resolve, name: &str) -> bool {
    match resolver.resolve(name, RecordType::A).await {
        Err(e) if e.is_not_found() => true,
        Err(e) => {
            debug!("A lookup of {name} inconclusive: {e}");
            false
        }
        Ok(_) => false,
    }
}

async fn missing_name(resolver: &dyn Resolve, name: &str) -> Outcome {
    if resolves_to_nothing(resolver, name).await {
        Outcome::Vulnerable("points to missing name".to_string())
    } else {
        Outcome::Clean
    }
}

async fn missing_environment(resolver: &dyn Resolve, name: &str, confirm_cname: bool) -> Outcome {
    if !resolves_to_nothing(resolver, name).await {
        return Outcome::Clean;
    }
    // A CNAME still published for a name without addresses is the dangling case.
    if confirm_cname && resolver.resolve(name, RecordType::Cname).await.is_err() {
        return Outcome::Clean;
    }
    Outcome::Vulnerable("PaaS environment does not exist".to_string())
}
