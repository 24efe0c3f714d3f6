//! Grouping of crash records by signature.

use crate::parser::schema::{CrashRecord, Counts, SignatureGroup};
use log::debug;
use std::collections::BTreeMap;

/// Group crash records by signature hash
///
/// **Public** - used by the batch runner and by tests
///
/// Single pass over `records` in processing order, so member lists keep
/// that order. Groups come back sorted by member count (descending), ties
/// broken by hash (ascending).
pub fn group_by_signature(records: &[CrashRecord]) -> Vec<SignatureGroup> {
    let mut by_hash: BTreeMap<&str, Vec<String>> = BTreeMap::new();

    for record in records {
        by_hash
            .entry(record.signature_hash.as_str())
            .or_default()
            .push(record.crash_file.clone());
    }

    let mut groups: Vec<SignatureGroup> = by_hash
        .into_iter()
        .map(|(hash, crashes)| SignatureGroup {
            signature_hash: hash.to_string(),
            crashes,
        })
        .collect();

    sort_groups(&mut groups);

    debug!("Grouped {} crashes into {} signatures", records.len(), groups.len());

    groups
}

/// Order groups by size (desc), then hash (asc)
pub fn sort_groups(groups: &mut [SignatureGroup]) {
    groups.sort_by(|a, b| {
        b.crashes
            .len()
            .cmp(&a.crashes.len())
            .then_with(|| a.signature_hash.cmp(&b.signature_hash))
    });
}

/// Total and unique counts for a set of records and their groups
pub fn count(records: &[CrashRecord], groups: &[SignatureGroup]) -> Counts {
    Counts {
        total_crashes: records.len(),
        unique_signatures: groups.len(),
    }
}
