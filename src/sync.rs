//! Reconciliation of a descriptor table with the signals found in a HDL source.
//!
//! Descriptors are matched by name only: a signal whose width or access changed
//! in the source is not reported. The engine never modifies or removes existing
//! rows, it only appends new signals, and leaves committing to the store to the caller.

use std::{collections::HashSet, path::Path};

use tracing::{info, warn};

use crate::{
    descriptor::{record, ArtifactKind, Direction, Record, Table, PAD_KEYS, REG_KEYS},
    error::{VgenError, VgenResult},
    parser::Signal,
};

const SUFFIX_PORTEN: &str = "_PORTEN";
const SUFFIX_PORTIN: &str = "_PORTIN";
const SUFFIX_PORTOUT: &str = "_PORTOUT";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SyncVariant {
    /// Register table: missing signals are only reported
    Registers,
    /// Pad table: single-bit ports, bidir collapsing, missing signals are fatal
    Pads,
}

impl SyncVariant {
    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            SyncVariant::Registers => &REG_KEYS,
            SyncVariant::Pads => &PAD_KEYS,
        }
    }

    /// Header of a new descriptor store: required keys followed by the keys needed for generation
    pub fn store_keys(&self) -> Vec<&'static str> {
        let kinds: &[ArtifactKind] = match self {
            SyncVariant::Registers => &ArtifactKind::REGS,
            SyncVariant::Pads => &ArtifactKind::PADS,
        };
        let mut keys = self.required_keys().to_vec();
        for k in ArtifactKind::schema(kinds) {
            if !keys.contains(&k) {
                keys.push(k);
            }
        }
        keys
    }
}

#[derive(Clone, Debug)]
pub struct SyncOptions {
    /// Source signals starting with this prefix are ignored
    pub ignore_prefix: Option<String>,
    /// Name of the descriptor table in reports
    pub table_label: String,
    /// Name of the HDL source in reports
    pub source_label: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            ignore_prefix: None,
            table_label: "descriptor table".to_owned(),
            source_label: "source".to_owned(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SyncReport {
    /// Signals present in the source but not in the table
    pub new_in_source: Vec<Signal>,
    /// Descriptors absent from the source
    pub missing_in_source: Vec<String>,
    /// Signals skipped because of the ignore prefix
    pub ignored: Vec<String>,
    /// `_PORTIN`/`_PORTOUT` signals merged in their bidir pad
    pub bidir_dropped: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct SyncOutcome {
    /// Descriptor table with the new records appended
    pub table: Table,
    /// Records to append to the store
    pub new_records: Vec<Record>,
    pub report: SyncReport,
}

impl SyncOutcome {

    /// True when the descriptor store needs to be updated
    pub fn changed(&self) -> bool {
        !self.new_records.is_empty()
    }

    /// Append new records to the store and its optional mirror
    pub fn commit(&self, store: &Path, mirror: Option<&Path>, variant: SyncVariant) -> VgenResult<()> {
        if !self.changed() {
            info!("Nothing to update in {}", store.display());
            return Ok(());
        }
        info!("Updating descriptor store {}", store.display());
        let header = variant.store_keys();
        Table::append(store, &self.new_records, variant.required_keys(), &header)?;
        if let Some(mirror) = mirror {
            info!("Updating mirror store {}", mirror.display());
            Table::append(mirror, &self.new_records, variant.required_keys(), &header)?;
        }
        Ok(())
    }
}

/// Merge the three raw ports of a bidirectional pad into a single bidir signal.
/// Returns the collapsed list and the names of dropped signals.
pub fn collapse_bidir(signals: Vec<Signal>) -> (Vec<Signal>, Vec<String>) {
    let mut kept = Vec::with_capacity(signals.len());
    let mut dropped = Vec::new();
    for mut sig in signals {
        if sig.name.ends_with(SUFFIX_PORTIN) || sig.name.ends_with(SUFFIX_PORTOUT) {
            warn!("Ignoring signal {} which is associated with a bidir pad", sig.name);
            dropped.push(sig.name);
        } else if let Some(base) = sig.name.strip_suffix(SUFFIX_PORTEN) {
            info!("Found bidir signal {}", sig.name);
            sig.name = base.to_owned();
            sig.direction = Direction::Bidir;
            kept.push(sig);
        } else {
            kept.push(sig);
        }
    }
    (kept, dropped)
}

/// Build the descriptor record of a new signal following the table column order
fn signal_record(sig: &Signal, columns: &[String], variant: SyncVariant) -> Record {
    let known = match variant {
        SyncVariant::Pads => record([
            ("name", sig.name.clone()),
            ("direction", sig.direction.to_string()),
        ]),
        SyncVariant::Registers => record([
            ("name", sig.name.clone()),
            ("nbits", sig.nbits.to_string()),
        ]),
    };
    let keys: Vec<String> = if columns.is_empty() {
        variant.store_keys().iter().map(|k| k.to_string()).collect()
    } else {
        columns.to_vec()
    };
    keys.into_iter()
        .map(|k| {
            let v = known.get(&k).cloned().unwrap_or_default();
            (k, v)
        })
        .collect()
}

/// Compare a descriptor table with the signals extracted from a source
pub fn reconcile(table: &Table, signals: Vec<Signal>, variant: SyncVariant, opts: &SyncOptions) -> VgenResult<SyncOutcome> {
    table.check_keys(variant.required_keys())?;
    table.check_unique()?;
    let mut report = SyncReport::default();

    // Power/ground pads have no matching port
    let table_names: Vec<&str> = match variant {
        SyncVariant::Pads => table
            .iter()
            .filter(|r| Direction::from_cell(r.get("direction").map(|s| s.as_str()).unwrap_or("")).is_io())
            .map(|r| r.get("name").map(|s| s.as_str()).unwrap_or(""))
            .collect(),
        SyncVariant::Registers => table.names().collect(),
    };

    let mut signals: Vec<Signal> = signals
        .into_iter()
        .filter(|s| variant == SyncVariant::Registers || s.direction.is_io())
        .filter(|s| match &opts.ignore_prefix {
            Some(p) if !p.is_empty() && s.name.starts_with(p.as_str()) => {
                warn!("Ignoring signal {} as it matches the ignore prefix ({p})", s.name);
                report.ignored.push(s.name.clone());
                false
            }
            _ => true,
        })
        .collect();

    if variant == SyncVariant::Pads {
        if let Some(s) = signals.iter().find(|s| s.nbits != 1) {
            return Err(VgenError::Width { name: s.name.clone(), nbits: s.nbits });
        }
        let (collapsed, dropped) = collapse_bidir(signals);
        signals = collapsed;
        report.bidir_dropped = dropped;
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(signals.len());
    if let Some(s) = signals.iter().find(|s| !seen.insert(s.name.as_str())) {
        return Err(VgenError::Duplicated(s.name.clone()));
    }

    let known: HashSet<&str> = table_names.iter().copied().collect();
    let all_names: HashSet<&str> = table.names().collect();
    let found: HashSet<&str> = signals.iter().map(|s| s.name.as_str()).collect();
    report.missing_in_source = table_names
        .iter()
        .filter(|n| !found.contains(**n))
        .map(|n| n.to_string())
        .collect();
    report.new_in_source = signals
        .iter()
        .filter(|s| !known.contains(s.name.as_str()))
        .filter(|s| {
            let listed = all_names.contains(s.name.as_str());
            if listed {
                warn!("Signal {} matches a descriptor which is not an IO: not added", s.name);
            }
            !listed
        })
        .cloned()
        .collect();

    if !report.missing_in_source.is_empty() {
        match variant {
            SyncVariant::Pads => {
                return Err(VgenError::Consistency {
                    table: opts.table_label.clone(),
                    hdl: opts.source_label.clone(),
                    names: report.missing_in_source,
                });
            }
            SyncVariant::Registers => warn!(
                "Found signals in {} not in {}: {:?}",
                opts.table_label, opts.source_label, report.missing_in_source
            ),
        }
    }

    let new_records: Vec<Record> = report
        .new_in_source
        .iter()
        .map(|s| signal_record(s, &table.columns, variant))
        .collect();
    if !new_records.is_empty() {
        info!(
            "Found new signals in {} (not listed in {}): {:?}",
            opts.source_label,
            opts.table_label,
            report.new_in_source.iter().map(|s| s.name.as_str()).collect::<Vec<_>>()
        );
    }

    let mut updated = table.clone();
    if updated.columns.is_empty() {
        updated.columns = variant.store_keys().iter().map(|k| k.to_string()).collect();
    }
    updated.records.extend(new_records.iter().cloned());
    Ok(SyncOutcome { table: updated, new_records, report })
}
