/*============================================================
  Synavera Project: Partinfo
  Module: partinfo_core::partition_info
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Immutable value types describing a database partition:
    document counts, partitioned index counts, and sizes.

  Security / Safety Notes:
    Pure data container; no I/O performed in this module.

  Dependencies:
    serde for report serialization.

  Operational Scope:
    Produced by the response mapper, consumed by the CLI and
    report builder.

  Revision History:
    2026-10-19 COD  Introduced partition value types.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Absent nested objects are explicit Options, never assumed
    - Deterministic diagnostic rendering for logs and tests
============================================================*/

use std::fmt;

use serde::Serialize;

/// Placeholder rendered in place of values absent from the payload.
pub const UNAVAILABLE: &str = "unavailable";

/// Metadata for a single database partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartitionInfo {
    pub(crate) partition: Option<String>,
    pub(crate) doc_count: u64,
    pub(crate) doc_del_count: u64,
    pub(crate) partitioned_indexes: Option<PartitionedIndexes>,
    pub(crate) sizes: Option<Sizes>,
}

/// Partitioned index totals and their configured limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PartitionedIndexes {
    pub(crate) count: u64,
    pub(crate) limit: u64,
    pub(crate) indexes: Option<Indexes>,
}

/// Breakdown of partitioned indexes by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Indexes {
    pub(crate) search: u64,
    pub(crate) view: u64,
}

/// Storage sizes of a partition, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Sizes {
    pub(crate) active: u64,
    pub(crate) external: u64,
}

impl PartitionInfo {
    /// The partition key, when the server reported one.
    pub fn partition(&self) -> Option<&str> {
        self.partition.as_deref()
    }

    /// Count of live documents in the partition.
    pub fn doc_count(&self) -> u64 {
        self.doc_count
    }

    /// Count of deleted documents in the partition.
    pub fn doc_del_count(&self) -> u64 {
        self.doc_del_count
    }

    /// Partitioned index metadata, or `None` when the server omitted it.
    pub fn partitioned_indexes(&self) -> Option<&PartitionedIndexes> {
        self.partitioned_indexes.as_ref()
    }

    /// Size information, or `None` when the server omitted it.
    pub fn sizes(&self) -> Option<&Sizes> {
        self.sizes.as_ref()
    }

    /// Live data size, or `None` when `sizes` was absent.
    pub fn active_size(&self) -> Option<u64> {
        self.sizes.map(|sizes| sizes.active)
    }

    /// Uncompressed content size, or `None` when `sizes` was absent.
    pub fn external_size(&self) -> Option<u64> {
        self.sizes.map(|sizes| sizes.external)
    }
}

impl PartitionedIndexes {
    /// Total partitioned index count.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Configured maximum number of partitioned indexes.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Breakdown by index kind, or `None` when the server omitted it.
    pub fn indexes(&self) -> Option<&Indexes> {
        self.indexes.as_ref()
    }
}

impl Indexes {
    /// Count of partitioned search indexes.
    pub fn search(&self) -> u64 {
        self.search
    }

    /// Count of partitioned view indexes.
    pub fn view(&self) -> u64 {
        self.view
    }
}

impl Sizes {
    /// Bytes of live data.
    pub fn active(&self) -> u64 {
        self.active
    }

    /// Bytes of uncompressed content.
    pub fn external(&self) -> u64 {
        self.external
    }
}

struct OrUnavailable<T>(Option<T>);

impl<T: fmt::Display> fmt::Display for OrUnavailable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => fmt::Display::fmt(value, f),
            None => f.write_str(UNAVAILABLE),
        }
    }
}

impl fmt::Display for PartitionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PartitionInfo [docCount={}, docDelCount={}, partition={}, sizes=Sizes [external={}, active={}]]",
            self.doc_count,
            self.doc_del_count,
            OrUnavailable(self.partition()),
            OrUnavailable(self.external_size()),
            OrUnavailable(self.active_size()),
        )
    }
}
