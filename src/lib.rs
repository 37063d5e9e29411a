/*============================================================
  Synavera Project: Partinfo
  Module: partinfo_core
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Typed access to CouchDB/Cloudant partition metadata: the
    response mapper, its value types, and the HTTP client
    that feeds it.

  Security / Safety Notes:
    The mapper performs no I/O; the client issues GETs only.

  Dependencies:
    See individual modules.

  Operational Scope:
    Library half of the `partinfo` binary.

  Revision History:
    2026-10-19 COD  Split library from binary entry point.
============================================================*/

pub mod client;
pub mod config;
pub mod error;
pub mod logger;
pub mod mapper;
pub mod partition_info;
pub mod report;

pub use error::{DecodeError, PartinfoError};
pub use mapper::ResponseMapper;
pub use partition_info::{Indexes, PartitionInfo, PartitionedIndexes, Sizes};
