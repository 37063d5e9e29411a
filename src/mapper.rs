/*============================================================
  Synavera Project: Partinfo
  Module: partinfo_core::mapper
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Map a raw `_partition/{key}` response body onto a validated
    PartitionInfo value.

  Security / Safety Notes:
    Operates on an in-memory buffer only. Never logs payload
    contents; errors name the field, not its value.

  Dependencies:
    serde_json for structured-text parsing.

  Operational Scope:
    Called by the HTTP client after a successful response and
    by the CLI when decoding saved bodies offline.

  Revision History:
    2026-10-19 COD  Implemented explicit per-field decode table.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Whole-value decoding; never a partially populated result
    - Unknown keys ignored for forward compatibility
    - Absent nested objects represented, not assumed
============================================================*/

use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::partition_info::{Indexes, PartitionInfo, PartitionedIndexes, Sizes};

type Object = Map<String, Value>;

/// Stateless decoder for partition info response bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseMapper;

impl ResponseMapper {
    /// Decode a response body into a `PartitionInfo`.
    ///
    /// Missing numeric fields default to zero and `null` is treated as an
    /// absent key. Negative, fractional, or non-numeric values yield
    /// `InvalidField` naming the dotted wire path of the field.
    pub fn decode(raw_body: &[u8]) -> Result<PartitionInfo, DecodeError> {
        let document: Value = serde_json::from_slice(raw_body)
            .map_err(|err| DecodeError::Malformed(err.to_string()))?;
        let root = match document {
            Value::Object(root) => root,
            other => {
                return Err(DecodeError::Malformed(format!(
                    "expected a JSON object, found {}",
                    kind_of(&other)
                )))
            }
        };

        Ok(PartitionInfo {
            partition: read_partition(&root)?,
            doc_count: read_u64(&root, "", "doc_count")?,
            doc_del_count: read_u64(&root, "", "doc_del_count")?,
            partitioned_indexes: read_object(&root, "", "partitioned_indexes")?
                .map(decode_partitioned_indexes)
                .transpose()?,
            sizes: read_object(&root, "", "sizes")?
                .map(decode_sizes)
                .transpose()?,
        })
    }
}

fn decode_partitioned_indexes(object: &Object) -> Result<PartitionedIndexes, DecodeError> {
    const PATH: &str = "partitioned_indexes";
    Ok(PartitionedIndexes {
        count: read_u64(object, PATH, "count")?,
        limit: read_u64(object, PATH, "limit")?,
        indexes: read_object(object, PATH, "indexes")?
            .map(decode_indexes)
            .transpose()?,
    })
}

fn decode_indexes(object: &Object) -> Result<Indexes, DecodeError> {
    const PATH: &str = "partitioned_indexes.indexes";
    Ok(Indexes {
        search: read_u64(object, PATH, "search")?,
        view: read_u64(object, PATH, "view")?,
    })
}

fn decode_sizes(object: &Object) -> Result<Sizes, DecodeError> {
    const PATH: &str = "sizes";
    Ok(Sizes {
        active: read_u64(object, PATH, "active")?,
        external: read_u64(object, PATH, "external")?,
    })
}

fn read_partition(root: &Object) -> Result<Option<String>, DecodeError> {
    match present(root, "partition") {
        None => Ok(None),
        Some(Value::String(key)) if !key.is_empty() => Ok(Some(key.clone())),
        Some(_) => Err(invalid("", "partition")),
    }
}

fn read_u64(object: &Object, path: &str, key: &str) -> Result<u64, DecodeError> {
    match present(object, key) {
        None => Ok(0),
        Some(value) => value.as_u64().ok_or_else(|| invalid(path, key)),
    }
}

fn read_object<'a>(
    object: &'a Object,
    path: &str,
    key: &str,
) -> Result<Option<&'a Object>, DecodeError> {
    match present(object, key) {
        None => Ok(None),
        Some(Value::Object(nested)) => Ok(Some(nested)),
        Some(_) => Err(invalid(path, key)),
    }
}

fn present<'a>(object: &'a Object, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}

fn invalid(path: &str, key: &str) -> DecodeError {
    if path.is_empty() {
        DecodeError::InvalidField(key.to_string())
    } else {
        DecodeError::InvalidField(format!("{path}.{key}"))
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
