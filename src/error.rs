/*============================================================
  Synavera Project: Partinfo
  Module: partinfo_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise Partinfo-Core error types: the response mapper's
    decode taxonomy and the crate-wide error with exit codes.

  Security / Safety Notes:
    Error contexts never include credentials; HTTP errors carry
    only the server's error/reason strings and the status.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    DecodeError is returned by the mapper to its immediate
    caller; PartinfoError propagates to the binary entry point.

  Revision History:
    2026-10-19 COD  Split decode taxonomy from runtime errors.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Partinfo-Core operations.
pub type Result<T> = std::result::Result<T, PartinfoError>;

/// Failures produced while mapping a response body onto `PartitionInfo`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The body is not a well-formed JSON object.
    #[error("malformed partition info body: {0}")]
    Malformed(String),
    /// A present field has the wrong type or an out-of-range value.
    #[error("invalid field `{0}` in partition info body")]
    InvalidField(String),
}

impl DecodeError {
    /// Wire path of the offending field, if the error names one.
    pub fn field(&self) -> Option<&str> {
        match self {
            DecodeError::InvalidField(name) => Some(name),
            DecodeError::Malformed(_) => None,
        }
    }
}

/// Enumerates high-level error domains surfaced by Partinfo-Core.
#[derive(Debug, Error)]
pub enum PartinfoError {
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Network: {0}")]
    Network(String),
    #[error("HTTP {status}: {error}{}", fmt_reason(.reason))]
    Http {
        status: u16,
        error: String,
        reason: Option<String>,
    },
    #[error("Decode: {0}")]
    Decode(#[from] DecodeError),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Runtime: {0}")]
    Runtime(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn fmt_reason(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|reason| format!(" ({reason})"))
        .unwrap_or_default()
}

impl PartinfoError {
    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    fn exit_status(&self) -> u8 {
        match self {
            PartinfoError::Config(_) => 20,
            PartinfoError::Network(_) => 30,
            PartinfoError::Decode(_) => 31,
            PartinfoError::Http { .. } => 32,
            PartinfoError::Filesystem(_) => 40,
            PartinfoError::Io(_) => 41,
            PartinfoError::Runtime(_) => 50,
        }
    }
}
