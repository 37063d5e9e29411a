/*============================================================
  Synavera Project: Partinfo
  Module: partinfo_core::logger
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Structured, append-only session logging for Partinfo-Core
    runs, with a SHA-256 digest sealed at the end.

  Security / Safety Notes:
    Callers pass event codes and summaries only; credentials
    and raw response bodies are never logged.

  Dependencies:
    std::sync::Mutex, chrono for timestamps, sha2 for digests.

  Operational Scope:
    Owned by the binary entry point; the response mapper never
    logs.

  Revision History:
    2026-10-19 COD  Adapted session logger for partition runs.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Append-only logging with UTC timestamps
    - Deterministic formatting for auditability
    - Graceful error propagation on I/O failures
============================================================*/

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::error::{PartinfoError, Result};

/// Severity of a log entry.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        })
    }
}

/// Session logger writing to stderr and an optional file sink.
pub struct Logger {
    sink: Option<Mutex<BufWriter<File>>>,
    path: Option<PathBuf>,
    verbose: bool,
}

impl Logger {
    /// Build a logger; `path` parents are created as needed.
    pub fn new(path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let sink = match &path {
            Some(file_path) => Some(Mutex::new(BufWriter::new(open_append(file_path)?))),
            None => None,
        };
        Ok(Self {
            sink,
            path,
            verbose,
        })
    }

    /// Emit an entry. WARN and ERROR always reach stderr.
    pub fn log<S: AsRef<str>>(&self, level: LogLevel, code: &str, message: S) {
        let entry = format_entry(Utc::now(), level, code, message.as_ref());

        if self.verbose || matches!(level, LogLevel::Warn | LogLevel::Error) {
            eprintln!("{entry}");
        }

        let Some(sink) = &self.sink else {
            return;
        };
        if let Ok(mut writer) = sink.lock() {
            if writeln!(writer, "{entry}").and_then(|_| writer.flush()).is_err() {
                eprintln!(
                    "{}",
                    format_entry(Utc::now(), LogLevel::Error, "LOGGER", "Failed to write log file")
                );
            }
        }
    }

    /// Convenience wrapper for `INFO` level events.
    pub fn info<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Info, code, message);
    }

    /// Convenience wrapper for `WARN` level events.
    pub fn warn<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Warn, code, message);
    }

    /// Convenience wrapper for `ERROR` level events.
    pub fn error<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Error, code, message);
    }

    /// Convenience wrapper for `DEBUG` level events.
    pub fn debug<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Debug, code, message);
    }

    /// Seal the session: write `<log>.hash` holding the log's SHA-256.
    /// Returns the digest path, or `None` when logging to stderr only.
    pub fn finalize(&self) -> Result<Option<PathBuf>> {
        let Some(path) = self.path.as_deref() else {
            return Ok(None);
        };
        let data = std::fs::read(path).map_err(|err| {
            PartinfoError::Filesystem(format!(
                "Failed to read log for hashing {}: {err}",
                path.display()
            ))
        })?;
        let digest = Sha256::digest(&data);
        let hash_path = digest_path(path);
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        std::fs::write(&hash_path, format!("{digest:x}  {name}\n")).map_err(|err| {
            PartinfoError::Filesystem(format!(
                "Failed to write hash file {}: {err}",
                hash_path.display()
            ))
        })?;
        Ok(Some(hash_path))
    }
}

fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| {
            PartinfoError::Filesystem(format!(
                "Failed to create log directory {}: {err}",
                parent.display()
            ))
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| {
            PartinfoError::Filesystem(format!(
                "Failed to open log file {}: {err}",
                path.display()
            ))
        })
}

fn format_entry(at: DateTime<Utc>, level: LogLevel, code: &str, message: &str) -> String {
    format!(
        "{} [{level}] [{code}] {message}",
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

fn digest_path(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".hash");
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn entries_follow_stamp_level_code_layout() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        assert_eq!(
            format_entry(at, LogLevel::Warn, "DECODE", "invalid field `doc_count`"),
            "2026-10-19T08:30:00Z [WARN] [DECODE] invalid field `doc_count`"
        );
    }

    #[test]
    fn file_sink_appends_and_finalize_writes_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.log");

        let logger = Logger::new(Some(path.clone()), false).unwrap();
        logger.info("INIT", "first");
        logger.debug("FETCH", "second");
        let hash_path = logger.finalize().unwrap().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[INFO] [INIT] first"));
        assert!(lines[1].ends_with("[DEBUG] [FETCH] second"));

        let expected = format!("{:x}  session.log\n", Sha256::digest(contents.as_bytes()));
        assert_eq!(std::fs::read_to_string(hash_path).unwrap(), expected);
    }

    #[test]
    fn finalize_without_file_is_a_no_op() {
        let logger = Logger::new(None, false).unwrap();
        logger.debug("INIT", "stderr only when verbose");
        assert!(logger.finalize().unwrap().is_none());
    }
}
