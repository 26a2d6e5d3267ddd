//! Windowed reads, search and confirmed truncation over the server logs.

use serde::Serialize;
use std::io;
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::{LogKind, LogListing, LogSearchHit, LogSearchResult, LogWindow};
use crate::ports::CoreError;

use super::ArtifactInspector;

pub const DEFAULT_WINDOW: usize = 100;
pub const MAX_WINDOW: usize = 1000;
pub const DEFAULT_SEARCH_LIMIT: usize = 50;
pub const MAX_SEARCH_LIMIT: usize = 200;

/// Result of a successful clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogCleared {
    pub log_type: String,
    pub filename: String,
}

pub struct LogAccess {
    inspector: Arc<ArtifactInspector>,
}

impl LogAccess {
    pub const fn new(inspector: Arc<ArtifactInspector>) -> Self {
        Self { inspector }
    }

    /// Read a window of lines from one logical log.
    ///
    /// `offset == 0` returns the last `window` lines; any other offset pages
    /// forward from that 0-based line. A missing file is reported with
    /// `exists = false`, not as an error.
    pub async fn read(
        &self,
        log_type: &str,
        window: Option<usize>,
        offset: Option<usize>,
    ) -> Result<LogWindow, CoreError> {
        let kind = parse_kind(log_type)?;
        let window = window.unwrap_or(DEFAULT_WINDOW).clamp(1, MAX_WINDOW);
        let offset = offset.unwrap_or(0);
        let filename = kind.filename().to_string();

        let Some(lines) = self.read_lines(kind).await? else {
            return Ok(LogWindow {
                log_type: log_type.to_string(),
                filename,
                exists: false,
                lines: Vec::new(),
                total_lines: 0,
                start_line: 0,
                end_line: 0,
            });
        };

        let total_lines = lines.len();
        let start_line = if offset == 0 {
            total_lines.saturating_sub(window)
        } else {
            offset
        };
        let selected: Vec<String> = lines
            .into_iter()
            .skip(start_line)
            .take(window)
            .collect();

        Ok(LogWindow {
            log_type: log_type.to_string(),
            filename,
            exists: true,
            end_line: start_line + selected.len(),
            lines: selected,
            total_lines,
            start_line,
        })
    }

    /// Case-insensitive substring search.
    ///
    /// Searches one logical log, or every logical log in a fixed order when
    /// `log` is `None`. Missing or unreadable files are skipped.
    pub async fn search(
        &self,
        query: &str,
        log: Option<&str>,
        limit: Option<usize>,
    ) -> Result<LogSearchResult, CoreError> {
        if query.is_empty() {
            return Err(CoreError::Validation(
                "Search query is required (use ?q=pattern)".to_string(),
            ));
        }
        let kinds = match log.filter(|l| !l.is_empty()) {
            Some(name) => vec![
                LogKind::from_filename(name).map_or_else(|| parse_kind(name), Ok)?,
            ],
            None => LogKind::ALL.to_vec(),
        };
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT);
        let needle = query.to_lowercase();

        let mut results = Vec::new();
        'logs: for kind in kinds {
            let lines = match self.read_lines(kind).await {
                Ok(Some(lines)) => lines,
                Ok(None) => continue,
                Err(e) => {
                    debug!(log = %kind, error = %e, "Skipping unreadable log");
                    continue;
                }
            };
            for (idx, line) in lines.iter().enumerate() {
                if line.to_lowercase().contains(&needle) {
                    results.push(LogSearchHit {
                        log: kind.as_str().to_string(),
                        filename: kind.filename().to_string(),
                        line_number: idx + 1,
                        content: line.trim().to_string(),
                    });
                    if results.len() >= limit {
                        break 'logs;
                    }
                }
            }
        }

        Ok(LogSearchResult {
            query: query.to_string(),
            count: results.len(),
            limited: results.len() >= limit,
            results,
        })
    }

    /// Truncate a clearable log, creating it empty if absent.
    ///
    /// `confirm` must be exactly `"true"`.
    pub async fn clear(&self, log_type: &str, confirm: Option<&str>) -> Result<LogCleared, CoreError> {
        let kind = parse_kind(log_type)
            .ok()
            .filter(|k| k.is_clearable())
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Log type '{log_type}' cannot be cleared (clearable: {})",
                    LogKind::CLEARABLE_NAMES.join(", ")
                ))
            })?;
        if confirm != Some("true") {
            return Err(CoreError::Validation(
                "Add ?confirm=true to URL to confirm".to_string(),
            ));
        }

        let path = self.inspector.directories().log_file(kind);
        tokio::fs::File::create(&path)
            .await
            .map_err(|e| CoreError::storage("Failed to clear log", &e))?;

        info!(log = %kind, path = %path.display(), "Log cleared");
        Ok(LogCleared {
            log_type: log_type.to_string(),
            filename: kind.filename().to_string(),
        })
    }

    pub fn list(&self) -> LogListing {
        self.inspector.list_logs()
    }

    /// All lines of a log (lossy UTF-8), `None` if the file does not exist.
    async fn read_lines(&self, kind: LogKind) -> Result<Option<Vec<String>>, CoreError> {
        let path = self.inspector.directories().log_file(kind);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(
                String::from_utf8_lossy(&bytes)
                    .lines()
                    .map(str::to_string)
                    .collect(),
            )),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::storage("Failed to read log", &e)),
        }
    }
}

fn parse_kind(name: &str) -> Result<LogKind, CoreError> {
    name.parse::<LogKind>().map_err(|e| {
        CoreError::Validation(format!(
            "{e} (available: {})",
            LogKind::ACCEPTED_NAMES.join(", ")
        ))
    })
}
