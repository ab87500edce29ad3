//! Report storage
//!
//! `ReportStore` holds submitted reports and applies the submission rules:
//! one report per reporter and week, edits only by the owner, items
//! replaced wholesale on update. `MemoryStore` keeps reports in process;
//! `JsonFileStore` adds the directory and loads/saves a JSON data file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::calendar::same_week;
use crate::draft::{DraftError, ReportDraft};
use crate::{Directory, ReportId, ReviewStatus, WeeklyReport};

/// Storage error
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A report for week {week_code} already exists for {reporter_id}")]
    DuplicateWeek {
        reporter_id: String,
        week_code: String,
    },

    #[error("Report not found: {0}")]
    NotFound(ReportId),

    #[error("Invalid report: {0}")]
    Draft(#[from] DraftError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data file error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage of weekly reports.
///
/// Implementors provide the four primitives; the submission rules are
/// shared default methods.
pub trait ReportStore {
    /// All stored reports, in insertion order
    fn reports(&self) -> &[WeeklyReport];

    fn insert(&mut self, report: WeeklyReport);

    fn report_mut(&mut self, id: ReportId) -> Option<&mut WeeklyReport>;

    fn remove(&mut self, id: ReportId) -> Option<WeeklyReport>;

    fn get(&self, id: ReportId) -> Option<&WeeklyReport> {
        self.reports().iter().find(|r| r.id == id)
    }

    fn next_id(&self) -> ReportId {
        self.reports().iter().map(|r| r.id).max().unwrap_or(0) + 1
    }

    /// Whether `reporter` already has a report for the week of `week_code`,
    /// ignoring report `excluding`. Spellings of the same week match.
    fn has_report_for_week(&self, reporter: &str, week_code: &str, excluding: Option<ReportId>) -> bool {
        self.reports().iter().any(|r| {
            r.reporter_id == reporter && same_week(&r.week_code, week_code) && Some(r.id) != excluding
        })
    }

    /// Store a new report from `draft`.
    fn submit(&mut self, draft: ReportDraft, now: NaiveDateTime) -> Result<ReportId, StoreError> {
        let validated = draft.validate()?;
        if self.has_report_for_week(&draft.reporter_id, &validated.week_code, None) {
            return Err(StoreError::DuplicateWeek {
                reporter_id: draft.reporter_id,
                week_code: validated.week_code,
            });
        }

        let id = self.next_id();
        let report = draft.into_report(id, now)?;
        info!(
            id,
            reporter = %report.reporter_id,
            week = %report.week_code,
            items = report.items.len(),
            "report submitted"
        );
        self.insert(report);
        Ok(id)
    }

    /// Replace report `id` of `reporter` with the draft's content.
    ///
    /// Review status, supervisor note and submission time are kept.
    fn update(&mut self, reporter: &str, id: ReportId, draft: ReportDraft) -> Result<(), StoreError> {
        let validated = draft.validate()?;
        if !self.get(id).is_some_and(|r| r.reporter_id == reporter) {
            return Err(StoreError::NotFound(id));
        }
        if self.has_report_for_week(reporter, &validated.week_code, Some(id)) {
            return Err(StoreError::DuplicateWeek {
                reporter_id: reporter.to_string(),
                week_code: validated.week_code,
            });
        }

        let items = draft.filled_rows().cloned().collect();
        let report = self.report_mut(id).ok_or(StoreError::NotFound(id))?;
        report.recipient_id = validated.recipient_id;
        report.week_code = validated.week_code;
        report.start = validated.range.start;
        report.end = validated.range.end;
        report.items = items;
        debug!(id, week = %report.week_code, "report updated");
        Ok(())
    }

    /// Delete report `id` together with its items
    fn delete(&mut self, id: ReportId) -> Result<WeeklyReport, StoreError> {
        let removed = self.remove(id).ok_or(StoreError::NotFound(id))?;
        info!(id, week = %removed.week_code, "report deleted");
        Ok(removed)
    }

    /// Record a supervisor decision; an empty note clears it.
    fn review(&mut self, id: ReportId, status: ReviewStatus, note: Option<String>) -> Result<(), StoreError> {
        let report = self.report_mut(id).ok_or(StoreError::NotFound(id))?;
        report.status = status;
        report.supervisor_note = note.filter(|n| !n.trim().is_empty());
        info!(id, status = %status, "report reviewed");
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Reports held in memory
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryStore {
    reports: Vec<WeeklyReport>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reports(reports: Vec<WeeklyReport>) -> Self {
        Self { reports }
    }
}

impl ReportStore for MemoryStore {
    fn reports(&self) -> &[WeeklyReport] {
        &self.reports
    }

    fn insert(&mut self, report: WeeklyReport) {
        self.reports.push(report);
    }

    fn report_mut(&mut self, id: ReportId) -> Option<&mut WeeklyReport> {
        self.reports.iter_mut().find(|r| r.id == id)
    }

    fn remove(&mut self, id: ReportId) -> Option<WeeklyReport> {
        let index = self.reports.iter().position(|r| r.id == id)?;
        Some(self.reports.remove(index))
    }
}

// ============================================================================
// JSON data file
// ============================================================================

/// On-disk layout of the data file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFile {
    #[serde(flatten)]
    pub directory: Directory,
    #[serde(default)]
    pub reports: MemoryStore,
}

/// Directory and reports backed by a JSON file
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: DataFile,
}

impl JsonFileStore {
    /// Load `path`; a missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str(&text)?
        } else {
            debug!(path = %path.display(), "data file missing, starting empty");
            DataFile::default()
        };
        Ok(Self { path, data })
    }

    pub fn with_data(path: impl Into<PathBuf>, data: DataFile) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn directory(&self) -> &Directory {
        &self.data.directory
    }

    pub fn directory_mut(&mut self) -> &mut Directory {
        &mut self.data.directory
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, text)?;
        debug!(path = %self.path.display(), reports = self.data.reports.reports().len(), "data file saved");
        Ok(())
    }
}

impl ReportStore for JsonFileStore {
    fn reports(&self) -> &[WeeklyReport] {
        self.data.reports.reports()
    }

    fn insert(&mut self, report: WeeklyReport) {
        self.data.reports.insert(report);
    }

    fn report_mut(&mut self, id: ReportId) -> Option<&mut WeeklyReport> {
        self.data.reports.report_mut(id)
    }

    fn remove(&mut self, id: ReportId) -> Option<WeeklyReport> {
        self.data.reports.remove(id)
    }
}

/// Reads a review status where `null`, `""` and any letter case are accepted
pub(crate) fn lenient_status<'de, D>(deserializer: D) -> Result<ReviewStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.as_deref()
        .unwrap_or("")
        .parse()
        .map_err(serde::de::Error::custom)
}
