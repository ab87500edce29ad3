//! # weekrep-core
//!
//! Core domain model for weekrep weekly status reports.
//!
//! This crate provides:
//! - The week-code calendar (`Y25W07` ↔ Monday–Sunday ranges)
//! - Domain types: `Employee`, `Department`, `WeeklyReport`, `ReportItem`
//! - Report drafts with add/remove row editing
//! - A report store enforcing one report per reporter and week
//! - Review, summary and statistics queries, and weekly compliance status
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use weekrep_core::{ReportDraft, MemoryStore, ReportStore};
//!
//! let mut draft = ReportDraft::new("u-an");
//! draft.recipient_id = Some("u-binh".into());
//! draft.select_week("Y25W28");
//! draft.rows[0].area = "Sales".into();
//! draft.rows[0].content = "Quarterly review".into();
//!
//! let mut store = MemoryStore::new();
//! let now = NaiveDate::from_ymd_opt(2025, 7, 11).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let id = store.submit(draft, now).unwrap();
//! assert_eq!(store.get(id).unwrap().week_code, "Y25W28");
//! ```

pub mod calendar;
pub mod draft;
pub mod query;
pub mod status;
pub mod store;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub use calendar::{
    compare_week_codes, enumerate_week_codes, format_week_code, parse_week_code, same_week,
    week_end_date, week_range, week_start_date, weeks_in_year, ParseError, WeekCode, WeekOption,
    WeekRange,
};
pub use draft::{DraftError, ReportDraft};
pub use query::{HistoryFilter, HistoryView, Page, StatsFilter, StatsPage, StatsRow, SummaryFilter};
pub use status::{StatusRow, Visibility, WeeklyStatus};
pub use store::{JsonFileStore, MemoryStore, ReportStore, StoreError};

// ============================================================================
// Type Aliases
// ============================================================================

/// Unique identifier for an employee account
pub type EmployeeId = String;

/// Department code
pub type DepartmentCode = String;

/// Unique identifier for a weekly report
pub type ReportId = u64;

// ============================================================================
// Organization
// ============================================================================

/// A department of a company
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub code: DepartmentCode,
    pub name: String,
    /// Owning company name
    #[serde(default)]
    pub company: String,
}

impl Department {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            company: String::new(),
        }
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    /// Label used in department pickers: `Name (Company)`
    pub fn option_label(&self) -> String {
        format!("{} ({})", self.name, self.company)
    }
}

/// An employee who reports and/or receives reports
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    /// Staff number shown in exports
    pub code: String,
    pub full_name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub department: Option<DepartmentCode>,
}

impl Employee {
    pub fn new(id: impl Into<String>, code: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            full_name: full_name.into(),
            position: String::new(),
            department: None,
        }
    }

    pub fn position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }

    pub fn department(mut self, code: impl Into<String>) -> Self {
        self.department = Some(code.into());
        self
    }

    /// `Full Name (CODE)`
    pub fn display_with_code(&self) -> String {
        format!("{} ({})", self.full_name, self.code)
    }
}

/// A value/label pair for pickers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Departments and employees known to the system
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub employees: Vec<Employee>,
}

impl Directory {
    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn employee_by_code(&self, code: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.code == code)
    }

    pub fn department(&self, code: &str) -> Option<&Department> {
        self.departments.iter().find(|d| d.code == code)
    }

    /// Department of an employee, if both exist
    pub fn department_of(&self, employee: &Employee) -> Option<&Department> {
        employee.department.as_deref().and_then(|code| self.department(code))
    }

    /// Department picker entries, in directory order
    pub fn department_options(&self) -> Vec<SelectOption> {
        self.departments
            .iter()
            .map(|d| SelectOption::new(&d.code, d.option_label()))
            .collect()
    }

    /// Possible recipients for `current_user`: members of `department`
    /// other than the user, labelled `Name – Position`.
    pub fn recipient_options(&self, department: &str, current_user: &str) -> Vec<SelectOption> {
        if department.is_empty() {
            return Vec::new();
        }
        self.employees
            .iter()
            .filter(|e| e.department.as_deref() == Some(department) && e.id != current_user)
            .map(|e| SelectOption::new(&e.id, format!("{} – {}", e.full_name, e.position)))
            .collect()
    }
}

// ============================================================================
// Reports
// ============================================================================

/// Supervisor review outcome
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Not reviewed yet
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "Pending",
            ReviewStatus::Approved => "Approved",
            ReviewStatus::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "pending" => Ok(ReviewStatus::Pending),
            "approved" => Ok(ReviewStatus::Approved),
            "rejected" => Ok(ReviewStatus::Rejected),
            other => Err(format!("unknown review status: {other}")),
        }
    }
}

/// One task line of a weekly report
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportItem {
    /// Work area / main responsibility
    pub area: String,
    pub content: String,
    pub due_date: Option<NaiveDate>,
    /// Target or priority
    pub target: String,
    pub progress: String,
    pub result: String,
    /// Supporting colleague(s)
    pub support: String,
    pub unfinished_reason: String,
    pub resolution: String,
    pub note: String,
}

impl ReportItem {
    /// Lines without content and without an area are not stored
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty() && self.area.trim().is_empty()
    }
}

/// A submitted weekly report
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub id: ReportId,
    pub reporter_id: EmployeeId,
    pub recipient_id: EmployeeId,
    /// Week code as selected, stored verbatim
    pub week_code: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub created_at: NaiveDateTime,
    #[serde(default, deserialize_with = "store::lenient_status")]
    pub status: ReviewStatus,
    #[serde(default)]
    pub supervisor_note: Option<String>,
    #[serde(default)]
    pub items: Vec<ReportItem>,
}

impl WeeklyReport {
    pub fn range(&self) -> WeekRange {
        WeekRange {
            start: self.start,
            end: self.end,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
