//! Weekly Submission Status
//!
//! Answers "who has sent their report for this week?" across the company or
//! one department.
//!
//! # Core Concepts
//!
//! - **WeeklyStatus**: one row per employee plus sent/not-sent totals
//! - **Visibility**: show everyone, only missing, or only submitted
//!
//! Employees without a report still get a date range: the default range of
//! the selected week code. When the code does not parse the range is left
//! empty instead of failing the whole view.
//!
//! # Example
//!
//! ```rust
//! use weekrep_core::{Directory, Employee, Visibility, WeeklyStatus};
//!
//! let directory = Directory {
//!     departments: vec![],
//!     employees: vec![Employee::new("u1", "NV001", "Tran An")],
//! };
//! let status = WeeklyStatus::build(&directory, &[], Some("Y25W28"), None, Visibility::default());
//!
//! assert_eq!(status.not_sent, 1);
//! assert_eq!(status.rows[0].range.map(|r| r.start.to_string()), Some("2025-07-07".into()));
//! ```

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::calendar::{resolve_week_code, same_week, WeekRange};
use crate::{Directory, WeeklyReport};

// ============================================================================
// Core Types
// ============================================================================

/// Which rows to keep
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    pub only_missing: bool,
    pub only_submitted: bool,
}

impl Visibility {
    fn keeps(&self, submitted: bool) -> bool {
        match (self.only_missing, self.only_submitted) {
            (true, false) => !submitted,
            (false, true) => submitted,
            _ => true,
        }
    }
}

/// Submission state of one employee for the selected week
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRow {
    /// 1-based position before visibility filtering
    pub index: usize,
    pub week_code: String,
    /// Report range, or the week's default range
    pub range: Option<WeekRange>,
    pub department_code: String,
    pub department_name: String,
    pub employee_code: String,
    pub employee_name: String,
    /// Recipient's name, `-` when nothing was sent
    pub recipient_name: String,
    pub submitted_at: Option<NaiveDateTime>,
    pub submitted: bool,
}

/// Status rows for one week with totals
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyStatus {
    pub week_code: Option<String>,
    pub department: Option<String>,
    pub rows: Vec<StatusRow>,
    /// Rows shown
    pub total: usize,
    pub sent: usize,
    pub not_sent: usize,
}

impl WeeklyStatus {
    /// Build the status view for `week_code`.
    ///
    /// Without a week code the view is empty. Employees are ordered by staff
    /// code; if an employee has several reports for the week the first one
    /// stored counts.
    pub fn build(
        directory: &Directory,
        reports: &[WeeklyReport],
        week_code: Option<&str>,
        department: Option<&str>,
        visibility: Visibility,
    ) -> Self {
        let department = department.filter(|d| !d.is_empty());
        let Some(week_code) = week_code.filter(|w| !w.is_empty()) else {
            return Self {
                department: department.map(str::to_string),
                ..Self::default()
            };
        };

        let mut employees: Vec<_> = directory
            .employees
            .iter()
            .filter(|e| department.map_or(true, |d| e.department.as_deref() == Some(d)))
            .collect();
        employees.sort_by(|a, b| a.code.cmp(&b.code));

        let mut by_reporter: HashMap<&str, &WeeklyReport> = HashMap::new();
        for report in reports.iter().filter(|r| same_week(&r.week_code, week_code)) {
            by_reporter.entry(report.reporter_id.as_str()).or_insert(report);
        }

        let default_range = resolve_week_code(week_code);

        let rows: Vec<StatusRow> = employees
            .iter()
            .enumerate()
            .map(|(i, employee)| {
                let report = by_reporter.get(employee.id.as_str()).copied();
                let department_code = employee.department.clone().unwrap_or_default();
                let department_name = directory
                    .department(&department_code)
                    .map(|d| d.name.clone())
                    .unwrap_or_default();
                let recipient_name = report
                    .and_then(|r| directory.employee(&r.recipient_id))
                    .map_or_else(|| "-".to_string(), |e| e.full_name.clone());

                StatusRow {
                    index: i + 1,
                    week_code: week_code.to_string(),
                    range: report.map(WeeklyReport::range).or(default_range),
                    department_code,
                    department_name,
                    employee_code: employee.code.clone(),
                    employee_name: employee.full_name.clone(),
                    recipient_name,
                    submitted_at: report.map(|r| r.created_at),
                    submitted: report.is_some(),
                }
            })
            .filter(|row| visibility.keeps(row.submitted))
            .collect();

        let sent = rows.iter().filter(|r| r.submitted).count();
        Self {
            week_code: Some(week_code.to_string()),
            department: department.map(str::to_string),
            total: rows.len(),
            sent,
            not_sent: rows.len() - sent,
            rows,
        }
    }

    /// Share of shown employees who have sent, 0-100
    pub fn completion_percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.sent * 100) / self.total) as u8
    }
}

// ============================================================================
// Tests
// ============================================================================
