//! Report queries
//!
//! Three views over stored reports:
//! - **History**: a reporter's own reports with week/recipient/status filters
//! - **Summary**: one employee's reports for one week
//! - **Statistics**: company-wide, flattened to one row per report item,
//!   filtered and paged
//!
//! Week codes match when they name the same week and sort chronologically.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::calendar::{compare_week_codes, same_week};
use crate::{Directory, Employee, ReportItem, ReviewStatus, SelectOption, WeeklyReport};

/// Treats `None` and blank strings alike
fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ============================================================================
// History
// ============================================================================

/// Filters for a reporter's own report list
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub week: Option<String>,
    pub recipient: Option<String>,
    pub status: Option<ReviewStatus>,
}

/// A reporter's filtered reports and the options to refine them
#[derive(Clone, Debug)]
pub struct HistoryView<'a> {
    /// Matching reports, newest week first
    pub reports: Vec<&'a WeeklyReport>,
    /// Every week the reporter has reported, newest first
    pub week_options: Vec<String>,
    /// Every recipient the reporter has reported to
    pub recipient_options: Vec<SelectOption>,
}

impl<'a> HistoryView<'a> {
    pub fn build(
        reports: &'a [WeeklyReport],
        directory: &Directory,
        reporter: &str,
        filter: &HistoryFilter,
    ) -> Self {
        let own: Vec<&WeeklyReport> = reports.iter().filter(|r| r.reporter_id == reporter).collect();

        let mut matching: Vec<&WeeklyReport> = own
            .iter()
            .copied()
            .filter(|r| given(&filter.week).map_or(true, |w| same_week(&r.week_code, w)))
            .filter(|r| given(&filter.recipient).map_or(true, |id| r.recipient_id == id))
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .collect();
        matching.sort_by(|a, b| compare_week_codes(&b.week_code, &a.week_code));

        let mut week_options: Vec<String> = own.iter().map(|r| r.week_code.clone()).collect();
        week_options.sort_by(|a, b| compare_week_codes(b, a));
        week_options.dedup_by(|a, b| same_week(a, b));

        let mut seen = HashSet::new();
        let recipient_options = own
            .iter()
            .filter(|r| seen.insert(r.recipient_id.as_str()))
            .map(|r| {
                let label = directory
                    .employee(&r.recipient_id)
                    .map_or_else(|| r.recipient_id.clone(), |e| e.full_name.clone());
                SelectOption::new(&r.recipient_id, label)
            })
            .collect();

        Self {
            reports: matching,
            week_options,
            recipient_options,
        }
    }
}

// ============================================================================
// Summary
// ============================================================================

/// One employee (by staff code) in one week
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryFilter {
    pub week: Option<String>,
    pub employee_code: Option<String>,
}

impl SummaryFilter {
    /// Reports for the on-screen summary: nothing until both week and
    /// employee are chosen. Ordered by week, then reporter name.
    pub fn select<'a>(&self, reports: &'a [WeeklyReport], directory: &Directory) -> Vec<&'a WeeklyReport> {
        if given(&self.week).is_none() || given(&self.employee_code).is_none() {
            return Vec::new();
        }
        self.select_for_export(reports, directory)
    }

    /// Reports for the summary export; each filter applies only when set.
    pub fn select_for_export<'a>(
        &self,
        reports: &'a [WeeklyReport],
        directory: &Directory,
    ) -> Vec<&'a WeeklyReport> {
        let week = given(&self.week);
        let code = given(&self.employee_code);
        let mut selected: Vec<&WeeklyReport> = reports
            .iter()
            .filter(|r| week.map_or(true, |w| same_week(&r.week_code, w)))
            .filter(|r| {
                code.map_or(true, |c| {
                    directory.employee(&r.reporter_id).is_some_and(|e| e.code == c)
                })
            })
            .collect();
        selected.sort_by(|a, b| {
            compare_week_codes(&a.week_code, &b.week_code).then_with(|| reporter_name(directory, a).cmp(reporter_name(directory, b)))
        });
        selected
    }
}

fn reporter_name<'d>(directory: &'d Directory, report: &WeeklyReport) -> &'d str {
    directory
        .employee(&report.reporter_id)
        .map_or("", |e| e.full_name.as_str())
}

// ============================================================================
// Statistics
// ============================================================================

/// Company-wide statistics filters
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsFilter {
    pub week: Option<String>,
    /// Reporter's department code
    pub department: Option<String>,
    /// Substring of the reporter's staff code or full name
    pub employee: Option<String>,
    /// Exact item progress value
    pub progress: Option<String>,
}

impl StatsFilter {
    fn matches_reporter(&self, reporter: Option<&Employee>) -> bool {
        if let Some(department) = given(&self.department) {
            if !reporter.is_some_and(|e| e.department.as_deref() == Some(department)) {
                return false;
            }
        }
        if let Some(needle) = given(&self.employee) {
            if !reporter.is_some_and(|e| e.code.contains(needle) || e.full_name.contains(needle)) {
                return false;
            }
        }
        true
    }

    /// Whether `report` passes every report-level filter
    pub fn matches(&self, report: &WeeklyReport, directory: &Directory) -> bool {
        given(&self.week).map_or(true, |w| same_week(&report.week_code, w))
            && self.matches_reporter(directory.employee(&report.reporter_id))
            && given(&self.progress).map_or(true, |p| report.items.iter().any(|i| i.progress == p))
    }

    fn matches_item(&self, item: &ReportItem) -> bool {
        given(&self.progress).map_or(true, |p| item.progress == p)
    }

    /// One row per matching item, newest week first, then paged.
    pub fn page<'a>(&self, reports: &'a [WeeklyReport], directory: &Directory, page: Page) -> StatsPage<'a> {
        let mut rows: Vec<StatsRow<'a>> = reports
            .iter()
            .filter(|r| self.matches(r, directory))
            .flat_map(|report| {
                report
                    .items
                    .iter()
                    .filter(move |item| self.matches_item(item))
                    .map(move |item| StatsRow { report, item })
            })
            .collect();

        let total_count = rows.len();
        let page = page.normalized();
        let total_pages = total_count.div_ceil(page.size);

        rows.sort_by(|a, b| compare_week_codes(&b.report.week_code, &a.report.week_code));
        let rows = rows
            .into_iter()
            .skip((page.number - 1).saturating_mul(page.size))
            .take(page.size)
            .collect();

        StatsPage {
            rows,
            total_count,
            total_pages,
            page,
        }
    }

    /// Reports for the statistics export, oldest week first.
    ///
    /// The export lists every item of a matching report; the progress filter
    /// only decides which reports match.
    pub fn select_for_export<'a>(
        &self,
        reports: &'a [WeeklyReport],
        directory: &Directory,
    ) -> Vec<&'a WeeklyReport> {
        let mut selected: Vec<&WeeklyReport> = reports.iter().filter(|r| self.matches(r, directory)).collect();
        selected.sort_by(|a, b| compare_week_codes(&a.week_code, &b.week_code));
        selected
    }
}

/// 1-based page request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self { number: 1, size: 100 }
    }
}

impl Page {
    pub fn new(number: usize, size: usize) -> Self {
        Self { number, size }
    }

    fn normalized(self) -> Self {
        Self {
            number: self.number.max(1),
            size: self.size.max(1),
        }
    }
}

/// One report item with its report
#[derive(Clone, Copy, Debug)]
pub struct StatsRow<'a> {
    pub report: &'a WeeklyReport,
    pub item: &'a ReportItem,
}

/// A page of statistics rows
#[derive(Clone, Debug)]
pub struct StatsPage<'a> {
    pub rows: Vec<StatsRow<'a>>,
    /// Matching rows across all pages
    pub total_count: usize,
    pub total_pages: usize,
    pub page: Page,
}

impl<'a> StatsPage<'a> {
    /// Rows regrouped under their report, in page order
    pub fn grouped(&self) -> Vec<(&'a WeeklyReport, Vec<&'a ReportItem>)> {
        let mut groups: Vec<(&'a WeeklyReport, Vec<&'a ReportItem>)> = Vec::new();
        for row in &self.rows {
            match groups.iter_mut().find(|(report, _)| report.id == row.report.id) {
                Some((_, items)) => items.push(row.item),
                None => groups.push((row.report, vec![row.item])),
            }
        }
        groups
    }
}
