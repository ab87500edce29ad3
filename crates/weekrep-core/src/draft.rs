//! Report drafts
//!
//! A draft is the editable form behind report submission: the chosen
//! recipient, the week code with its previewed range, and a list of item
//! rows that can grow and shrink before the report is stored.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::{parse_week_code, WeekRange};
use crate::{EmployeeId, ReportId, ReportItem, ReviewStatus, WeeklyReport};

/// Why a draft cannot become a report
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("No recipient selected")]
    MissingRecipient,

    #[error("No week selected")]
    MissingWeek,

    #[error("No date range for week {0}")]
    MissingRange(String),
}

/// Editable weekly report form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub reporter_id: EmployeeId,
    #[serde(default)]
    pub recipient_id: Option<EmployeeId>,
    #[serde(default)]
    pub week_code: String,
    #[serde(default)]
    pub range: Option<WeekRange>,
    #[serde(default = "one_blank_row")]
    pub rows: Vec<ReportItem>,
}

/// A draft that passed validation
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Validated {
    pub(crate) recipient_id: EmployeeId,
    pub(crate) week_code: String,
    pub(crate) range: WeekRange,
}

fn one_blank_row() -> Vec<ReportItem> {
    vec![ReportItem::default()]
}

impl ReportDraft {
    /// Empty draft with a single blank row
    pub fn new(reporter_id: impl Into<String>) -> Self {
        Self {
            reporter_id: reporter_id.into(),
            recipient_id: None,
            week_code: String::new(),
            range: None,
            rows: one_blank_row(),
        }
    }

    /// Draft pre-filled from a stored report, for editing
    pub fn from_report(report: &WeeklyReport) -> Self {
        let mut rows = report.items.clone();
        if rows.is_empty() {
            rows = one_blank_row();
        }
        Self {
            reporter_id: report.reporter_id.clone(),
            recipient_id: Some(report.recipient_id.clone()),
            week_code: report.week_code.clone(),
            range: Some(report.range()),
            rows,
        }
    }

    /// Select a week and preview its range.
    ///
    /// A parseable code is rewritten to its canonical form (`Y25W7` becomes
    /// `Y25W07`). An unparseable code is kept as typed; the previous range
    /// stays.
    pub fn select_week(&mut self, code: &str) {
        match parse_week_code(code) {
            Ok(week) => {
                self.week_code = week.canonical();
                if let Some(range) = week.range() {
                    self.range = Some(range);
                }
            }
            Err(_) => self.week_code = code.to_string(),
        }
    }

    pub fn add_row(&mut self) {
        self.rows.push(ReportItem::default());
    }

    /// Remove row `index`; out-of-range indices are ignored and the draft
    /// always keeps at least one row.
    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
        if self.rows.is_empty() {
            self.rows = one_blank_row();
        }
    }

    /// Rows that will be stored
    pub fn filled_rows(&self) -> impl Iterator<Item = &ReportItem> {
        self.rows.iter().filter(|row| !row.is_blank())
    }

    /// Recipient, canonical week code and range to store.
    ///
    /// The range always comes from the week code; the preview in `range`
    /// is ignored.
    pub(crate) fn validate(&self) -> Result<Validated, DraftError> {
        let recipient = self
            .recipient_id
            .as_ref()
            .filter(|r| !r.trim().is_empty())
            .ok_or(DraftError::MissingRecipient)?;
        if self.week_code.trim().is_empty() {
            return Err(DraftError::MissingWeek);
        }
        let missing_range = || DraftError::MissingRange(self.week_code.clone());
        let week = parse_week_code(&self.week_code).map_err(|_| missing_range())?;
        let range = week.range().ok_or_else(missing_range)?;
        Ok(Validated {
            recipient_id: recipient.clone(),
            week_code: week.canonical(),
            range,
        })
    }

    /// Build the report to store; blank rows are dropped.
    pub fn into_report(self, id: ReportId, created_at: NaiveDateTime) -> Result<WeeklyReport, DraftError> {
        let Validated {
            recipient_id,
            week_code,
            range,
        } = self.validate()?;
        let items = self.rows.into_iter().filter(|row| !row.is_blank()).collect();
        Ok(WeeklyReport {
            id,
            reporter_id: self.reporter_id,
            recipient_id,
            week_code,
            start: range.start,
            end: range.end,
            created_at,
            status: ReviewStatus::Pending,
            supervisor_note: None,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 11)
            .unwrap()
            .and_hms_opt(16, 30, 0)
            .unwrap()
    }

    fn row(area: &str, content: &str) -> ReportItem {
        ReportItem {
            area: area.into(),
            content: content.into(),
            ..ReportItem::default()
        }
    }

    #[test]
    fn new_draft_has_one_blank_row() {
        let draft = ReportDraft::new("u1");
        assert_eq!(draft.rows, vec![ReportItem::default()]);
        assert_eq!(draft.filled_rows().count(), 0);
    }

    #[test]
    fn select_week_previews_range() {
        let mut draft = ReportDraft::new("u1");
        draft.select_week("Y25W01");
        let range = draft.range.unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 12, 30).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
    }

    #[test]
    fn select_malformed_week_keeps_previous_range() {
        let mut draft = ReportDraft::new("u1");
        draft.select_week("Y25W28");
        let before = draft.range;
        draft.select_week("next week");
        assert_eq!(draft.week_code, "next week");
        assert_eq!(draft.range, before);
    }

    #[test]
    fn select_week_canonicalizes_spelling() {
        let mut draft = ReportDraft::new("u1");
        draft.select_week("Y25W7");
        assert_eq!(draft.week_code, "Y25W07");
        draft.select_week("report for Y2025W08 please");
        assert_eq!(draft.week_code, "Y25W08");
        assert_eq!(draft.range.map(|r| r.start), NaiveDate::from_ymd_opt(2025, 2, 17));
    }

    #[test]
    fn stored_range_follows_week_code_not_preview() {
        let mut draft = ReportDraft::new("u1");
        draft.recipient_id = Some("u2".into());
        draft.week_code = "Y25W7".into();
        draft.range = WeekRange::starting(NaiveDate::from_ymd_opt(2030, 1, 7).unwrap());
        draft.rows = vec![row("Ops", "Audit")];

        let report = draft.into_report(1, now()).unwrap();
        assert_eq!(report.week_code, "Y25W07");
        assert_eq!(report.start, NaiveDate::from_ymd_opt(2025, 2, 10).unwrap());
        assert_eq!(report.end, NaiveDate::from_ymd_opt(2025, 2, 16).unwrap());
    }

    #[test]
    fn preview_range_does_not_rescue_bad_code() {
        let mut draft = ReportDraft::new("u1");
        draft.recipient_id = Some("u2".into());
        draft.select_week("Y25W28");
        draft.select_week("next week");
        assert!(draft.range.is_some());
        assert_eq!(
            draft.into_report(1, now()),
            Err(DraftError::MissingRange("next week".into()))
        );
    }

    #[test]
    fn add_and_remove_rows() {
        let mut draft = ReportDraft::new("u1");
        draft.add_row();
        draft.add_row();
        assert_eq!(draft.rows.len(), 3);

        draft.rows[1].content = "keep".into();
        draft.remove_row(0);
        assert_eq!(draft.rows.len(), 2);
        assert_eq!(draft.rows[0].content, "keep");

        draft.remove_row(42);
        assert_eq!(draft.rows.len(), 2);
    }

    #[test]
    fn removing_last_row_leaves_blank_row() {
        let mut draft = ReportDraft::new("u1");
        draft.rows[0].content = "gone".into();
        draft.remove_row(0);
        assert_eq!(draft.rows, vec![ReportItem::default()]);
    }

    #[test]
    fn into_report_drops_blank_rows() {
        let mut draft = ReportDraft::new("u1");
        draft.recipient_id = Some("u2".into());
        draft.select_week("Y25W28");
        draft.rows = vec![row("Sales", "Call clients"), row("", ""), row("", "Prepare deck")];

        let report = draft.into_report(7, now()).unwrap();
        assert_eq!(report.id, 7);
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.status, ReviewStatus::Pending);
        assert_eq!(report.start, NaiveDate::from_ymd_opt(2025, 7, 7).unwrap());
        assert_eq!(report.end, NaiveDate::from_ymd_opt(2025, 7, 13).unwrap());
    }

    #[test]
    fn into_report_requires_recipient_and_week() {
        let draft = ReportDraft::new("u1");
        assert_eq!(draft.into_report(1, now()), Err(DraftError::MissingRecipient));

        let mut draft = ReportDraft::new("u1");
        draft.recipient_id = Some("u2".into());
        assert_eq!(draft.clone().into_report(1, now()), Err(DraftError::MissingWeek));

        draft.select_week("someday");
        assert_eq!(
            draft.into_report(1, now()),
            Err(DraftError::MissingRange("someday".into()))
        );
    }

    #[test]
    fn round_trip_through_report() {
        let mut draft = ReportDraft::new("u1");
        draft.recipient_id = Some("u2".into());
        draft.select_week("Y25W28");
        draft.rows = vec![row("Ops", "Inventory")];
        let report = draft.clone().into_report(3, now()).unwrap();
        assert_eq!(ReportDraft::from_report(&report), draft);
    }
}
