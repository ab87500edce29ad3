//! Excel report exporter
//!
//! Generates XLSX workbooks for weekly reports:
//! - Detail: one report with its info block and item table
//! - Summary: several reports stacked on one sheet
//! - Statistics: one flat row per report item, company-wide
//! - Status: who has sent their report for a week
//!
//! ## Example Output Structure
//!
//! ```text
//! Sheet: Weekly Report
//! |                  WEEKLY REPORT Y25W28                              |
//! | Reporter: | Tran An (NV001) |  | Recipient: | Le Binh (NV002)     |
//! | Week:     | Y25W28          |  | Period:    | 07/07/2025 - 13/07/2025 |
//! | Status:   | Pending         |
//!
//! | No. | Area  | Content          | Due date   | Target | Progress | ...
//! |-----|-------|------------------|------------|--------|----------| ...
//! | 1   | Sales | Quarterly review | 11/07/2025 | High   | Done     | ...
//! ```
//!
//! All sheets use `dd/mm/yyyy` dates and `HH:MM dd/mm/yyyy` timestamps.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Image, Workbook, Worksheet};
use tracing::{debug, warn};
use weekrep_core::calendar::format_date;
use weekrep_core::{Directory, WeeklyReport, WeeklyStatus};

use crate::{Export, RenderError};

/// Item table columns shared by detail and summary sheets
const ITEM_HEADERS: [&str; 11] = [
    "No.",
    "Area",
    "Content",
    "Due date",
    "Target",
    "Progress",
    "Result",
    "Support",
    "Unfinished reason",
    "Resolution",
    "Note",
];

const ITEM_WIDTHS: [f64; 11] = [5.0, 15.0, 45.0, 15.0, 25.0, 20.0, 25.0, 10.0, 25.0, 25.0, 25.0];

const STATS_HEADERS: [&str; 21] = [
    "No.",
    "Week",
    "From",
    "To",
    "Staff code",
    "Full name",
    "Department code",
    "Department",
    "Recipient",
    "Recipient department",
    "Area",
    "Content",
    "Due date",
    "Target",
    "Progress",
    "Support",
    "Result",
    "Unfinished reason",
    "Resolution",
    "Note",
    "Submitted at",
];

const STATUS_HEADERS: [&str; 10] = [
    "No.",
    "Week",
    "From",
    "To",
    "Department",
    "Staff code",
    "Employee",
    "Recipient",
    "Submitted at",
    "State",
];

/// Blank rows between stacked report blocks
const SUMMARY_BLOCK_GAP: u32 = 3;

const LOGO_WIDTH: u32 = 220;
const LOGO_HEIGHT: u32 = 40;

const TIMESTAMP_FORMAT: &str = "%H:%M %d/%m/%Y";

/// Excel exporter for weekly reports
#[derive(Clone, Debug, Default)]
pub struct ExcelExporter {
    /// Company name shown in the statistics title
    pub company: String,
    /// Logo placed at the top-left of every sheet, when the file exists
    pub logo: Option<PathBuf>,
}

/// Reusable cell formats
struct ExcelFormats {
    title: Format,
    block_title: Format,
    subtitle: Format,
    label: Format,
    value: Format,
    note: Format,
    header: Format,
    cell: Format,
    cell_center: Format,
    total_row: Format,
}

impl ExcelExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo = Some(path.into());
        self
    }

    // ========================================================================
    // Workbooks
    // ========================================================================

    /// One report: title, info block and item table.
    ///
    /// File name: `WeeklyReport_<week>_<staffcode>.xlsx`
    pub fn detail(&self, report: &WeeklyReport, directory: &Directory) -> Result<Export, RenderError> {
        let formats = self.create_formats();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet
            .set_name("Weekly Report")
            .map_err(|e| RenderError::Format(e.to_string()))?;
        set_item_widths(sheet);

        let row = self.insert_logo(sheet)?;
        write_report_block(sheet, row, report, directory, &formats, &formats.title)?;

        let file_name = format!(
            "WeeklyReport_{}_{}.xlsx",
            file_component(&report.week_code),
            file_component(reporter_code(report, directory))
        );
        debug!(report = report.id, file = %file_name, "exported report detail");
        finish(workbook, file_name)
    }

    /// Several reports stacked on one sheet, three blank rows apart.
    ///
    /// `week` and `employee_code` are the filters the reports were selected
    /// with; they only shape the file name
    /// `WeeklyReportSummary_<week>_<staffcode>.xlsx` (`all` when unset).
    pub fn summary(
        &self,
        reports: &[&WeeklyReport],
        directory: &Directory,
        week: Option<&str>,
        employee_code: Option<&str>,
    ) -> Result<Export, RenderError> {
        if reports.is_empty() {
            return Err(RenderError::InvalidData("no reports to export".into()));
        }

        let formats = self.create_formats();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet
            .set_name("Summary")
            .map_err(|e| RenderError::Format(e.to_string()))?;
        set_item_widths(sheet);

        let mut row = self.insert_logo(sheet)?;
        for report in reports {
            row = write_report_block(sheet, row, report, directory, &formats, &formats.block_title)?;
            row += SUMMARY_BLOCK_GAP;
        }

        let file_name = format!(
            "WeeklyReportSummary_{}_{}.xlsx",
            file_component(week.filter(|w| !w.is_empty()).unwrap_or("all")),
            file_component(employee_code.filter(|c| !c.is_empty()).unwrap_or("all"))
        );
        debug!(reports = reports.len(), file = %file_name, "exported report summary");
        finish(workbook, file_name)
    }

    /// Flat statistics table, one row per report item.
    ///
    /// File name: `Statistics_<yyyymmddHHMMSS>.xlsx`
    pub fn statistics(
        &self,
        reports: &[&WeeklyReport],
        directory: &Directory,
        exported_at: NaiveDateTime,
    ) -> Result<Export, RenderError> {
        let formats = self.create_formats();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet
            .set_name("Statistics")
            .map_err(|e| RenderError::Format(e.to_string()))?;

        let last_col = (STATS_HEADERS.len() - 1) as u16;
        let mut row = self.insert_logo(sheet)?;

        let title = if self.company.trim().is_empty() {
            "WEEKLY REPORT STATISTICS".to_string()
        } else {
            format!("WEEKLY REPORT STATISTICS - {}", self.company.trim())
        };
        sheet
            .merge_range(row, 0, row, last_col, &title, &formats.title)
            .map_err(|e| RenderError::Format(e.to_string()))?;
        row += 1;
        let subtitle = format!("Exported at {}", exported_at.format(TIMESTAMP_FORMAT));
        sheet
            .merge_range(row, 0, row, last_col, &subtitle, &formats.subtitle)
            .map_err(|e| RenderError::Format(e.to_string()))?;
        row += 2;

        write_headers(sheet, row, &STATS_HEADERS, &formats.header)?;
        row += 1;

        let mut index = 1u32;
        for report in reports {
            let reporter = directory.employee(&report.reporter_id);
            let department = reporter.and_then(|e| directory.department_of(e));
            let recipient = directory.employee(&report.recipient_id);
            let recipient_department = recipient.and_then(|e| directory.department_of(e));

            for item in &report.items {
                let cells = [
                    report.week_code.clone(),
                    format_date(report.start),
                    format_date(report.end),
                    reporter.map(|e| e.code.clone()).unwrap_or_default(),
                    reporter.map(|e| e.full_name.clone()).unwrap_or_default(),
                    department.map(|d| d.code.clone()).unwrap_or_default(),
                    department.map(|d| d.name.clone()).unwrap_or_default(),
                    recipient.map(|e| e.full_name.clone()).unwrap_or_default(),
                    recipient_department.map(|d| d.name.clone()).unwrap_or_default(),
                    item.area.clone(),
                    item.content.clone(),
                    optional_date(item.due_date),
                    item.target.clone(),
                    item.progress.clone(),
                    item.support.clone(),
                    item.result.clone(),
                    item.unfinished_reason.clone(),
                    item.resolution.clone(),
                    item.note.clone(),
                    report.created_at.format(TIMESTAMP_FORMAT).to_string(),
                ];

                sheet
                    .write_with_format(row, 0, index, &formats.cell_center)
                    .map_err(|e| RenderError::Format(e.to_string()))?;
                for (col, value) in cells.iter().enumerate() {
                    sheet
                        .write_with_format(row, col as u16 + 1, value.as_str(), &formats.cell)
                        .map_err(|e| RenderError::Format(e.to_string()))?;
                }
                index += 1;
                row += 1;
            }
        }

        sheet.set_column_width(0, 6).ok();
        for col in 1..=last_col {
            sheet.set_column_width(col, 18).ok();
        }
        sheet.set_column_width(11, 45).ok();

        let file_name = format!("Statistics_{}.xlsx", exported_at.format("%Y%m%d%H%M%S"));
        debug!(rows = index - 1, file = %file_name, "exported statistics");
        finish(workbook, file_name)
    }

    /// Weekly submission status with totals.
    ///
    /// File name: `WeeklyStatus_<week>.xlsx`, or
    /// `WeeklyStatus_<week>_<department>.xlsx` when filtered.
    pub fn status(&self, status: &WeeklyStatus) -> Result<Export, RenderError> {
        let Some(week_code) = status.week_code.as_deref() else {
            return Err(RenderError::InvalidData("no week selected".into()));
        };

        let formats = self.create_formats();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet
            .set_name("Status")
            .map_err(|e| RenderError::Format(e.to_string()))?;

        let last_col = (STATUS_HEADERS.len() - 1) as u16;
        let mut row = self.insert_logo(sheet)?;
        sheet
            .merge_range(
                row,
                0,
                row,
                last_col,
                &format!("WEEKLY REPORT STATUS {week_code}"),
                &formats.title,
            )
            .map_err(|e| RenderError::Format(e.to_string()))?;
        row += 2;

        write_headers(sheet, row, &STATUS_HEADERS, &formats.header)?;
        row += 1;

        for entry in &status.rows {
            let cells = [
                entry.week_code.clone(),
                entry.range.map(|r| format_date(r.start)).unwrap_or_default(),
                entry.range.map(|r| format_date(r.end)).unwrap_or_default(),
                entry.department_name.clone(),
                entry.employee_code.clone(),
                entry.employee_name.clone(),
                entry.recipient_name.clone(),
                entry
                    .submitted_at
                    .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
                    .unwrap_or_default(),
                (if entry.submitted { "Sent" } else { "Not sent" }).to_string(),
            ];
            sheet
                .write_with_format(row, 0, entry.index as u32, &formats.cell_center)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            for (col, value) in cells.iter().enumerate() {
                sheet
                    .write_with_format(row, col as u16 + 1, value.as_str(), &formats.cell)
                    .map_err(|e| RenderError::Format(e.to_string()))?;
            }
            row += 1;
        }

        let totals = format!(
            "Total: {}    Sent: {}    Not sent: {}",
            status.total, status.sent, status.not_sent
        );
        sheet
            .merge_range(row, 0, row, last_col, &totals, &formats.total_row)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        let widths = [6, 10, 12, 12, 25, 12, 25, 25, 18, 10];
        for (col, width) in widths.iter().enumerate() {
            sheet.set_column_width(col as u16, *width).ok();
        }

        let file_name = match status.department.as_deref() {
            Some(department) => format!(
                "WeeklyStatus_{}_{}.xlsx",
                file_component(week_code),
                file_component(department)
            ),
            None => format!("WeeklyStatus_{}.xlsx", file_component(week_code)),
        };
        debug!(rows = status.rows.len(), file = %file_name, "exported weekly status");
        finish(workbook, file_name)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Create reusable formats
    fn create_formats(&self) -> ExcelFormats {
        let title = Format::new()
            .set_bold()
            .set_font_size(18)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        let block_title = Format::new()
            .set_bold()
            .set_font_size(16)
            .set_align(FormatAlign::Center);

        let subtitle = Format::new().set_italic().set_align(FormatAlign::Center);

        let label = Format::new()
            .set_bold()
            .set_font_size(12)
            .set_align(FormatAlign::VerticalCenter);

        let value = Format::new()
            .set_font_size(12)
            .set_align(FormatAlign::VerticalCenter);

        let note = Format::new()
            .set_font_size(12)
            .set_text_wrap()
            .set_align(FormatAlign::VerticalCenter);

        // LightSteelBlue
        let header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_background_color(0xB0C4DE)
            .set_border(FormatBorder::Thin);

        let cell = Format::new()
            .set_text_wrap()
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin);

        let cell_center = Format::new()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin);

        let total_row = Format::new()
            .set_bold()
            .set_background_color(0xE2EFDA)
            .set_border(FormatBorder::Thin);

        ExcelFormats {
            title,
            block_title,
            subtitle,
            label,
            value,
            note,
            header,
            cell,
            cell_center,
            total_row,
        }
    }

    /// Place the logo at A1 and return the first row below it.
    ///
    /// A configured logo that cannot be found is skipped.
    fn insert_logo(&self, sheet: &mut Worksheet) -> Result<u32, RenderError> {
        let Some(path) = self.logo.as_ref() else {
            return Ok(0);
        };
        if !path.is_file() {
            warn!(path = %path.display(), "logo not found, exporting without it");
            return Ok(0);
        }

        let image = Image::new(path)
            .map_err(|e| RenderError::Format(e.to_string()))?
            .set_scale_to_size(LOGO_WIDTH, LOGO_HEIGHT, true);
        sheet
            .insert_image(0, 0, &image)
            .map_err(|e| RenderError::Format(e.to_string()))?;
        sheet.set_row_height(0, 32).ok();
        Ok(2)
    }
}

/// Write title, info block and item table starting at `row`; returns the
/// row after the last item.
fn write_report_block(
    sheet: &mut Worksheet,
    mut row: u32,
    report: &WeeklyReport,
    directory: &Directory,
    formats: &ExcelFormats,
    title_format: &Format,
) -> Result<u32, RenderError> {
    let last_col = (ITEM_HEADERS.len() - 1) as u16;
    sheet
        .merge_range(
            row,
            0,
            row,
            last_col,
            &format!("WEEKLY REPORT {}", report.week_code),
            title_format,
        )
        .map_err(|e| RenderError::Format(e.to_string()))?;
    row += 2;

    let person = |id: &str| {
        directory
            .employee(id)
            .map_or_else(|| id.to_string(), |e| e.display_with_code())
    };

    write_pair(sheet, row, 0, "Reporter:", &person(&report.reporter_id), formats)?;
    write_pair(sheet, row, 3, "Recipient:", &person(&report.recipient_id), formats)?;
    row += 1;
    write_pair(sheet, row, 0, "Week:", &report.week_code, formats)?;
    write_pair(sheet, row, 3, "Period:", &report.range().display(" - "), formats)?;
    row += 1;
    write_pair(sheet, row, 0, "Status:", report.status.as_str(), formats)?;
    row += 1;

    if let Some(note) = report.supervisor_note.as_deref().filter(|n| !n.trim().is_empty()) {
        sheet
            .write_with_format(row, 0, "Supervisor note:", &formats.label)
            .map_err(|e| RenderError::Format(e.to_string()))?;
        sheet
            .merge_range(row, 1, row, 7, note, &formats.note)
            .map_err(|e| RenderError::Format(e.to_string()))?;
        row += 1;
    }
    row += 1;

    write_headers(sheet, row, &ITEM_HEADERS, &formats.header)?;
    row += 1;

    for (i, item) in report.items.iter().enumerate() {
        let due_date = optional_date(item.due_date);
        let cells = [
            item.area.as_str(),
            item.content.as_str(),
            due_date.as_str(),
            item.target.as_str(),
            item.progress.as_str(),
            item.result.as_str(),
            item.support.as_str(),
            item.unfinished_reason.as_str(),
            item.resolution.as_str(),
            item.note.as_str(),
        ];
        sheet
            .write_with_format(row, 0, i as u32 + 1, &formats.cell_center)
            .map_err(|e| RenderError::Format(e.to_string()))?;
        for (col, value) in cells.iter().enumerate() {
            sheet
                .write_with_format(row, col as u16 + 1, *value, &formats.cell)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }
        row += 1;
    }

    Ok(row)
}

fn write_pair(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    label: &str,
    value: &str,
    formats: &ExcelFormats,
) -> Result<(), RenderError> {
    sheet
        .write_with_format(row, col, label, &formats.label)
        .map_err(|e| RenderError::Format(e.to_string()))?;
    sheet
        .write_with_format(row, col + 1, value, &formats.value)
        .map_err(|e| RenderError::Format(e.to_string()))?;
    Ok(())
}

fn write_headers(sheet: &mut Worksheet, row: u32, headers: &[&str], format: &Format) -> Result<(), RenderError> {
    for (col, header) in headers.iter().enumerate() {
        sheet
            .write_with_format(row, col as u16, *header, format)
            .map_err(|e| RenderError::Format(e.to_string()))?;
    }
    sheet.set_row_height(row, 30).ok();
    Ok(())
}

fn set_item_widths(sheet: &mut Worksheet) {
    for (col, width) in ITEM_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width).ok();
    }
}

fn finish(mut workbook: Workbook, file_name: String) -> Result<Export, RenderError> {
    let bytes = workbook
        .save_to_buffer()
        .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))?;
    Ok(Export { file_name, bytes })
}

fn reporter_code<'a>(report: &'a WeeklyReport, directory: &'a Directory) -> &'a str {
    directory
        .employee(&report.reporter_id)
        .map_or(report.reporter_id.as_str(), |e| e.code.as_str())
}

fn optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_default()
}

/// Make a user-supplied value safe for a file name
fn file_component(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use weekrep_core::{Department, Employee, ReportItem, ReviewStatus, Visibility};

    fn directory() -> Directory {
        Directory {
            departments: vec![Department::new("SALES", "Sales").company("Acme Trading")],
            employees: vec![
                Employee::new("u1", "NV001", "Tran An").department("SALES"),
                Employee::new("u2", "NV002", "Le Binh").position("Manager").department("SALES"),
            ],
        }
    }

    fn report(id: u64, week: &str) -> WeeklyReport {
        let start = NaiveDate::from_ymd_opt(2025, 7, 7).unwrap();
        WeeklyReport {
            id,
            reporter_id: "u1".into(),
            recipient_id: "u2".into(),
            week_code: week.into(),
            start,
            end: NaiveDate::from_ymd_opt(2025, 7, 13).unwrap(),
            created_at: start.and_hms_opt(17, 30, 0).unwrap(),
            status: ReviewStatus::Approved,
            supervisor_note: Some("Good progress".into()),
            items: vec![
                ReportItem {
                    area: "Sales".into(),
                    content: "Quarterly review".into(),
                    due_date: NaiveDate::from_ymd_opt(2025, 7, 11),
                    progress: "Done".into(),
                    ..ReportItem::default()
                },
                ReportItem {
                    area: "Ops".into(),
                    content: "Inventory count".into(),
                    ..ReportItem::default()
                },
            ],
        }
    }

    fn exported_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 11)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap()
    }

    #[test]
    fn detail_workbook() {
        let export = ExcelExporter::new().detail(&report(1, "Y25W28"), &directory()).unwrap();
        assert_eq!(export.file_name, "WeeklyReport_Y25W28_NV001.xlsx");
        assert!(export.bytes.starts_with(b"PK"));
    }

    #[test]
    fn detail_falls_back_to_reporter_id() {
        let mut report = report(1, "Y25W28");
        report.reporter_id = "ghost".into();
        let export = ExcelExporter::new().detail(&report, &directory()).unwrap();
        assert_eq!(export.file_name, "WeeklyReport_Y25W28_ghost.xlsx");
    }

    #[test]
    fn summary_workbook() {
        let first = report(1, "Y25W27");
        let second = report(2, "Y25W28");
        let export = ExcelExporter::new()
            .summary(&[&first, &second], &directory(), Some("Y25W28"), Some("NV001"))
            .unwrap();
        assert_eq!(export.file_name, "WeeklyReportSummary_Y25W28_NV001.xlsx");
        assert!(export.bytes.starts_with(b"PK"));
    }

    #[test]
    fn summary_without_filters_names_all() {
        let only = report(1, "Y25W28");
        let export = ExcelExporter::new()
            .summary(&[&only], &directory(), None, Some(""))
            .unwrap();
        assert_eq!(export.file_name, "WeeklyReportSummary_all_all.xlsx");
    }

    #[test]
    fn summary_rejects_empty_selection() {
        let err = ExcelExporter::new().summary(&[], &directory(), None, None).unwrap_err();
        assert!(matches!(err, RenderError::InvalidData(_)));
    }

    #[test]
    fn statistics_workbook() {
        let first = report(1, "Y25W28");
        let export = ExcelExporter::new()
            .company("Acme Trading")
            .statistics(&[&first], &directory(), exported_at())
            .unwrap();
        assert_eq!(export.file_name, "Statistics_20250711093005.xlsx");
        assert!(export.bytes.starts_with(b"PK"));
    }

    #[test]
    fn statistics_with_no_reports_still_exports() {
        let export = ExcelExporter::new()
            .statistics(&[], &directory(), exported_at())
            .unwrap();
        assert!(export.bytes.starts_with(b"PK"));
    }

    #[test]
    fn status_workbook() {
        let reports = vec![report(1, "Y25W28")];
        let status = WeeklyStatus::build(&directory(), &reports, Some("Y25W28"), Some("SALES"), Visibility::default());
        let export = ExcelExporter::new().status(&status).unwrap();
        assert_eq!(export.file_name, "WeeklyStatus_Y25W28_SALES.xlsx");
        assert!(export.bytes.starts_with(b"PK"));
    }

    #[test]
    fn status_requires_week() {
        let status = WeeklyStatus::build(&directory(), &[], None, None, Visibility::default());
        let err = ExcelExporter::new().status(&status).unwrap_err();
        assert!(matches!(err, RenderError::InvalidData(_)));
    }

    #[test]
    fn missing_logo_is_skipped() {
        let export = ExcelExporter::new()
            .logo("/nonexistent/logo.png")
            .detail(&report(1, "Y25W28"), &directory())
            .unwrap();
        assert!(export.bytes.starts_with(b"PK"));
    }

    #[test]
    fn file_components_are_sanitized() {
        assert_eq!(file_component("Y25W28"), "Y25W28");
        assert_eq!(file_component(" a/b c "), "a_b_c");
        assert_eq!(file_component("NV-01_x"), "NV-01_x");
    }
}
