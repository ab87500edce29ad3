//! Plain-text tables for console output
//!
//! Columns are padded to the widest cell, counted in characters so that
//! accented names line up.

use weekrep_core::calendar::format_date;
use weekrep_core::{Directory, HistoryView, SelectOption, StatsPage, WeekOption, WeeklyReport, WeeklyStatus};

const TIMESTAMP_FORMAT: &str = "%H:%M %d/%m/%Y";

/// A header row plus data rows
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing cells render empty, extra cells are dropped.
    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells: Vec<String> = cells.into_iter().map(Into::into).collect();
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|col| {
                self.rows
                    .iter()
                    .map(|row| row[col].chars().count())
                    .chain(std::iter::once(self.headers[col].chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        push_line(&mut out, &self.headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, &rule, &widths);
        for row in &self.rows {
            push_line(&mut out, row, &widths);
        }
        out
    }
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

// ============================================================================
// Views
// ============================================================================

/// One line per week option
pub fn week_list(options: &[WeekOption]) -> String {
    let mut out = String::new();
    for option in options {
        out.push_str(&option.label);
        out.push('\n');
    }
    out
}

/// Picker entries as value/label rows
pub fn option_table(headers: [&str; 2], options: &[SelectOption]) -> TextTable {
    let mut table = TextTable::new(headers);
    for option in options {
        table.row([option.value.as_str(), option.label.as_str()]);
    }
    table
}

/// A reporter's own reports
pub fn history_table(view: &HistoryView<'_>, directory: &Directory) -> TextTable {
    let mut table = TextTable::new(["ID", "Week", "Period", "Recipient", "Items", "Status", "Submitted at"]);
    for report in &view.reports {
        table.row([
            report.id.to_string(),
            report.week_code.clone(),
            report.range().display(" - "),
            name_of(directory, &report.recipient_id),
            report.items.len().to_string(),
            report.status.to_string(),
            report.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ]);
    }
    table
}

/// Items of the selected reports, grouped by reporter
pub fn summary_table(reports: &[&WeeklyReport], directory: &Directory) -> TextTable {
    let mut table = TextTable::new(["Week", "Reporter", "Area", "Content", "Progress", "Result"]);
    for report in reports {
        let reporter = name_of(directory, &report.reporter_id);
        for item in &report.items {
            table.row([
                report.week_code.clone(),
                reporter.clone(),
                item.area.clone(),
                item.content.clone(),
                item.progress.clone(),
                item.result.clone(),
            ]);
        }
    }
    table
}

/// One page of statistics rows
pub fn stats_table(page: &StatsPage<'_>, directory: &Directory) -> TextTable {
    let mut table = TextTable::new([
        "Week", "Staff code", "Name", "Department", "Area", "Content", "Due date", "Progress",
    ]);
    for row in &page.rows {
        let reporter = directory.employee(&row.report.reporter_id);
        table.row([
            row.report.week_code.clone(),
            reporter.map(|e| e.code.clone()).unwrap_or_default(),
            reporter.map(|e| e.full_name.clone()).unwrap_or_default(),
            reporter
                .and_then(|e| directory.department_of(e))
                .map(|d| d.name.clone())
                .unwrap_or_default(),
            row.item.area.clone(),
            row.item.content.clone(),
            row.item.due_date.map(format_date).unwrap_or_default(),
            row.item.progress.clone(),
        ]);
    }
    table
}

/// Submission status rows
pub fn status_table(status: &WeeklyStatus) -> TextTable {
    let mut table = TextTable::new([
        "No.", "Staff code", "Employee", "Department", "Period", "Recipient", "Submitted at", "State",
    ]);
    for row in &status.rows {
        table.row([
            row.index.to_string(),
            row.employee_code.clone(),
            row.employee_name.clone(),
            row.department_name.clone(),
            row.range.map(|r| r.display(" - ")).unwrap_or_default(),
            row.recipient_name.clone(),
            row.submitted_at
                .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default(),
            (if row.submitted { "Sent" } else { "Not sent" }).to_string(),
        ]);
    }
    table
}

fn name_of(directory: &Directory, id: &str) -> String {
    directory
        .employee(id)
        .map_or_else(|| id.to_string(), |e| e.full_name.clone())
}
