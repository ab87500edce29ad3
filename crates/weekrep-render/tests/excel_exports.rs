//! Integration tests for Excel exports over stored reports

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use weekrep_core::{
    Department, Directory, Employee, MemoryStore, ReportDraft, ReportItem, ReportStore, StatsFilter,
    SummaryFilter, Visibility, WeeklyStatus,
};
use weekrep_render::{ExcelExporter, RenderError};

fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn directory() -> Directory {
    Directory {
        departments: vec![
            Department::new("SALES", "Sales").company("Acme Trading"),
            Department::new("IT", "Engineering").company("Acme Trading"),
        ],
        employees: vec![
            Employee::new("u1", "NV001", "Tran An").position("Clerk").department("SALES"),
            Employee::new("u2", "NV002", "Le Binh").position("Manager").department("SALES"),
            Employee::new("u3", "NV003", "Pham Chi").position("Engineer").department("IT"),
        ],
    }
}

fn submit(store: &mut MemoryStore, reporter: &str, week: &str, items: &[(&str, &str, &str)]) -> u64 {
    let mut draft = ReportDraft::new(reporter);
    draft.recipient_id = Some("u2".into());
    draft.select_week(week);
    draft.rows = items
        .iter()
        .map(|(area, content, progress)| ReportItem {
            area: (*area).into(),
            content: (*content).into(),
            progress: (*progress).into(),
            ..ReportItem::default()
        })
        .collect();
    store.submit(draft, at(2025, 7, 11, 17)).unwrap()
}

fn populated_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    submit(
        &mut store,
        "u1",
        "Y25W28",
        &[("Sales", "Quarterly review", "Done"), ("Sales", "Client visits", "50%")],
    );
    submit(&mut store, "u3", "Y25W28", &[("Infra", "Backup audit", "Done")]);
    submit(&mut store, "u1", "Y25W27", &[("Sales", "Price list", "Done")]);
    store
}

#[test]
fn export_all_workbooks_to_disk() {
    let store = populated_store();
    let directory = directory();
    let exporter = ExcelExporter::new().company("Acme Trading");
    let out = tempfile::tempdir().unwrap();

    let first = store.get(1).unwrap();
    let detail = exporter.detail(first, &directory).unwrap();

    let summary_filter = SummaryFilter {
        week: Some("Y25W28".into()),
        employee_code: Some("NV001".into()),
    };
    let selected = summary_filter.select_for_export(store.reports(), &directory);
    let summary = exporter.summary(&selected, &directory, Some("Y25W28"), Some("NV001")).unwrap();

    let stats_filter = StatsFilter {
        progress: Some("Done".into()),
        ..StatsFilter::default()
    };
    let matching = stats_filter.select_for_export(store.reports(), &directory);
    let statistics = exporter.statistics(&matching, &directory, at(2025, 7, 12, 8)).unwrap();

    let status = WeeklyStatus::build(&directory, store.reports(), Some("Y25W28"), None, Visibility::default());
    let status_export = exporter.status(&status).unwrap();

    let mut names = Vec::new();
    for export in [&detail, &summary, &statistics, &status_export] {
        let path = export.write_to(out.path()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"), "{} is not a zip container", export.file_name);
        names.push(export.file_name.clone());
    }

    assert_eq!(
        names,
        vec![
            "WeeklyReport_Y25W28_NV001.xlsx",
            "WeeklyReportSummary_Y25W28_NV001.xlsx",
            "Statistics_20250712080000.xlsx",
            "WeeklyStatus_Y25W28.xlsx",
        ]
    );
}

#[test]
fn statistics_selection_keeps_whole_reports() {
    let store = populated_store();
    let filter = StatsFilter {
        progress: Some("50%".into()),
        ..StatsFilter::default()
    };
    let matching = filter.select_for_export(store.reports(), &directory());

    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].items.len(), 2);
}

#[test]
fn empty_summary_is_rejected() {
    let store = populated_store();
    let filter = SummaryFilter {
        week: Some("Y25W01".into()),
        employee_code: Some("NV001".into()),
    };
    let selected = filter.select_for_export(store.reports(), &directory());
    let err = ExcelExporter::new()
        .summary(&selected, &directory(), Some("Y25W01"), Some("NV001"))
        .unwrap_err();
    assert!(matches!(err, RenderError::InvalidData(_)));
}
