//! weekrep CLI - Weekly Status Reports
//!
//! Command-line interface for submitting, reviewing, querying and exporting
//! weekly reports kept in a JSON data file.

mod config;
mod output;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, Local, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use weekrep_core::store::DataFile;
use weekrep_core::{
    enumerate_week_codes, parse_week_code, Directory, Employee, HistoryFilter, HistoryView, JsonFileStore,
    Page, ReportDraft, ReportId, ReportStore, ReviewStatus, StatsFilter, SummaryFilter, Visibility,
    WeekCode, WeekOption, WeeklyStatus,
};
use weekrep_render::{text, ExcelExporter, Export};

use config::{Config, DEFAULT_CONFIG_FILE, DEFAULT_DATA_FILE};
use output::{report_error, ExitCode, OutputFormat, Printer};

#[derive(Parser)]
#[command(name = "weekrep")]
#[command(author, version, about = "Weekly status reports", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (./weekrep.toml is used when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Data file, overrides the config
    #[arg(long, global = true, env = "WEEKREP_DATA", value_name = "FILE")]
    data: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List week codes with their date ranges
    Weeks {
        /// First year (defaults to the current year)
        #[arg(long)]
        from: Option<i32>,

        /// Last year (defaults to the first year)
        #[arg(long)]
        to: Option<i32>,
    },

    /// Show the date range of a week code
    Resolve {
        /// Week code, e.g. Y25W28 (defaults to the current week)
        #[arg(value_name = "CODE")]
        code: Option<String>,
    },

    /// List departments
    Departments,

    /// List who a reporter can send reports to
    Recipients {
        /// Reporter id or staff code
        #[arg(long)]
        reporter: String,

        /// Department code (defaults to the reporter's department)
        #[arg(long)]
        department: Option<String>,
    },

    /// Create a config file and an empty data file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Submit a report from a draft JSON file
    Submit {
        #[arg(value_name = "DRAFT")]
        draft: PathBuf,
    },

    /// Replace a report's content with a draft JSON file
    Edit {
        id: ReportId,

        #[arg(value_name = "DRAFT")]
        draft: PathBuf,
    },

    /// Delete a report
    Delete { id: ReportId },

    /// Record a supervisor review
    Review {
        id: ReportId,

        /// pending, approved or rejected
        #[arg(long)]
        status: ReviewStatus,

        /// Supervisor note; empty clears it
        #[arg(long)]
        note: Option<String>,
    },

    /// List a reporter's own reports
    History {
        /// Reporter id or staff code
        #[arg(long)]
        reporter: String,

        #[arg(long)]
        week: Option<String>,

        /// Recipient id
        #[arg(long)]
        recipient: Option<String>,

        #[arg(long)]
        status: Option<ReviewStatus>,
    },

    /// Show one employee's reports for a week
    Summary {
        #[arg(long)]
        week: String,

        /// Staff code
        #[arg(long)]
        employee: String,
    },

    /// Company-wide statistics, one row per report item
    Stats {
        #[command(flatten)]
        filter: StatsArgs,

        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Rows per page (config `page_size` by default)
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Show who has sent their report for a week
    Status(StatusArgs),

    /// Export an Excel workbook
    Export {
        /// Output directory
        #[arg(short, long, global = true, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(subcommand)]
        kind: ExportKind,
    },
}

#[derive(Subcommand)]
enum ExportKind {
    /// One report
    Detail { id: ReportId },

    /// Reports stacked on one sheet
    Summary {
        #[arg(long)]
        week: Option<String>,

        /// Staff code
        #[arg(long)]
        employee: Option<String>,
    },

    /// Flat statistics table
    Stats {
        #[command(flatten)]
        filter: StatsArgs,
    },

    /// Submission status for a week
    Status(StatusArgs),
}

#[derive(Args)]
struct StatsArgs {
    #[arg(long)]
    week: Option<String>,

    /// Department code
    #[arg(long)]
    department: Option<String>,

    /// Part of a staff code or name
    #[arg(long)]
    employee: Option<String>,

    /// Exact item progress
    #[arg(long)]
    progress: Option<String>,
}

impl From<StatsArgs> for StatsFilter {
    fn from(args: StatsArgs) -> Self {
        Self {
            week: args.week,
            department: args.department,
            employee: args.employee,
            progress: args.progress,
        }
    }
}

#[derive(Args)]
struct StatusArgs {
    #[arg(long)]
    week: String,

    /// Department code
    #[arg(long)]
    department: Option<String>,

    /// Only employees who have not sent
    #[arg(long, conflicts_with = "submitted")]
    missing: bool,

    /// Only employees who have sent
    #[arg(long)]
    submitted: bool,
}

impl StatusArgs {
    fn build(&self, store: &JsonFileStore) -> WeeklyStatus {
        WeeklyStatus::build(
            store.directory(),
            store.reports(),
            Some(&self.week),
            self.department.as_deref(),
            Visibility {
                only_missing: self.missing,
                only_submitted: self.submitted,
            },
        )
    }
}

fn main() -> process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(err) = &result {
        report_error(err);
    }
    ExitCode::from_result(&result).into()
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Config plus the data file it points at
struct Settings {
    config: Config,
    data: PathBuf,
}

impl Settings {
    /// `--data` wins over the config's data file
    fn load(config: Option<&Path>, data: Option<&Path>) -> Result<Self> {
        let config = Config::load(config)?;
        let data = data.map_or_else(|| config.data.clone(), Path::to_path_buf);
        debug!(data = %data.display(), "using data file");
        Ok(Self { config, data })
    }

    fn open_store(&self) -> Result<JsonFileStore> {
        JsonFileStore::open(&self.data)
            .with_context(|| format!("Failed to open data file {}", self.data.display()))
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        config,
        data,
        format,
        command,
        ..
    } = cli;
    let mut printer = Printer::stdout(format);
    // Calendar commands and init never read the config
    let load_settings = || Settings::load(config.as_deref(), data.as_deref());

    match command {
        Commands::Weeks { from, to } => cmd_weeks(&mut printer, from, to),
        Commands::Resolve { code } => cmd_resolve(&mut printer, code.as_deref()),
        Commands::Init { force } => cmd_init(&mut printer, config.as_deref(), data.as_deref(), force),
        Commands::Departments => {
            let store = load_settings()?.open_store()?;
            let options = store.directory().department_options();
            printer.table(&text::option_table(["Code", "Department"], &options), &options)
        }
        Commands::Recipients { reporter, department } => {
            let store = load_settings()?.open_store()?;
            let directory = store.directory();
            let reporter = find_employee(directory, &reporter)?;
            let department = department.or_else(|| reporter.department.clone()).unwrap_or_default();
            let options = directory.recipient_options(&department, &reporter.id);
            printer.table(&text::option_table(["ID", "Recipient"], &options), &options)
        }
        Commands::Submit { draft } => {
            let mut store = load_settings()?.open_store()?;
            let draft = read_draft(&draft)?;
            check_people(store.directory(), &draft)?;
            let id = store.submit(draft, now())?;
            store.save()?;
            let report = store.get(id).ok_or_else(|| anyhow!("report {id} not stored"))?;
            printer.line(
                &format!(
                    "Submitted report {id} for {} ({})",
                    report.week_code,
                    report.range().display(" - ")
                ),
                report,
            )
        }
        Commands::Edit { id, draft } => {
            let mut store = load_settings()?.open_store()?;
            let draft = read_draft(&draft)?;
            check_people(store.directory(), &draft)?;
            let reporter = draft.reporter_id.clone();
            store.update(&reporter, id, draft)?;
            store.save()?;
            let report = store.get(id).ok_or_else(|| anyhow!("report {id} not stored"))?;
            printer.line(&format!("Updated report {id}"), report)
        }
        Commands::Delete { id } => {
            let mut store = load_settings()?.open_store()?;
            let removed = store.delete(id)?;
            store.save()?;
            printer.line(&format!("Deleted report {id} ({})", removed.week_code), &removed)
        }
        Commands::Review { id, status, note } => {
            let mut store = load_settings()?.open_store()?;
            store.review(id, status, note)?;
            store.save()?;
            let report = store.get(id).ok_or_else(|| anyhow!("report {id} not stored"))?;
            printer.line(&format!("Report {id} marked {status}"), report)
        }
        Commands::History {
            reporter,
            week,
            recipient,
            status,
        } => {
            let store = load_settings()?.open_store()?;
            let directory = store.directory();
            let reporter = find_employee(directory, &reporter)?;
            let filter = HistoryFilter {
                week,
                recipient,
                status,
            };
            let view = HistoryView::build(store.reports(), directory, &reporter.id, &filter);
            printer.table(
                &text::history_table(&view, directory),
                &json!({
                    "reports": view.reports,
                    "weeks": view.week_options,
                    "recipients": view.recipient_options,
                }),
            )
        }
        Commands::Summary { week, employee } => {
            let store = load_settings()?.open_store()?;
            let filter = SummaryFilter {
                week: Some(week),
                employee_code: Some(employee),
            };
            let reports = filter.select(store.reports(), store.directory());
            printer.table(&text::summary_table(&reports, store.directory()), &reports)
        }
        Commands::Stats {
            filter,
            page,
            page_size,
        } => {
            let settings = load_settings()?;
            let store = settings.open_store()?;
            let filter = StatsFilter::from(filter);
            let page = Page::new(page, page_size.unwrap_or(settings.config.page_size));
            let stats = filter.page(store.reports(), store.directory(), page);

            let rows: Vec<_> = stats
                .rows
                .iter()
                .map(|row| {
                    json!({
                        "report_id": row.report.id,
                        "week_code": row.report.week_code,
                        "reporter_id": row.report.reporter_id,
                        "item": row.item,
                    })
                })
                .collect();
            printer.table(
                &text::stats_table(&stats, store.directory()),
                &json!({
                    "rows": rows,
                    "total_count": stats.total_count,
                    "total_pages": stats.total_pages,
                    "page": stats.page.number,
                    "page_size": stats.page.size,
                }),
            )?;
            printer.note(&format!(
                "Page {} of {} ({} rows)",
                stats.page.number,
                stats.total_pages.max(1),
                stats.total_count
            ))
        }
        Commands::Status(args) => {
            let store = load_settings()?.open_store()?;
            let status = args.build(&store);
            printer.table(&text::status_table(&status), &status)?;
            printer.note(&format!(
                "Total: {}  Sent: {}  Not sent: {}  ({}%)",
                status.total,
                status.sent,
                status.not_sent,
                status.completion_percent()
            ))
        }
        Commands::Export { output, kind } => {
            let settings = load_settings()?;
            let store = settings.open_store()?;
            let export = export(&store, &settings.config, kind)?;
            let dir = output.unwrap_or_else(|| PathBuf::from("."));
            fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
            let path = export
                .write_to(&dir)
                .with_context(|| format!("Failed to write {}", export.file_name))?;
            info!(path = %path.display(), bytes = export.bytes.len(), "workbook written");
            printer.line(
                &format!("Wrote {}", path.display()),
                &json!({ "path": path, "bytes": export.bytes.len() }),
            )
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_weeks(printer: &mut Printer<std::io::Stdout>, from: Option<i32>, to: Option<i32>) -> Result<()> {
    let from = from.unwrap_or_else(|| Local::now().year());
    let to = to.unwrap_or(from);
    if to < from {
        bail!("--to {to} is before --from {from}");
    }

    let options: Vec<WeekOption> = enumerate_week_codes(from, to).collect();
    debug!(from, to, weeks = options.len(), "enumerated week codes");
    match printer.format() {
        OutputFormat::Text => printer.line(text::week_list(&options).trim_end(), &options),
        OutputFormat::Json => printer.line("", &options),
    }
}

fn cmd_resolve(printer: &mut Printer<std::io::Stdout>, code: Option<&str>) -> Result<()> {
    let week = match code {
        Some(code) => parse_week_code(code)?,
        None => WeekCode::containing(Local::now().date_naive()),
    };
    let code = week.canonical();
    let range = week
        .range()
        .ok_or_else(|| anyhow!("week {code} is outside the supported calendar"))?;
    printer.line(
        &format!("{code}: {}", range.display(" - ")),
        &json!({ "code": code, "start": range.start, "end": range.end }),
    )
}

fn cmd_init(
    printer: &mut Printer<std::io::Stdout>,
    config_path: Option<&Path>,
    data: Option<&Path>,
    force: bool,
) -> Result<()> {
    let config_path = config_path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
    if config_path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", config_path.display());
    }

    let config = Config {
        data: data.map_or_else(|| PathBuf::from(DEFAULT_DATA_FILE), Path::to_path_buf),
        ..Config::default()
    };
    fs::write(&config_path, config.to_toml()?)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let base = config_path.parent().unwrap_or_else(|| Path::new(""));
    let data_path = if config.data.is_relative() {
        base.join(&config.data)
    } else {
        config.data.clone()
    };
    if data_path.exists() {
        printer.note(&format!("Keeping existing {}", data_path.display()))?;
    } else {
        JsonFileStore::with_data(&data_path, DataFile::default()).save()?;
    }

    info!(config = %config_path.display(), data = %data_path.display(), "initialized");
    printer.line(
        &format!("Created {}", config_path.display()),
        &json!({ "config": config_path, "data": data_path }),
    )
}

fn export(store: &JsonFileStore, config: &Config, kind: ExportKind) -> Result<Export> {
    let mut exporter = ExcelExporter::new().company(&config.company);
    if let Some(logo) = &config.logo {
        exporter = exporter.logo(logo.clone());
    }
    let directory = store.directory();

    let export = match kind {
        ExportKind::Detail { id } => {
            let report = store.get(id).ok_or_else(|| anyhow!("Report not found: {id}"))?;
            exporter.detail(report, directory)?
        }
        ExportKind::Summary { week, employee } => {
            let filter = SummaryFilter {
                week: week.clone(),
                employee_code: employee.clone(),
            };
            let reports = filter.select_for_export(store.reports(), directory);
            exporter.summary(&reports, directory, week.as_deref(), employee.as_deref())?
        }
        ExportKind::Stats { filter } => {
            let reports = StatsFilter::from(filter).select_for_export(store.reports(), directory);
            exporter.statistics(&reports, directory, now())?
        }
        ExportKind::Status(args) => exporter.status(&args.build(store))?,
    };
    Ok(export)
}

// ============================================================================
// Helpers
// ============================================================================

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn read_draft(path: &Path) -> Result<ReportDraft> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut draft: ReportDraft =
        serde_json::from_str(&text).with_context(|| format!("Invalid draft {}", path.display()))?;
    // The range always follows the week code
    let code = draft.week_code.clone();
    draft.range = None;
    draft.select_week(&code);
    Ok(draft)
}

/// Reporter and recipient of a draft must be known employees
fn check_people(directory: &Directory, draft: &ReportDraft) -> Result<()> {
    if directory.employee(&draft.reporter_id).is_none() {
        bail!("Unknown reporter: {}", draft.reporter_id);
    }
    if let Some(recipient) = draft.recipient_id.as_deref().filter(|r| !r.is_empty()) {
        if directory.employee(recipient).is_none() {
            bail!("Unknown recipient: {recipient}");
        }
    }
    Ok(())
}

/// Look up an employee by id, then by staff code
fn find_employee<'a>(directory: &'a Directory, key: &str) -> Result<&'a Employee> {
    directory
        .employee(key)
        .or_else(|| directory.employee_by_code(key))
        .ok_or_else(|| anyhow!("Unknown employee: {key}"))
}
