//! Console output for CLI commands
//!
//! Listings are printed either as aligned text tables or as JSON for
//! scripting. Errors go to stderr.
//!
//! ## Exit Code Semantics
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success |
//! | 1 | Failure: invalid input, missing report, duplicate week, I/O |
//!
//! `--format=json` does not change exit codes.

use std::io::Write;
use std::process;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use weekrep_render::TextTable;

// ============================================================================
// Exit Code
// ============================================================================

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
}

impl ExitCode {
    pub fn from_result<T>(result: &Result<T>) -> Self {
        if result.is_ok() {
            ExitCode::Success
        } else {
            ExitCode::Failure
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}

// ============================================================================
// Format
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Writes command results in the selected format
pub struct Printer<W: Write> {
    format: OutputFormat,
    out: W,
}

impl Printer<std::io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, std::io::stdout())
    }
}

impl<W: Write> Printer<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self { format, out }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Print `table` as text, or `value` as JSON
    pub fn table<T: Serialize + ?Sized>(&mut self, table: &TextTable, value: &T) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                if table.is_empty() {
                    writeln!(self.out, "(no rows)")?;
                } else {
                    write!(self.out, "{}", table.render())?;
                }
            }
            OutputFormat::Json => self.json(value)?,
        }
        Ok(())
    }

    /// Print a text line, or `value` as JSON
    pub fn line<T: Serialize + ?Sized>(&mut self, text: &str, value: &T) -> Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{text}")?,
            OutputFormat::Json => self.json(value)?,
        }
        Ok(())
    }

    /// Extra text-only line, skipped in JSON mode
    pub fn note(&mut self, text: &str) -> Result<()> {
        if self.format == OutputFormat::Text {
            writeln!(self.out, "{text}")?;
        }
        Ok(())
    }

    fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.out, value)?;
        writeln!(self.out)?;
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

/// Print an error chain to stderr
pub fn report_error(err: &anyhow::Error) {
    eprintln!("error: {err}");
    for cause in err.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn printed(format: OutputFormat, f: impl FnOnce(&mut Printer<Vec<u8>>) -> Result<()>) -> String {
        let mut printer = Printer::new(format, Vec::new());
        f(&mut printer).unwrap();
        String::from_utf8(printer.into_inner()).unwrap()
    }

    #[test]
    fn exit_codes() {
        assert_eq!(ExitCode::from_result(&Ok::<_, anyhow::Error>(())).code(), 0);
        assert_eq!(ExitCode::from_result::<()>(&Err(anyhow::anyhow!("boom"))).code(), 1);
    }

    #[test]
    fn text_table_or_placeholder() {
        let mut table = TextTable::new(["A"]);
        let empty = printed(OutputFormat::Text, |p| p.table(&table, &json!([])));
        assert_eq!(empty, "(no rows)\n");

        table.row(["x"]);
        let text = printed(OutputFormat::Text, |p| p.table(&table, &json!([])));
        assert_eq!(text, "A\n-\nx\n");
    }

    #[test]
    fn json_mode_prints_value() {
        let table = TextTable::new(["A"]);
        let out = printed(OutputFormat::Json, |p| {
            p.note("ignored")?;
            p.table(&table, &json!({"total": 2}))
        });
        assert_eq!(out, "{\n  \"total\": 2\n}\n");
    }

    #[test]
    fn text_line() {
        let out = printed(OutputFormat::Text, |p| p.line("Y25W28", &json!(null)));
        assert_eq!(out, "Y25W28\n");
    }
}
