//! # weekrep-render
//!
//! Output formats for weekly reports.
//!
//! ## Available Renderers
//!
//! - **Excel**: XLSX workbooks for a single report, a stacked summary,
//!   company-wide statistics and weekly submission status
//! - **Text**: plain-text tables for console output
//!
//! ## Example
//!
//! ```rust,no_run
//! use weekrep_core::{Directory, WeeklyStatus, Visibility};
//! use weekrep_render::ExcelExporter;
//!
//! let directory = Directory::default();
//! let status = WeeklyStatus::build(&directory, &[], Some("Y25W28"), None, Visibility::default());
//!
//! let export = ExcelExporter::new().company("Acme Trading").status(&status).unwrap();
//! std::fs::write(&export.file_name, &export.bytes).unwrap();
//! ```

pub mod excel;
pub mod text;

use thiserror::Error;

pub use excel::ExcelExporter;
pub use text::TextTable;

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// A rendered file: suggested name plus contents
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Export {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Export {
    /// Write into `dir` under the suggested file name
    pub fn write_to(&self, dir: &std::path::Path) -> Result<std::path::PathBuf, RenderError> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}
