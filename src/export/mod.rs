//! CSV and printable-HTML export of whatever list a page is showing.

mod csv;
mod html;
mod records;

pub use self::csv::to_csv;
pub use html::{escape_html, printable_html, PRINT_DELAY_MS};

use chrono::{FixedOffset, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// How amounts and timestamps are rendered
#[derive(Debug, Clone)]
pub struct DisplayContext {
    pub currency_symbol: String,
    pub offset: FixedOffset,
}

impl Default for DisplayContext {
    fn default() -> Self {
        Self {
            currency_symbol: "MT".to_string(),
            offset: crate::format::parse_offset("+02:00"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    /// `raw` goes to CSV, `display` to screens and print
    Number { raw: f64, display: String },
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn opt(value: Option<&str>) -> Self {
        Cell::Text(value.unwrap_or("").to_string())
    }

    pub fn number(raw: f64, display: String) -> Self {
        Cell::Number { raw, display }
    }

    pub fn raw(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number { raw, .. } => raw.to_string(),
        }
    }

    pub fn display(&self) -> &str {
        match self {
            Cell::Text(s) => s,
            Cell::Number { display, .. } => display,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Number { .. })
    }
}

/// A record that can be laid out as one row of an export
pub trait Tabular {
    fn headers() -> &'static [&'static str];

    fn cells(&self, ctx: &DisplayContext) -> Vec<Cell>;
}

/// `<dataset>_<YYYY-MM-DD>.<ext>`
pub fn export_filename(dataset: &str, date: NaiveDate, ext: &str) -> String {
    format!("{}_{}.{}", dataset, date.format("%Y-%m-%d"), ext)
}

/// Write an export file into `dir`, creating it if needed
pub fn write_export(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    fs::write(&path, content)?;
    log::info!("wrote export {}", path.display());
    Ok(path)
}
