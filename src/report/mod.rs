//! Report rendering.
//!
//! The finalized statistics table is serialized as a JSON array and substituted
//! for the `$table_json` placeholder of an HTML template. Reports are written
//! atomically: a sibling temporary file is renamed into place, so a reader never
//! observes a half-written report.

use crate::model::error::ReportError;
use crate::model::EndpointSummary;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// Placeholder replaced by the serialized table.
pub const TABLE_PLACEHOLDER: &str = "$table_json";

const REPORT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Path of the report for a log dated `date`: `<dir>/report-YYYY-MM-DD.html`.
pub fn report_path(report_dir: &Path, date: NaiveDate) -> PathBuf {
    report_dir.join(format!("report-{}.html", date.format(REPORT_DATE_FORMAT)))
}

/// Serialize rows as the JSON payload embedded in the report.
///
/// # Errors
///
/// Returns `ReportError::Serialize` if serialization fails (non-finite floats).
pub fn table_json(rows: &[EndpointSummary]) -> Result<String, ReportError> {
    Ok(serde_json::to_string(rows)?)
}

/// Substitute the serialized table into `template`.
///
/// Every occurrence of [`TABLE_PLACEHOLDER`] is replaced. A template without the
/// placeholder is rendered unchanged.
pub fn render(template: &str, rows: &[EndpointSummary]) -> Result<String, ReportError> {
    let table = table_json(rows)?;
    Ok(template.replace(TABLE_PLACEHOLDER, &table))
}

/// Read the HTML template.
///
/// # Errors
///
/// Returns `ReportError::TemplateRead` if the file cannot be read.
pub fn load_template(path: &Path) -> Result<String, ReportError> {
    fs::read_to_string(path).map_err(|source| ReportError::TemplateRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `contents` to `path` atomically, creating the parent directory.
///
/// # Errors
///
/// Returns `ReportError::Write` if the directory, the temporary file or the
/// rename fails. The temporary file is removed on failure.
pub fn write_report(path: &Path, contents: &str) -> Result<(), ReportError> {
    let write_error = |source: std::io::Error| ReportError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let result = fs::write(&tmp_path, contents).and_then(|()| fs::rename(&tmp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result.map_err(write_error)
}
