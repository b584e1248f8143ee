//! Selection of the most recent access log in a directory.
//!
//! Log rotation leaves files named `nginx-access-ui.log-YYYYMMDD`, optionally with a
//! suffix such as `.gz`. Only the top level of the directory is scanned.

use crate::model::error::SelectError;
use chrono::NaiveDate;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Rotated log name: fixed prefix, eight-digit date, optional non-digit suffix.
static LOG_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^nginx-access-ui\.log-([0-9]{8})(?:[^0-9].*)?$").expect("log name pattern is valid")
});

const LOG_DATE_FORMAT: &str = "%Y%m%d";
const GZIP_EXTENSION: &str = "gz";

/// A log file chosen for analysis, with the date embedded in its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    /// Full path (directory joined with file name).
    pub path: PathBuf,
    /// Date parsed from the file name.
    pub date: NaiveDate,
}

impl LogFile {
    /// True if the file is gzip-compressed (by extension).
    pub fn is_gzip(&self) -> bool {
        is_gzip_path(&self.path)
    }
}

/// True if `path` has a `.gz` extension.
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == GZIP_EXTENSION)
}

/// Extract the log date from a file name.
///
/// Returns `None` for names that do not follow the rotation convention and for
/// names whose eight digits are not a calendar date (`20231301`, say).
pub fn log_date_from_name(name: &str) -> Option<NaiveDate> {
    let caps = LOG_NAME_PATTERN.captures(name)?;
    let digits = caps.get(1)?.as_str();
    match NaiveDate::parse_from_str(digits, LOG_DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(error) => {
            warn!(file = name, %error, "Skipping log with invalid date in name");
            None
        }
    }
}

/// Find the most recent log file in `dir`.
///
/// Ties on the date go to the entry listed last by the directory listing, so a
/// `.gz` and a plain file for the same day resolve to whichever the filesystem
/// returns later.
///
/// Returns `Ok(None)` if no entry matches; that is not an error.
///
/// # Errors
///
/// Returns [`SelectError::InvalidDirectory`] if `dir` is not a directory and
/// [`SelectError::Io`] if the listing cannot be read.
pub fn find_latest_log(dir: &Path) -> Result<Option<LogFile>, SelectError> {
    if !dir.is_dir() {
        return Err(SelectError::InvalidDirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut latest: Option<LogFile> = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(date) = log_date_from_name(name) else {
            continue;
        };

        debug!(file = name, %date, "Found candidate log");
        if latest.as_ref().is_none_or(|current| date >= current.date) {
            latest = Some(LogFile { path, date });
        }
    }

    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").expect("Failed to create test file");
    }

    #[test]
    fn log_date_from_name_accepts_plain_and_suffixed_names() {
        let expected = NaiveDate::from_ymd_opt(2017, 6, 30);
        assert_eq!(log_date_from_name("nginx-access-ui.log-20170630"), expected);
        assert_eq!(log_date_from_name("nginx-access-ui.log-20170630.gz"), expected);
        assert_eq!(log_date_from_name("nginx-access-ui.log-20170630.bz2"), expected);
    }

    #[test]
    fn log_date_from_name_rejects_other_names() {
        assert_eq!(log_date_from_name("nginx-access-ui.log"), None);
        assert_eq!(log_date_from_name("nginx-access-ui.log-2017063"), None);
        assert_eq!(log_date_from_name("nginx-access-ui.log-201706301"), None);
        assert_eq!(log_date_from_name("nginx-access-api.log-20170630"), None);
        assert_eq!(log_date_from_name("old-nginx-access-ui.log-20170630"), None);
    }

    #[test]
    fn log_date_from_name_skips_impossible_dates() {
        assert_eq!(log_date_from_name("nginx-access-ui.log-20171301"), None);
        assert_eq!(log_date_from_name("nginx-access-ui.log-20170230"), None);
    }

    #[test]
    fn find_latest_log_picks_most_recent_date() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "nginx-access-ui.log-20170629");
        touch(dir.path(), "nginx-access-ui.log-20170701.gz");
        touch(dir.path(), "nginx-access-ui.log-20170630");

        let log = find_latest_log(dir.path())
            .expect("readable directory")
            .expect("a log should match");
        assert_eq!(log.path, dir.path().join("nginx-access-ui.log-20170701.gz"));
        assert_eq!(log.date, NaiveDate::from_ymd_opt(2017, 7, 1).unwrap());
        assert!(log.is_gzip());
    }

    #[test]
    fn find_latest_log_breaks_ties_by_last_listed_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "nginx-access-ui.log-20230101");
        touch(dir.path(), "nginx-access-ui.log-20230215");
        touch(dir.path(), "nginx-access-ui.log-20230215.gz");

        let last_listed = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .filter(|name| name.starts_with("nginx-access-ui.log-20230215"))
            .last()
            .unwrap();

        let log = find_latest_log(dir.path()).unwrap().unwrap();
        assert_eq!(log.path, dir.path().join(last_listed));
        assert_eq!(log.date, NaiveDate::from_ymd_opt(2023, 2, 15).unwrap());
    }

    #[test]
    fn find_latest_log_returns_none_without_matches() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "access.log");
        touch(dir.path(), "nginx-access-ui.log-20171301");

        let result = find_latest_log(dir.path()).expect("readable directory");
        assert_eq!(result, None);
    }

    #[test]
    fn find_latest_log_returns_none_for_empty_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(find_latest_log(dir.path()).unwrap(), None);
    }

    #[test]
    fn find_latest_log_does_not_descend_into_subdirectories() {
        let dir = tempfile::tempdir().expect("tempdir");
        touch(dir.path(), "nginx-access-ui.log-20170101");
        let nested = dir.path().join("archive");
        fs::create_dir(&nested).unwrap();
        touch(&nested, "nginx-access-ui.log-20181231");
        fs::create_dir(dir.path().join("nginx-access-ui.log-20190101")).unwrap();

        let log = find_latest_log(dir.path()).unwrap().unwrap();
        assert_eq!(log.path, dir.path().join("nginx-access-ui.log-20170101"));
    }

    #[test]
    fn find_latest_log_rejects_non_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("plain.txt");
        fs::write(&file, "not a directory").unwrap();

        let result = find_latest_log(&file);
        assert!(
            matches!(result, Err(SelectError::InvalidDirectory { ref path }) if path == &file),
            "Expected InvalidDirectory, got: {:?}",
            result
        );
    }

    #[test]
    fn find_latest_log_rejects_missing_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing");
        assert!(matches!(
            find_latest_log(&missing),
            Err(SelectError::InvalidDirectory { .. })
        ));
    }
}
