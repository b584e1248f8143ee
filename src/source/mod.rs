//! Log input sources.
//!
//! This module provides everything between a log directory and a stream of
//! parsed records:
//! - Selection of the most recent rotated log in a directory
//! - Opening a log file, transparently decompressing `.gz` files
//! - A lazy record stream with an error-rate budget

use crate::model::error::InputError;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub mod selector;
pub mod stream;

pub use selector::{find_latest_log, is_gzip_path, log_date_from_name, LogFile};
pub use stream::{LineStream, StreamSummary, ERROR_THRESHOLD_PERCENT};

/// Open a log file for line-oriented reading.
///
/// Files with a `.gz` extension are decompressed on the fly (multi-member
/// archives included); everything else is read as-is.
///
/// # Errors
///
/// Returns `InputError::FileNotFound` if the file does not exist.
/// Returns `InputError::Io` for other I/O errors.
pub fn open_log(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    if !path.exists() {
        return Err(InputError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path)?;
    if is_gzip_path(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs;
    use std::io::{Read, Write};

    #[test]
    fn open_log_reads_plain_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nginx-access-ui.log-20170630");
        fs::write(&path, "first\nsecond\n").unwrap();

        let mut contents = String::new();
        open_log(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn open_log_decompresses_gzip_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nginx-access-ui.log-20170630.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"first\nsecond\n").unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        let lines: Vec<String> = open_log(&path)
            .unwrap()
            .lines()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn open_log_returns_file_not_found_for_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nginx-access-ui.log-20170630");

        let result = open_log(&missing);
        assert!(matches!(result, Err(InputError::FileNotFound { .. })));
    }
}
