//! Line-oriented ledger adapter.
//!
//! One trade per line, no header row. Reads a file, or stdin when the path is
//! `-`.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use crate::domain::error::CapgainsError;
use crate::ports::ledger_port::LedgerPort;

pub const STDIN_PATH: &str = "-";

#[derive(Debug, Clone, PartialEq)]
pub enum LineSource {
    File(PathBuf),
    Stdin,
}

pub struct LineFileAdapter {
    source: LineSource,
}

impl LineFileAdapter {
    pub fn new(source: LineSource) -> Self {
        Self { source }
    }

    pub fn from_path(path: PathBuf) -> Self {
        if path.as_os_str() == STDIN_PATH {
            Self::new(LineSource::Stdin)
        } else {
            Self::new(LineSource::File(path))
        }
    }

    fn read_all(&self) -> io::Result<String> {
        match &self.source {
            LineSource::File(path) => fs::read_to_string(path),
            LineSource::Stdin => {
                let mut content = String::new();
                io::stdin().lock().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }
}

/// Split into records. Strips a trailing `\r` and drops blank lines; every
/// other byte of a line is kept as-is.
pub fn split_records(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

impl LedgerPort for LineFileAdapter {
    fn source_name(&self) -> String {
        match &self.source {
            LineSource::File(path) => path.display().to_string(),
            LineSource::Stdin => "<stdin>".to_string(),
        }
    }

    fn read_records(&self) -> Result<Vec<String>, CapgainsError> {
        let content = self.read_all().map_err(|e| CapgainsError::LedgerRead {
            source_name: self.source_name(),
            reason: e.to_string(),
        })?;
        Ok(split_records(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_ledger(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.txt");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn reads_records_in_order() {
        let (_dir, path) = write_ledger("d1,IBM,b,10,1\nd2,IBM,s,10,5\n");
        let adapter = LineFileAdapter::from_path(path);
        let records = adapter.read_records().unwrap();
        assert_eq!(records, vec!["d1,IBM,b,10,1", "d2,IBM,s,10,5"]);
    }

    #[test]
    fn first_line_is_not_a_header() {
        let (_dir, path) = write_ledger("date,symbol,side,quantity,price\nd1,IBM,b,10,1\n");
        let records = LineFileAdapter::from_path(path).read_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], "date,symbol,side,quantity,price");
    }

    #[test]
    fn strips_carriage_returns_and_blank_lines() {
        let records = split_records("d1,IBM,b,10,1\r\n\r\n   \nd2,IBM,s,10,5\r\n");
        assert_eq!(records, vec!["d1,IBM,b,10,1", "d2,IBM,s,10,5"]);
    }

    #[test]
    fn keeps_inner_whitespace() {
        let records = split_records(" d1, IBM ,b,10,1\n");
        assert_eq!(records, vec![" d1, IBM ,b,10,1"]);
    }

    #[test]
    fn empty_file_has_no_records() {
        let (_dir, path) = write_ledger("");
        let records = LineFileAdapter::from_path(path).read_records().unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let adapter = LineFileAdapter::from_path(PathBuf::from("/nonexistent/trades.txt"));
        let err = adapter.read_records().unwrap_err();
        assert!(matches!(err, CapgainsError::LedgerRead { .. }));
    }

    #[test]
    fn dash_selects_stdin() {
        let adapter = LineFileAdapter::from_path(PathBuf::from("-"));
        assert_eq!(adapter.source, LineSource::Stdin);
        assert_eq!(adapter.source_name(), "<stdin>");
    }
}
