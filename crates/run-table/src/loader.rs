//! Locating and parsing the table inside a BehaviorSpace export.
//!
//! BehaviorSpace writes a few lines of free-form preamble (tool banner, model
//! file, experiment name, world bounds) before the real header. The header is
//! the first line that mentions both the step and run-number markers; every
//! line from there on is ordinary comma-separated, double-quoted CSV.

use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::error::LoadError;

/// Marker column holding the step index.
pub const STEP_MARKER: &str = "[step]";
/// Marker column holding the run identifier.
pub const RUN_NUMBER_MARKER: &str = "[run number]";
/// Reporter column with the surviving honest agents.
pub const HONEST_COUNT_COLUMN: &str = "count honest-agents";
/// Reporter column with the surviving deceptive agents.
pub const DECEPTIVE_COUNT_COLUMN: &str = "count deceptive-agents";

/// Raw table parsed from an export, before any column is interpreted.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    /// Zero-based line index of the header within the file
    pub header_line: usize,
    /// Column names, in file order
    pub headers: Vec<String>,
    /// Data rows following the header
    pub rows: Vec<StringRecord>,
}

impl LoadedTable {
    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by exact (trimmed) name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Returns the index of the first line containing both marker tokens.
pub fn find_header_line(text: &str) -> Option<usize> {
    text.lines()
        .position(|line| line.contains(STEP_MARKER) && line.contains(RUN_NUMBER_MARKER))
}

/// Reads and parses the export at `path`.
pub fn load_table(path: &Path) -> Result<LoadedTable, LoadError> {
    let text = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    parse_table(path, &text)
}

/// Parses export text. `path` is only used to label errors.
pub fn parse_table(path: &Path, text: &str) -> Result<LoadedTable, LoadError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let header_line = find_header_line(text).ok_or_else(|| {
        LoadError::malformed(
            path,
            format!(
                "no header line containing both {} and {}",
                STEP_MARKER, RUN_NUMBER_MARKER
            ),
        )
    })?;

    // Byte offset of the header; `lines()` and this split agree on '\n'.
    let offset: usize = text
        .split_inclusive('\n')
        .take(header_line)
        .map(str::len)
        .sum();

    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .quote(b'"')
        .has_headers(true)
        .from_reader(text[offset..].as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::malformed(path, format!("unreadable header line: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            LoadError::malformed(
                path,
                format!("data row {} (line {}): {}", i + 1, header_line + i + 2, e),
            )
        })?;
        rows.push(record);
    }

    tracing::debug!(
        "Parsed {} rows from {:?} (header at line {})",
        rows.len(),
        path,
        header_line
    );

    Ok(LoadedTable {
        header_line,
        headers,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TABLE: &str = "\"[run number]\",\"slander-ratio\",\"[step]\",\"count honest-agents\",\"count deceptive-agents\"\n\
\"1\",\"1.2\",\"0\",\"20\",\"5\"\n\
\"1\",\"1.2\",\"1\",\"21\",\"3\"\n\
\"2\",\"1.2\",\"0\",\"20\",\"5\"\n";

    fn with_preamble(k: usize) -> String {
        let mut text = String::new();
        for i in 0..k {
            text.push_str(&format!("\"preamble line {}\",\"step\",\"run\"\n", i));
        }
        text.push_str(TABLE);
        text
    }

    #[test]
    fn test_header_found_after_any_preamble() {
        for k in 0..8 {
            let text = with_preamble(k);
            let table = parse_table(Path::new("t.csv"), &text).unwrap();
            let total_lines = text.lines().count();

            assert_eq!(table.header_line, k);
            assert_eq!(table.row_count(), total_lines - table.header_line - 1);
        }
    }

    #[test]
    fn test_first_matching_line_wins() {
        let text = format!("\"[run number] and [step] in a banner\"\n{}", TABLE);
        assert_eq!(find_header_line(&text), Some(0));
    }

    #[test]
    fn test_headers_are_unquoted() {
        let table = parse_table(Path::new("t.csv"), &with_preamble(2)).unwrap();

        assert_eq!(table.headers[0], RUN_NUMBER_MARKER);
        assert_eq!(table.column_index(STEP_MARKER), Some(2));
        assert_eq!(table.column_index(HONEST_COUNT_COLUMN), Some(3));
        assert_eq!(&table.rows[1][3], "21");
    }

    #[test]
    fn test_marker_split_across_lines_is_not_a_header() {
        let text = "\"[run number]\",\"x\"\n\"[step]\",\"y\"\n";
        let err = parse_table(Path::new("split.csv"), text).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_missing_step_marker_is_malformed() {
        let text = "\"banner\"\n\"[run number]\",\"ticks\"\n\"1\",\"0\"\n";
        let err = parse_table(Path::new("nostep.csv"), text).unwrap_err();

        assert!(err.is_malformed());
        assert!(err.to_string().contains("nostep.csv"));
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let text = format!("{}\"3\",\"1.2\"\n", TABLE);
        let err = parse_table(Path::new("ragged.csv"), &text).unwrap_err();

        assert!(err.is_malformed());
        assert!(err.to_string().contains("line 5"));
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let text = format!("\u{feff}{}", TABLE);
        let table = parse_table(Path::new("bom.csv"), &text).unwrap();

        assert_eq!(table.header_line, 0);
        assert_eq!(table.headers[0], RUN_NUMBER_MARKER);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = with_preamble(3).replace('\n', "\r\n");
        let table = parse_table(Path::new("crlf.csv"), &text).unwrap();

        assert_eq!(table.header_line, 3);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.headers[4], DECEPTIVE_COUNT_COLUMN);
    }

    #[test]
    fn test_load_table_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(with_preamble(4).as_bytes()).unwrap();
        drop(file);

        let table = load_table(&path).unwrap();
        assert_eq!(table.header_line, 4);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_unreadable_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(&dir.path().join("absent.csv")).unwrap_err();

        assert!(matches!(err, LoadError::Io { .. }));
    }
}
