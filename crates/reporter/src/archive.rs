//! Directory housekeeping: input discovery, naming and archiving.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

/// Timestamp format used in chart and archive names.
pub const TIMESTAMP_FORMAT: &str = "%Y.%m.%d-%H.%M.%S";

/// Extension of the exports picked up from the input directory.
pub const INPUT_EXTENSION: &str = ".csv";

/// Lists the exports waiting in `dir`, sorted by file name.
pub fn list_inputs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_export = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(INPUT_EXTENSION));
        if is_export && entry.file_type()?.is_file() {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Formats a point in time in local time.
pub fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// Timestamp of a file's creation, or of its last modification where the
/// platform does not record creation time.
pub fn file_timestamp(path: &Path) -> io::Result<String> {
    let meta = fs::metadata(path)?;
    let time = meta.created().or_else(|_| meta.modified())?;
    Ok(format_timestamp(time))
}

/// Chart name for one configuration of an export, without extension.
pub fn graph_name(timestamp: &str, source: &Path, config_values: &str) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    format!("{} - {} [{}]", timestamp, stem, config_values)
}

/// Destination of an export inside the imported directory.
pub fn archive_path(imported_dir: &Path, timestamp: &str, source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    imported_dir.join(format!("{} - {}", timestamp, name))
}

/// Moves `from` to `to`, copying and deleting when a rename is not possible.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            tracing::debug!(
                "Rename {:?} -> {:?} failed ({}), copying instead",
                from,
                to,
                rename_err
            );
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_list_inputs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.csv", "a.csv", "notes.txt", "c.CSV", "d.csv.bak"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("folder.csv")).unwrap();

        let names: Vec<String> = list_inputs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn test_format_timestamp() {
        let local = Local.with_ymd_and_hms(2026, 3, 7, 14, 5, 9).unwrap();
        let time: SystemTime = local.into();

        assert_eq!(format_timestamp(time), "2026.03.07-14.05.09");
    }

    #[test]
    fn test_file_timestamp_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.csv");
        fs::write(&path, "x").unwrap();

        let stamp = file_timestamp(&path).unwrap();
        assert_eq!(stamp.len(), "YYYY.MM.DD-HH.MM.SS".len());
        assert_eq!(&stamp[4..5], ".");
        assert_eq!(&stamp[10..11], "-");
    }

    #[test]
    fn test_graph_and_archive_names() {
        let source = Path::new("in/slander sweep.v2.csv");

        assert_eq!(
            graph_name("2026.10.18-09.30.00", source, "0.5-false-1.2"),
            "2026.10.18-09.30.00 - slander sweep.v2 [0.5-false-1.2]"
        );
        assert_eq!(
            archive_path(Path::new("imported"), "2026.10.18-09.30.00", source),
            Path::new("imported/2026.10.18-09.30.00 - slander sweep.v2.csv")
        );
    }

    #[test]
    fn test_move_file() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.csv");
        let to = dir.path().join("sub").join("b.csv");
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(&from, "data").unwrap();

        move_file(&from, &to).unwrap();

        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "data");
    }
}
