// projeto: lstmsocdata
// file: src/battery/source.rs
// Row sources for raw discharge logs (CSV files from the cycler, or memory)

use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use crate::battery::utils::DataError;

/// Column order of the cycler export, after the metadata block.
pub const COLUMNS: [&str; 15] = [
    "Time Stamp", "Step", "Status", "Prog Time", "Step Time", "Cycle",
    "Cycle Level", "Procedure", "Voltage", "Current", "Temperature", "Capacity",
    "WhAccu", "Cnt", "Empty",
];

/// One row of a cycle log. Numeric columns are `None` when the cell is
/// empty or not a number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub time_stamp: String,
    pub step: Option<f64>,
    pub status: String,
    pub prog_time: String,
    pub step_time: String,
    pub cycle: Option<f64>,
    pub cycle_level: Option<f64>,
    pub procedure: String,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
    pub temperature: Option<f64>,
    pub capacity: Option<f64>,
    pub wh_accu: Option<f64>,
    pub cnt: Option<f64>,
}

impl RawRow {
    /// Builds a row carrying only the columns the extractor reads.
    pub fn measurement(
        status: &str,
        prog_time: &str,
        voltage: Option<f64>,
        current: Option<f64>,
        temperature: Option<f64>,
        capacity: Option<f64>,
    ) -> Self {
        RawRow {
            status: status.to_string(),
            prog_time: prog_time.to_string(),
            voltage,
            current,
            temperature,
            capacity,
            ..Default::default()
        }
    }

    pub fn from_record(record: &StringRecord) -> Self {
        let text = |i: usize| record.get(i).map(|s| s.trim().to_string()).unwrap_or_default();
        let number = |i: usize| record.get(i).and_then(parse_number);

        RawRow {
            time_stamp: text(0),
            step: number(1),
            status: text(2),
            prog_time: text(3),
            step_time: text(4),
            cycle: number(5),
            cycle_level: number(6),
            procedure: text(7),
            voltage: number(8),
            current: number(9),
            temperature: number(10),
            capacity: number(11),
            wh_accu: number(12),
            cnt: number(13),
        }
    }
}

fn parse_number(field: &str) -> Option<f64> {
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Anything that can resolve a cycle name to its rows.
pub trait CycleSource: Sync {
    fn read_rows(&self, name: &str) -> Result<Vec<RawRow>, DataError>;
}

/// Reads `<base_path>/<name>.csv`, skipping the metadata block and the
/// column header line that follows it.
#[derive(Debug, Clone)]
pub struct CsvCycleSource {
    base_path: PathBuf,
    header_lines: usize,
}

impl CsvCycleSource {
    pub fn new(base_path: impl Into<PathBuf>, header_lines: usize) -> Self {
        CsvCycleSource {
            base_path: base_path.into(),
            header_lines,
        }
    }

    pub fn cycle_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", name))
    }

    fn read_path(&self, path: &Path) -> Result<Vec<RawRow>, DataError> {
        let file = File::open(path).map_err(|e| {
            DataError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })?;
        let mut reader = BufReader::new(file);

        // metadata block + column header
        let mut skipped = String::new();
        for _ in 0..=self.header_lines {
            skipped.clear();
            if reader.read_line(&mut skipped)? == 0 {
                break;
            }
        }

        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            if record.len() < 12 {
                debug!("Short record in {}: {:?}", path.display(), record);
            }
            rows.push(RawRow::from_record(&record));
        }

        info!("Read {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }
}

impl CycleSource for CsvCycleSource {
    fn read_rows(&self, name: &str) -> Result<Vec<RawRow>, DataError> {
        self.read_path(&self.cycle_path(name))
    }
}

/// Cycles already held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryCycleSource {
    cycles: HashMap<String, Vec<RawRow>>,
}

impl MemoryCycleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, rows: Vec<RawRow>) {
        self.cycles.insert(name.into(), rows);
    }

    pub fn with_cycle(mut self, name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        self.insert(name, rows);
        self
    }
}

impl CycleSource for MemoryCycleSource {
    fn read_rows(&self, name: &str) -> Result<Vec<RawRow>, DataError> {
        self.cycles.get(name).cloned().ok_or_else(|| {
            DataError::Io(std::io::Error::new(
                ErrorKind::NotFound,
                format!("cycle '{}' not found", name),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_log(dir: &Path, name: &str, header_lines: usize, body: &str) {
        let mut file = File::create(dir.join(format!("{}.csv", name))).unwrap();
        for i in 0..header_lines {
            writeln!(file, "Metadata line {},\"with, commas\"", i).unwrap();
        }
        writeln!(file, "{}", COLUMNS.join(",")).unwrap();
        write!(file, "{}", body).unwrap();
    }

    #[test]
    fn test_csv_source_skips_metadata_and_header() {
        let dir = std::env::temp_dir().join(format!("lstmsocdata_source_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let body = "\
1/1/2020 10:00,1,TABLE,0:00:00.000000,0:00:00,1,0,P1,4.1,-1.5,25.0,0.0,0.0,1,
1/1/2020 10:00,1,DCH,0:00:00.100000,0:00:00,1,0,P1,4.0,-1.5,25.1,-0.01,-0.04,1,
1/1/2020 10:00,2,PAU,0:00:00.200000,0:00:00,1,0,P1,,0.0,25.2,-0.01,-0.04,1,
";
        write_log(&dir, "cycle_a", 3, body);

        let source = CsvCycleSource::new(&dir, 3);
        let rows = source.read_rows("cycle_a").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].status, "TABLE");
        assert_eq!(rows[1].prog_time, "0:00:00.100000");
        assert_eq!(rows[1].voltage, Some(4.0));
        assert_eq!(rows[1].capacity, Some(-0.01));
        assert_eq!(rows[2].voltage, None);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = CsvCycleSource::new("/nonexistent/lstmsocdata", 30);
        assert!(matches!(source.read_rows("nope"), Err(DataError::Io(_))));
    }

    #[test]
    fn test_memory_source() {
        let rows = vec![RawRow::measurement("DCH", "0:00:00.0", Some(4.0), Some(-1.0), Some(25.0), Some(0.0))];
        let source = MemoryCycleSource::new().with_cycle("c1", rows.clone());
        assert_eq!(source.read_rows("c1").unwrap(), rows);
        assert!(source.read_rows("c2").is_err());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 4.25 "), Some(4.25));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("abc"), None);
    }
}
