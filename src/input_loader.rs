use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use log::{info, warn};
use calamine::{Reader, Xlsx, open_workbook};

use crate::error::{EnrichError, Result};

/// A materialized table: a header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl InputTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        InputTable { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Values of the named column in row order. Short rows read as empty cells.
    pub fn column(&self, name: &str) -> Result<Vec<String>> {
        let idx = self
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| EnrichError::UnknownColumn(name.to_string()))?;

        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or_default())
            .collect())
    }
}

pub fn load_table<P: AsRef<Path>>(filename: P) -> Result<InputTable> {
    let path_ref = filename.as_ref();

    if !path_ref.exists() {
        return Err(EnrichError::Input(format!("Input file {:?} does not exist", path_ref)));
    }

    let is_excel = path_ref.extension().map_or(false, |ext| ext == "xlsx" || ext == "xlsm");

    if is_excel {
        return load_excel(path_ref);
    }

    load_csv(File::open(path_ref)?, path_ref)
}

/// Reads CSV with a header row. Cells are trimmed.
pub fn read_csv<R: Read>(reader: R) -> Result<InputTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(EnrichError::Input("CSV has no header row".to_string()));
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        match result {
            Ok(record) => rows.push(record.iter().map(str::to_string).collect()),
            Err(e) => warn!("Skipping unparsable CSV record: {}", e),
        }
    }

    Ok(InputTable::new(headers, rows))
}

fn load_csv<R: Read>(reader: R, path: &Path) -> Result<InputTable> {
    let table = read_csv(reader)?;
    info!("Loaded {} rows from CSV {:?}", table.row_count(), path);
    Ok(table)
}

fn load_excel(path: &Path) -> Result<InputTable> {
    let mut excel: Xlsx<BufReader<File>> = open_workbook(path)
        .map_err(|e| EnrichError::Input(format!("Could not open Excel file: {}", e)))?;

    let worksheets = excel.worksheets();
    let (_name, range) = worksheets
        .first()
        .ok_or_else(|| EnrichError::Input("Excel workbook has no worksheets".to_string()))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => return Err(EnrichError::Input("Excel worksheet is empty".to_string())),
    };

    let rows: Vec<Vec<String>> = rows_iter
        .map(|row| row.iter().map(|c| c.to_string().trim().to_string()).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();

    info!("Loaded {} rows from Excel {:?}", rows.len(), path);
    Ok(InputTable::new(headers, rows))
}
