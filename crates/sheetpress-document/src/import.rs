// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spreadsheet import — first sheet of an xlsx/xls/xlsb/ods workbook, read with
// `calamine`, turned into a `Dataset`.
//
// The first row of the sheet names the columns. Header cells are normalised
// into valid, unique field names:
//   - blank cells become `__EMPTY`, `__EMPTY_1`, ...
//   - repeated names get `_1`, `_2`, ... appended
//   - control characters are replaced by spaces
// Each data row keeps only its non-empty cells; rows with no cells at all are
// dropped.

use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use sheetpress_core::error::{Result, SheetpressError};
use sheetpress_core::{CellValue, Dataset, FieldName, Row};
use tracing::{debug, info, instrument};

const BLANK_HEADER: &str = "__EMPTY";

/// Read the first sheet of a workbook held in memory.
#[instrument(skip_all, fields(bytes_len = bytes.len()))]
pub fn import_spreadsheet(bytes: &[u8]) -> Result<Dataset> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| SheetpressError::ImportFormat(format!("failed to open workbook: {e}")))?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SheetpressError::ImportFormat("workbook has no sheets".into()))?;

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| SheetpressError::ImportFormat(format!("sheet {first:?} unreadable: {e}")))?;

    let dataset = dataset_from_range(&range)?;
    info!(
        sheet = %first,
        rows = dataset.rows().len(),
        columns = dataset.headers().len(),
        "Spreadsheet imported"
    );
    Ok(dataset)
}

/// Read a workbook from disk. The format is detected from the content.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn import_file(path: impl AsRef<Path>) -> Result<Dataset> {
    let bytes = std::fs::read(path.as_ref())?;
    import_spreadsheet(&bytes)
}

/// Build a dataset from a sheet's used range.
pub fn dataset_from_range(range: &Range<Data>) -> Result<Dataset> {
    let mut rows = range.rows();
    let Some(header_cells) = rows.next() else {
        debug!("sheet is empty");
        return Ok(Dataset::default());
    };
    let columns = header_names(header_cells)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for cells in rows {
        let mut record = Row::new();
        for (name, cell) in columns.iter().zip(cells) {
            let value = cell_value(cell);
            if !value.is_empty() {
                record = record.with(name.clone(), value);
            }
        }
        if record.is_empty() {
            skipped += 1;
        } else {
            records.push(record);
        }
    }

    debug!(records = records.len(), skipped, "data rows read");
    Ok(Dataset::from_rows(records))
}

/// Convert a cell to the value stored in a row.
///
/// Dates keep their spreadsheet serial number; error cells keep their code
/// (`#N/A`, `#DIV/0!`, ...) as text.
pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

fn header_names(cells: &[Data]) -> Result<Vec<FieldName>> {
    let mut used: HashSet<String> = HashSet::new();
    let mut blanks = 0usize;
    let mut names = Vec::with_capacity(cells.len());

    for cell in cells {
        let text: String = cell_value(cell)
            .to_string()
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();

        let base = if text.trim().is_empty() {
            let base = match blanks {
                0 => BLANK_HEADER.to_owned(),
                n => format!("{BLANK_HEADER}_{n}"),
            };
            blanks += 1;
            base
        } else {
            text
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while used.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        used.insert(candidate.clone());
        names.push(FieldName::new(candidate)?);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(cells: &[&[Data]]) -> Range<Data> {
        let height = cells.len() as u32;
        let width = cells.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height.saturating_sub(1), width.saturating_sub(1)));
        for (r, row) in cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn s(v: &str) -> Data {
        Data::String(v.to_owned())
    }

    fn names(dataset: &Dataset) -> Vec<&str> {
        dataset.headers().iter().map(FieldName::as_str).collect()
    }

    #[test]
    fn header_row_names_the_fields() {
        let range = grid(&[
            &[s("name"), s("barcode")],
            &[s("Alice"), Data::Int(12345)],
            &[s("Bob"), Data::Float(678.0)],
        ]);
        let dataset = dataset_from_range(&range).expect("dataset");

        assert_eq!(names(&dataset), vec!["name", "barcode"]);
        assert_eq!(dataset.rows().len(), 2);
        let barcode = FieldName::new("barcode").expect("name");
        assert_eq!(
            dataset.rows()[0].get(&barcode).map(ToString::to_string),
            Some("12345".to_string())
        );
    }

    #[test]
    fn blank_and_duplicate_headers_are_made_unique() {
        let range = grid(&[
            &[s("a"), Data::Empty, s("a"), s(""), s("a"), s("line\nbreak")],
            &[s("1"), s("2"), s("3"), s("4"), s("5"), s("6")],
        ]);
        let dataset = dataset_from_range(&range).expect("dataset");
        assert_eq!(
            names(&dataset),
            vec!["a", "__EMPTY", "a_1", "__EMPTY_1", "a_2", "line break"]
        );
    }

    #[test]
    fn empty_cells_are_left_out_and_empty_rows_dropped() {
        let range = grid(&[
            &[s("name"), s("city")],
            &[Data::Empty, Data::Empty],
            &[s("Carol"), Data::Empty],
            &[s("Dan"), s("Rome")],
        ]);
        let dataset = dataset_from_range(&range).expect("dataset");
        assert_eq!(dataset.rows().len(), 2);
        assert_eq!(dataset.rows()[0].len(), 1);
        // Headers follow the first record, which has no city.
        assert_eq!(names(&dataset), vec!["name"]);
    }

    #[test]
    fn header_only_sheet_is_not_ready() {
        let range = grid(&[&[s("name")]]);
        let dataset = dataset_from_range(&range).expect("dataset");
        assert!(!dataset.is_ready());
    }

    #[test]
    fn cell_values_keep_their_kind() {
        assert_eq!(cell_value(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(cell_value(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
        assert_eq!(
            cell_value(&Data::DateTimeIso("2024-01-02".into())),
            CellValue::Text("2024-01-02".into())
        );
    }

    #[test]
    fn garbage_bytes_are_an_import_error() {
        assert!(matches!(
            import_spreadsheet(b"name,barcode\nAlice,1"),
            Err(SheetpressError::ImportFormat(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            import_file(dir.path().join("absent.xlsx")),
            Err(SheetpressError::Io(_))
        ));
    }
}
