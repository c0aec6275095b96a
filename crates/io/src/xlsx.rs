// Excel/ODS report reading and normalized-report writing

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

use brdiff_core::columns::{DESCRIPTION_COL, FIRST_VALUE_COL};

use crate::error::IoError;
use crate::normalized::{OutputRow, RowStyle};

/// Read one worksheet (the first when `sheet` is `None`) as a dense cell grid
/// anchored at A1.
pub fn read_grid(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<String>>, IoError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IoError::read(path, e))?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();

    let name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|n| n.as_str() == name)
            .cloned()
            .ok_or_else(|| IoError::SheetNotFound {
                path: path.to_path_buf(),
                name: name.to_string(),
                available: sheet_names.clone(),
            })?,
        None => sheet_names.first().cloned().ok_or_else(|| IoError::NoSheets {
            path: path.to_path_buf(),
        })?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| IoError::read(path, format!("sheet '{name}': {e}")))?;

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut grid: Vec<Vec<String>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); start_col as usize];
        cells.extend(row.iter().map(cell_to_string));
        grid.push(cells);
    }
    log::debug!("{}: read {} row(s) from sheet '{name}'", path.display(), grid.len());
    Ok(grid)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("#{:?}", e),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Write the normalized rows to a single-sheet workbook. Total rows are bold;
/// value columns are written as numbers.
pub fn write_rows(path: &Path, rows: &[OutputRow], sheet_name: &str) -> Result<(), IoError> {
    let mut workbook = XlsxWorkbook::new();
    let bold = Format::new().set_bold();
    let plain = Format::new();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(|e| IoError::write(path, e))?;
    worksheet
        .set_column_width(DESCRIPTION_COL as u16, 36)
        .map_err(|e| IoError::write(path, e))?;

    for (r, row) in rows.iter().enumerate() {
        let format = if row.style == RowStyle::Total { &bold } else { &plain };
        for (c, value) in row.cells.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let (r, c) = (r as u32, c as u16);
            let numeric = row.style != RowStyle::Header && c as usize >= FIRST_VALUE_COL;
            match value.parse::<f64>() {
                Ok(n) if numeric => worksheet.write_number_with_format(r, c, n, format),
                _ => worksheet.write_string_with_format(r, c, value, format),
            }
            .map_err(|e| IoError::write(path, e))?;
        }
    }

    workbook.save(path).map_err(|e| IoError::write(path, e))?;
    Ok(())
}
