// CSV/TSV report reading and normalized-report writing

use std::io::Read;
use std::path::Path;

use crate::error::IoError;
use crate::normalized::OutputRow;

/// Read a delimited file as a dense cell grid. The delimiter is sniffed when
/// not given.
pub fn read_grid(path: &Path, delimiter: Option<u8>) -> Result<Vec<Vec<String>>, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    grid_from_str(&content, delimiter).map_err(|e| IoError::read(path, e))
}

/// Detect the most likely field delimiter by checking consistency across the
/// first few lines.
///
/// Each candidate (tab, semicolon, comma, pipe) is scored by how many lines
/// share the first line's field count, weighted by that count.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        let Some(&target) = counts.iter().max() else {
            continue;
        };
        if target <= 1 {
            continue;
        }
        // Report headers are short; score against the widest line instead
        // of the first one.
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (Windows-1252 exports from Excel).
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::read(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::read(path, e))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn grid_from_str(content: &str, delimiter: u8) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut grid = Vec::new();
    for result in reader.records() {
        let record = result?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

pub fn write_rows(path: &Path, rows: &[OutputRow], delimiter: u8) -> Result<(), IoError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IoError::write(path, e))?;

    for row in rows {
        // A single empty field keeps blank rows from being dropped on re-read.
        if row.cells.is_empty() {
            writer.write_record([""]).map_err(|e| IoError::write(path, e))?;
        } else {
            writer.write_record(&row.cells).map_err(|e| IoError::write(path, e))?;
        }
    }
    writer.flush().map_err(|e| IoError::write(path, e))?;
    Ok(())
}
