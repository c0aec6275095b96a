// Saved ReportDocument JSON

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use brdiff_core::ReportDocument;

use crate::error::IoError;

pub fn load_document(path: &Path) -> Result<ReportDocument, IoError> {
    let file = File::open(path).map_err(|e| IoError::read(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| IoError::Json {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Pretty-printed, trailing newline.
pub fn save_document(doc: &ReportDocument, path: &Path) -> Result<(), IoError> {
    let file = File::create(path).map_err(|e| IoError::write(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, doc).map_err(|e| IoError::write(path, e))?;
    writeln!(writer).map_err(|e| IoError::write(path, e))?;
    writer.flush().map_err(|e| IoError::write(path, e))?;
    Ok(())
}
