use crate::utils::error::{CalcError, Result};
use serde::Serialize;

/// Serializes rows to CSV text. Header names come from the row type's serde field names.
pub fn rows_to_csv<R: Serialize>(rows: &[R]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let bytes = writer.into_inner().map_err(|e| CalcError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| CalcError::ExportError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

/// Joins values with a delimiter, e.g. newline for a text file or ", " for the clipboard.
pub fn join_values<T: ToString>(values: &[T], delimiter: &str) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(delimiter)
}
