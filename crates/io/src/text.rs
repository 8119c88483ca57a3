// Source file reading

use std::path::Path;

use crate::error::{Error, Result};

/// Read a delimited source file as text.
///
/// Tries UTF-8 first and falls back to Windows-1252, the usual encoding of
/// spreadsheet-exported CSVs.
pub fn read_file_as_utf8(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            tracing::warn!(path = %path.display(), "file is not UTF-8, decoded as Windows-1252");
            Ok(decoded.into_owned())
        }
    }
}
