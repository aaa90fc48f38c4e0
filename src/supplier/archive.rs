//! In-memory extraction of the supplier's zipped stock file.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::{Result, SyncError};

/// Upper bound on the buffer reserved up front from an entry's declared size
const MAX_PREALLOCATION: u64 = 16 * 1024 * 1024;

fn initial_capacity(declared_size: u64) -> usize {
    usize::try_from(declared_size.min(MAX_PREALLOCATION)).unwrap_or(0)
}

/// Returns the bytes of the first `.xls` entry in a zip archive.
pub fn extract_workbook(archive_bytes: &[u8]) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes))?;
    log::debug!("Supplier archive holds {} entries", archive.len());

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_file() && entry.name().to_lowercase().ends_with(".xls") {
            log::info!("Extracting {} ({} bytes)", entry.name(), entry.size());
            let mut workbook = Vec::with_capacity(initial_capacity(entry.size()));
            entry.read_to_end(&mut workbook)?;
            return Ok(workbook);
        }
    }

    Err(SyncError::Feed(
        "archive contains no .xls workbook".to_string(),
    ))
}
