//! Parsing of the supplier stock spreadsheet.

use std::io::Cursor;

use calamine::{Data, Reader, Xls};
use log::{debug, info};

use super::SupplierRecord;
use crate::error::{Result, SyncError};

/// Column holding the supplier code (marketplace offer id)
pub const CODE_COLUMN: &str = "Код";
/// Column holding the stock bucket
pub const QUANTITY_COLUMN: &str = "Количество";
/// Column holding the retail price
pub const PRICE_COLUMN: &str = "Цена";

/// Reads supplier records from the first sheet of an `.xls` workbook.
pub fn records_from_workbook(bytes: Vec<u8>) -> Result<Vec<SupplierRecord>> {
    let mut workbook: Xls<Cursor<Vec<u8>>> = Xls::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SyncError::Feed("workbook has no worksheets".to_string()))??;

    debug!("Supplier sheet size: {:?}", range.get_size());

    let rows = range
        .rows()
        .map(|row| row.iter().map(render_cell).collect::<Vec<String>>());
    records_from_rows(rows)
}

/// Turns already-rendered sheet rows into supplier records.
///
/// The preamble above the table is skipped: the header is the first row
/// with a `Код` cell. Data rows with an empty code are ignored.
pub fn records_from_rows<I>(rows: I) -> Result<Vec<SupplierRecord>>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut rows = rows.into_iter();

    let header = rows
        .by_ref()
        .find(|row| row.iter().any(|cell| cell == CODE_COLUMN))
        .ok_or_else(|| SyncError::Feed(format!("no header row with a '{CODE_COLUMN}' column")))?;

    let column = |title: &str| {
        header
            .iter()
            .position(|cell| cell == title)
            .ok_or_else(|| SyncError::Feed(format!("header row has no '{title}' column")))
    };
    let code_idx = column(CODE_COLUMN)?;
    let quantity_idx = column(QUANTITY_COLUMN)?;
    let price_idx = column(PRICE_COLUMN)?;

    fn cell(row: &[String], idx: usize) -> String {
        row.get(idx).cloned().unwrap_or_default()
    }

    let records: Vec<SupplierRecord> = rows
        .filter(|row| !cell(row, code_idx).is_empty())
        .map(|row| SupplierRecord {
            code: cell(&row, code_idx),
            quantity: cell(&row, quantity_idx),
            price: cell(&row, price_idx),
        })
        .collect();

    info!("Parsed {} supplier records", records.len());
    Ok(records)
}

/// Renders a cell the way the supplier typed it.
///
/// Whole numbers stored as floats lose their `.0`, so a quantity of `5`
/// reads as `"5"` and a numeric code as `"120044"`.
pub(crate) fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}
