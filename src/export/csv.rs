//! Export purchase records to CSV.
//!
//! Output is UTF-8 with BOM for Excel compatibility.

use std::io::Write;
use std::path::Path;

use crate::error::{OrderScanError, Result};
use crate::model::purchase::PurchaseRecord;

/// Export records to a CSV file.
///
/// Columns: Product, Amount, Date. Absent values are written as empty cells.
pub fn export_csv(records: &[PurchaseRecord], output_path: &Path) -> Result<()> {
    let file =
        std::fs::File::create(output_path).map_err(|e| OrderScanError::io(output_path, e))?;
    let mut writer = std::io::BufWriter::new(file);
    write_csv(records, &mut writer).map_err(|e| OrderScanError::io(output_path, e))?;
    writer
        .flush()
        .map_err(|e| OrderScanError::io(output_path, e))?;
    tracing::info!(path = %output_path.display(), records = records.len(), "Wrote CSV");
    Ok(())
}

/// Write the CSV document (BOM, header row, one row per record) to `out`.
pub fn write_csv<W: Write>(records: &[PurchaseRecord], out: &mut W) -> std::io::Result<()> {
    out.write_all(&[0xEF, 0xBB, 0xBF])?;
    writeln!(out, "Product,Amount,Date")?;

    for record in records {
        writeln!(
            out,
            "{},{},{}",
            csv_escape(&record.product_name),
            csv_escape(record.amount.as_deref().unwrap_or("")),
            csv_escape(record.date.as_deref().unwrap_or("")),
        )?;
    }

    Ok(())
}

/// Escape a value for CSV (RFC 4180).
///
/// Wraps in double quotes if the value contains commas, quotes, or newlines.
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
