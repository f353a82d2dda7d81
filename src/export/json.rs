//! Export purchase records as a JSON array.

use std::path::Path;

use crate::error::{OrderScanError, Result};
use crate::model::purchase::PurchaseRecord;

/// Write `records` to `output_path` as a pretty-printed JSON array.
pub fn export_json(records: &[PurchaseRecord], output_path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(records)
        .map_err(|e| OrderScanError::Export(format!("serializing records: {e}")))?;
    std::fs::write(output_path, text + "\n").map_err(|e| OrderScanError::io(output_path, e))?;
    tracing::info!(path = %output_path.display(), records = records.len(), "Wrote JSON");
    Ok(())
}
