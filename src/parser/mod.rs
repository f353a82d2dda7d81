//! Message loaders: Gmail API JSON dumps and `.eml` files.

pub mod eml;
pub mod json;

use std::path::{Path, PathBuf};

use crate::error::{OrderScanError, Result};
use crate::model::message::RawMessage;

/// Kind of input file, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Json,
    Eml,
}

impl InputKind {
    pub fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "eml" => Some(Self::Eml),
            _ => None,
        }
    }
}

/// Expand `paths` into the list of message files to load.
///
/// Directories contribute their `.json`/`.eml` entries (not recursive), sorted
/// by name. Files must have one of those extensions.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(path)
                .map_err(|e| OrderScanError::io(path, e))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && InputKind::of(p).is_some())
                .collect();
            found.sort();
            tracing::debug!(dir = %path.display(), files = found.len(), "Expanded input directory");
            files.extend(found);
        } else if !path.exists() {
            return Err(OrderScanError::FileNotFound(path.clone()));
        } else if InputKind::of(path).is_none() {
            return Err(OrderScanError::UnsupportedInput(path.clone()));
        } else {
            files.push(path.clone());
        }
    }

    Ok(files)
}

/// Load all messages stored in `path`.
pub fn load_path(path: &Path) -> Result<Vec<RawMessage>> {
    match InputKind::of(path) {
        Some(InputKind::Json) => json::load_messages(path),
        Some(InputKind::Eml) => eml::load_eml(path).map(|m| vec![m]),
        None => Err(OrderScanError::UnsupportedInput(path.to_path_buf())),
    }
}
