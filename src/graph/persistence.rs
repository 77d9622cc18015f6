//! JSON file persistence for graph documents.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde_json::Value;
use tempfile::NamedTempFile;

use super::GraphDocument;
use crate::error::Result;

/// Result of reading a graph file.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// File parsed. `None` means it held an empty object (nothing was built when saved).
    Loaded(Option<GraphDocument>),
    /// File does not exist.
    NotFound,
}

/// Write a graph document as pretty-printed UTF-8 JSON.
///
/// `None` writes `{}`. Each call writes its own uniquely named temp file next
/// to the target and renames it into place, so readers never observe a
/// half-written graph and concurrent saves do not trip over each other.
pub fn save_document(path: &Path, document: Option<&GraphDocument>) -> Result<()> {
    log::info!("Saving knowledge graph to: {}", path.display());

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let data = match document {
        Some(doc) => serde_json::to_string_pretty(doc)?,
        None => serde_json::to_string_pretty(&Value::Object(Default::default()))?,
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data.as_bytes())?;
    tmp.flush()?;
    // On failure the temp file is removed when the returned handle drops.
    tmp.persist(path).map_err(|e| e.error)?;

    log::info!("Knowledge graph saved");
    Ok(())
}

/// Read a graph document. A missing file is reported, not treated as an error.
pub fn load_document(path: &Path) -> Result<LoadOutcome> {
    log::info!("Loading knowledge graph from: {}", path.display());

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("Graph file {} does not exist", path.display());
            return Ok(LoadOutcome::NotFound);
        }
        Err(e) => return Err(e.into()),
    };

    let value: Value = serde_json::from_str(&raw)?;
    if value.as_object().is_some_and(|obj| obj.is_empty()) {
        return Ok(LoadOutcome::Loaded(None));
    }

    let document: GraphDocument = serde_json::from_value(value)?;
    log::info!(
        "Knowledge graph loaded - nodes: {}, edges: {}",
        document.nodes.len(),
        document.edges.len()
    );
    Ok(LoadOutcome::Loaded(Some(document)))
}
