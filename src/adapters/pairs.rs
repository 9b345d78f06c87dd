use crate::domain::model::IdentifierPair;
use crate::utils::error::{LoadTestError, Result};
use std::path::Path;

/// Reads merchant/terminal pairs from a CSV file. The first row is a header;
/// only the first two columns of each row are used.
pub fn load_pairs<P: AsRef<Path>>(path: P) -> Result<Vec<IdentifierPair>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut pairs = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        match (row.get(0), row.get(1)) {
            (Some(mid), Some(tid)) if !mid.is_empty() && !tid.is_empty() => {
                pairs.push(IdentifierPair::new(mid, tid));
            }
            _ => tracing::warn!("Skipping row {} of {}: {:?}", index + 2, path.display(), row),
        }
    }

    if pairs.is_empty() {
        return Err(LoadTestError::EmptyPairFile {
            path: path.display().to_string(),
        });
    }

    tracing::info!("📂 Loaded {} identifier pair(s) from {}", pairs.len(), path.display());
    Ok(pairs)
}
