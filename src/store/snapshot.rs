use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::models::ExploredIndex;
use crate::store::StoreError;

/// Write the explored-address map for one run, timestamped at completion.
/// Returns the path of the file that was written.
pub fn write_snapshot(dir: &Path, explored: &ExploredIndex) -> Result<PathBuf, StoreError> {
    let stamp = Local::now().format("%Y%m%d%H%M");
    let path = dir.join(format!("explored_nodes_dict_{}.json", stamp));
    let body = serde_json::to_vec_pretty(explored)?;
    fs::write(&path, body).map_err(|e| StoreError::Io {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

pub fn read_snapshot(path: &Path) -> Result<ExploredIndex, StoreError> {
    let contents = fs::read_to_string(path).map_err(|e| StoreError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_str(&contents)?)
}
