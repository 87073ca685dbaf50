//! Parameter file persistence.
//!
//! Parameter trees are stored as TOML, one file per configuration. The file
//! stem becomes the configuration's display name, both on load and after a
//! save-as.

use crate::error::{AppResult, ScopeError};
use crate::parameter::ParameterTree;
use std::fs;
use std::path::Path;

/// The parameter-file extension convention, used by the file choosers.
pub const PARAMETER_FILE_EXTENSION: &str = "toml";

/// The stem of a parameter file path, used as the configuration name.
pub fn config_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Load a parameter tree from a file. The display name is taken from the
/// file stem.
pub fn load_tree(path: &Path) -> AppResult<ParameterTree> {
    let text = fs::read_to_string(path)?;
    let mut tree: ParameterTree =
        toml::from_str(&text).map_err(|e| ScopeError::ParseTree(e.to_string()))?;
    tree.set_display_name(config_name(path));
    Ok(tree)
}

/// Persist a parameter tree to a file.
pub fn save_tree(tree: &ParameterTree, path: &Path) -> AppResult<()> {
    let text = toml::to_string_pretty(tree).map_err(|e| ScopeError::ParseTree(e.to_string()))?;
    fs::write(path, text)?;
    Ok(())
}
