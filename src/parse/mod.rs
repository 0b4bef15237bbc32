mod node;
mod outline;

use anyhow::{Context, Result};
use std::path::Path;

pub use node::*;
pub use outline::parse_outline;

/// Loads the outline log at the given path into a tree whose depth-1 nodes are days and whose
/// depth-2 nodes are the clocked items. A missing or unreadable file is a fatal error.
pub fn load_outline(path: &Path) -> Result<OutlineNode> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read outline log at {}", path.display()))?;
    Ok(parse_outline(&contents))
}
