use std::path::Path;

use anyhow::{Context, Result};

use fpa_core::pipeline::EstimateInput;

/// Load an estimate input file. `.json` files are read as JSON, everything else as TOML.
pub fn load_input(path: &Path) -> Result<EstimateInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read estimate file '{}'", path.display()))?;

    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let input = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse '{}' as JSON", path.display()))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("failed to parse '{}' as TOML", path.display()))?
    };
    Ok(input)
}
