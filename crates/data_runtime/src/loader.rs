//! Data loaders for ability JSON under the workspace `data/` directory.

use crate::ability::AbilityDef;
use crate::catalog::AbilityCatalog;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

fn data_root() -> PathBuf {
    // Prefer top-level workspace `data/` so tests and tools can run from any crate.
    let here = Path::new(env!("CARGO_MANIFEST_DIR"));
    let ws = here.join("../../data");
    if ws.is_dir() { ws } else { here.join("data") }
}

/// Read a raw JSON file under `data/` and return its string.
pub fn read_json(rel: impl AsRef<Path>) -> Result<String> {
    let path = data_root().join(rel);
    let s = fs::read_to_string(&path).with_context(|| format!("read data: {}", path.display()))?;
    Ok(s)
}

/// Load and deserialize a single ability JSON (from `data/abilities/*`).
pub fn load_ability_def(rel: impl AsRef<Path>) -> Result<AbilityDef> {
    let txt = read_json(rel)?;
    let def: AbilityDef = serde_json::from_str(&txt).context("parse ability json")?;
    Ok(def)
}

/// Load every `*.json` under `data/abilities/` into a catalog.
pub fn load_catalog() -> Result<AbilityCatalog> {
    let dir = data_root().join("abilities");
    let mut defs = Vec::new();
    let entries =
        fs::read_dir(&dir).with_context(|| format!("read abilities dir: {}", dir.display()))?;
    for entry in entries {
        let entry = entry.context("read abilities dir entry")?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let txt = fs::read_to_string(&path)
            .with_context(|| format!("read ability: {}", path.display()))?;
        let def: AbilityDef = serde_json::from_str(&txt)
            .with_context(|| format!("parse ability: {}", path.display()))?;
        defs.push(def);
    }
    Ok(AbilityCatalog::from_defs(defs))
}
