use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bnk::DecodeOptions;
use serde::Deserialize;

/// Batch replacement job read from JSON.
///
/// ```json
/// {
///   "source": "Init.bnk",
///   "output": "out/Init.bnk",
///   "replacements": [{ "id": 12345, "file": "voice.wem" }],
///   "options": { "pad_odd_data_chunk": true }
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PatchManifest {
    pub source: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub replacements: Vec<Replacement>,
    #[serde(default)]
    pub options: DecodeOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Replacement {
    pub id: u32,
    pub file: PathBuf,
}

/// Load a manifest and resolve its relative paths against the manifest's
/// own directory.
pub fn load_manifest(path: &Path) -> Result<PatchManifest> {
    let file = File::open(path)
        .with_context(|| format!("failed to open manifest: {}", path.display()))?;
    let mut manifest: PatchManifest = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse manifest: {}", path.display()))?;

    let path = path
        .canonicalize()
        .with_context(|| format!("failed to resolve manifest path: {}", path.display()))?;
    if let Some(base) = path.parent() {
        manifest.source = rebase(base, manifest.source);
        manifest.output = rebase(base, manifest.output);
        for r in &mut manifest.replacements {
            r.file = rebase(base, std::mem::take(&mut r.file));
        }
    }

    Ok(manifest)
}

fn rebase(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path
    }
}
