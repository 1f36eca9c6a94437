//! Component catalog built from a directory of STEP files
//!
//! Every `.stp` / `.step` file below a directory is parsed and classified.
//! Files that cannot be parsed are recorded and skipped; the scan only fails
//! when the directory cannot be walked or holds no STEP files at all.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::parser::{ComponentDescriptor, ComponentKind, parse_step_file};

/// A STEP file that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    /// Path of the file
    pub path: PathBuf,
    /// Why it was skipped
    pub reason: String,
}

/// Classified components keyed by path relative to the scanned directory
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentCatalog {
    /// Components by relative path, with `/` separators (e.g. `hardware/lag.step`)
    pub components: BTreeMap<String, ComponentDescriptor>,
    /// Files that failed to parse
    pub skipped: Vec<SkippedFile>,
}

fn is_step_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("stp") || ext.eq_ignore_ascii_case("step"))
        .unwrap_or(false)
}

/// Catalog key for a file found below `dir`
fn catalog_key(dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(dir).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

impl ComponentCatalog {
    /// Scan a directory tree for STEP files
    ///
    /// # Errors
    /// - [`Error::Walk`] when the directory cannot be traversed
    /// - [`Error::NoStepFiles`] when no `.stp` / `.step` file exists below `dir`
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_file() && is_step_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
        if files.is_empty() {
            return Err(Error::NoStepFiles(dir.display().to_string()));
        }

        let mut catalog = Self::default();
        for path in files {
            let key = catalog_key(dir, &path);
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let parsed = fs::read_to_string(&path)
                .map_err(Error::from)
                .and_then(|text| parse_step_file(&text, &file_name));
            match parsed {
                Ok(info) => {
                    catalog
                        .components
                        .insert(key, ComponentDescriptor::from_info(&info));
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping STEP file");
                    catalog.skipped.push(SkippedFile {
                        path,
                        reason: err.to_string(),
                    });
                }
            }
        }
        info!(
            components = catalog.components.len(),
            skipped = catalog.skipped.len(),
            "built component catalog"
        );
        Ok(catalog)
    }

    /// Number of components of each kind
    pub fn summary(&self) -> BTreeMap<ComponentKind, usize> {
        let mut counts = BTreeMap::new();
        for component in self.components.values() {
            *counts.entry(component.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Look up a component by its path relative to the scanned directory
    pub fn get(&self, key: &str) -> Option<&ComponentDescriptor> {
        self.components.get(key)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a catalog saved with [`ComponentCatalog::to_json`]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_extensions() {
        assert!(is_step_file(Path::new("a/klimp.stp")));
        assert!(is_step_file(Path::new("KLIMP.STEP")));
        assert!(is_step_file(Path::new("part.Step")));
        assert!(!is_step_file(Path::new("part.stl")));
        assert!(!is_step_file(Path::new("stp")));
    }

    #[test]
    fn test_catalog_key_is_relative() {
        let dir = Path::new("parts");
        assert_eq!(catalog_key(dir, &dir.join("klimp.stp")), "klimp.stp");
        assert_eq!(catalog_key(dir, &dir.join("a").join("part.stp")), "a/part.stp");
    }

    #[test]
    fn test_summary_counts_kinds() {
        let info = crate::parser::parse_step(
            "#1=PRODUCT('KLIMP_#4','',' ',(#2)); CARTESIAN_POINT('',(0,0,0)) CARTESIAN_POINT('',(1,1,1))",
        )
        .unwrap();
        let mut catalog = ComponentCatalog::default();
        let klimp = ComponentDescriptor::from_info(&info);
        catalog.components.insert("a.stp".to_string(), klimp.clone());
        catalog.components.insert("b.stp".to_string(), klimp);
        let summary = catalog.summary();
        assert_eq!(summary.get(&ComponentKind::Klimp), Some(&2));
        assert_eq!(summary.get(&ComponentKind::Fastener), None);
    }
}
