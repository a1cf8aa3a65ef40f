//! Configuration management for Spyglass.
//!
//! Provides XDG-compliant settings storage and indicator catalog discovery.

mod settings;

pub use settings::{AppSettings, Paths};

use crate::catalog::default_search_paths;
use std::path::{Path, PathBuf};

/// Catalog locations to try, most specific first.
///
/// An explicit path is the only candidate when given. Otherwise the settings
/// path comes first, then `./indicators.yaml`, then the configuration
/// directory.
pub fn catalog_candidates(
    explicit: Option<&Path>,
    settings: &AppSettings,
    paths: Option<&Paths>,
) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }

    let mut candidates = Vec::new();
    if let Some(path) = &settings.catalog_path {
        candidates.push(path.clone());
    }
    candidates.extend(default_search_paths(paths.map(|p| p.config_dir.as_path())));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_catalog_wins() {
        let settings = AppSettings {
            catalog_path: Some(PathBuf::from("from-settings.yaml")),
            ..AppSettings::default()
        };
        let candidates = catalog_candidates(Some(Path::new("cli.yaml")), &settings, None);
        assert_eq!(candidates, vec![PathBuf::from("cli.yaml")]);
    }

    #[test]
    fn test_search_order() {
        let settings = AppSettings {
            catalog_path: Some(PathBuf::from("from-settings.yaml")),
            ..AppSettings::default()
        };
        let paths = Paths::in_dir("/cfg/spyglass");
        let candidates = catalog_candidates(None, &settings, Some(&paths));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("from-settings.yaml"),
                PathBuf::from("indicators.yaml"),
                PathBuf::from("/cfg/spyglass/indicators.yaml"),
            ]
        );
    }
}
