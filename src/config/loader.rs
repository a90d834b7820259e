use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Loads the controller config, refusing files outside `root`.
///
/// Relative paths are resolved against `root`, which defaults to the current
/// working directory.
///
/// # Errors
///
/// Returns an error when the root cannot be resolved, the file lies outside
/// the root, or the file cannot be read or parsed.
pub fn load_config(path: &Path, root: Option<&Path>) -> AppResult<ConfigFile> {
    let root = match root {
        Some(root) => root.to_path_buf(),
        None => std::env::current_dir().map_err(|err| {
            AppError::config(ConfigError::ResolveRoot {
                path: PathBuf::from("."),
                source: err,
            })
        })?,
    };
    let resolved = confine_to_root(path, &root)?;
    load_config_file(&resolved)
}

fn confine_to_root(path: &Path, root: &Path) -> AppResult<PathBuf> {
    let root = root.canonicalize().map_err(|err| {
        AppError::config(ConfigError::ResolveRoot {
            path: root.to_path_buf(),
            source: err,
        })
    })?;
    let candidate = root.join(path);
    let resolved = candidate.canonicalize().map_err(|err| {
        AppError::config(ConfigError::ReadConfig {
            path: candidate.clone(),
            source: err,
        })
    })?;
    if !resolved.starts_with(&root) {
        return Err(AppError::config(ConfigError::OutsideConfigRoot {
            path: resolved,
            root,
        }));
    }
    Ok(resolved)
}

/// Parses a config file by extension, without any location check.
///
/// # Errors
///
/// Returns an error when the file cannot be read, has an unsupported
/// extension, or fails to parse.
pub fn load_config_file(path: &Path) -> AppResult<ConfigFile> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseYaml {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some("toml") => toml::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseToml {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some("json") => serde_json::from_str(&content).map_err(|err| {
            AppError::config(ConfigError::ParseJson {
                path: path.to_path_buf(),
                source: err,
            })
        }),
        Some(ext) => Err(AppError::config(ConfigError::UnsupportedExtension {
            ext: ext.to_owned(),
        })),
        None => Err(AppError::config(ConfigError::MissingExtension)),
    }
}
