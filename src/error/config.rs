use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to resolve config root '{path}': {source}")]
    ResolveRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Access to config '{path}' is not allowed (outside '{root}').")]
    OutsideConfigRoot { path: PathBuf, root: PathBuf },
    #[error("Failed to parse TOML config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to parse JSON config '{path}': {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to parse YAML config '{path}': {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Unsupported config extension '{ext}'. Use .yaml, .yml, .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Config file must have a .yaml, .yml, .toml or .json extension.")]
    MissingExtension,
    #[error("Config must list at least one worker.")]
    NoWorkers,
    #[error("Invalid worker URL '{url}': {source}")]
    InvalidWorkerUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Worker URL '{url}' must use http or https.")]
    UnsupportedWorkerScheme { url: String },
    #[error("Config '{field}' must be >= 1.")]
    FieldMustBePositive { field: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
