use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

/// File name of the configuration inside the data directory
pub const CONFIG_FILE: &str = "config.toml";
/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "POMO_DIR";

/// Error type for configuration I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not parse config.toml: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("could not parse config.toml: {0}")]
    DocumentError(#[from] toml_edit::TomlError),
    #[error("invalid config key \"{0}\" (expected <table>.<key>, e.g. board.bucketing)")]
    InvalidKey(String),
    #[error("no data directory: pass --data-dir or set POMO_DIR")]
    NoDataDir,
}

/// Where tasks, config and logs live: the `--data-dir` flag, then
/// `$POMO_DIR`, then the platform data directory.
pub fn resolve_data_dir(flag: Option<&str>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = flag {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(dir) = std::env::var(DATA_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|d| d.join("pomolist"))
        .ok_or(ConfigError::NoDataDir)
}

/// Read the config, returning both the parsed config and the raw
/// toml_edit document for layout-preserving edits. A missing file yields
/// defaults and an empty document.
pub fn read_config(data_dir: &Path) -> Result<(AppConfig, toml_edit::DocumentMut), ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);
    let text = match fs::read_to_string(&config_path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: config_path,
                source: e,
            });
        }
    };
    let config: AppConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Load only the parsed config.
pub fn load_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    read_config(data_dir).map(|(config, _)| config)
}

/// Write the document back to disk, preserving formatting.
pub fn write_config(data_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let config_path = data_dir.join(CONFIG_FILE);
    fs::write(&config_path, doc.to_string()).map_err(|e| ConfigError::WriteError {
        path: config_path,
        source: e,
    })
}

/// Set `table.key` to `raw`, interpreting booleans and numbers. The edited
/// document must still deserialize into an [`AppConfig`]; the validated config
/// is returned.
pub fn set_value(
    doc: &mut toml_edit::DocumentMut,
    dotted_key: &str,
    raw: &str,
) -> Result<AppConfig, ConfigError> {
    let (table, key) = dotted_key
        .split_once('.')
        .filter(|(t, k)| !t.is_empty() && !k.is_empty() && !k.contains('.'))
        .ok_or_else(|| ConfigError::InvalidKey(dotted_key.to_string()))?;

    if !doc.contains_key(table) {
        doc[table] = toml_edit::Item::Table(toml_edit::Table::new());
    } else if !doc[table].is_table_like() {
        return Err(ConfigError::InvalidKey(dotted_key.to_string()));
    }
    doc[table][key] = parse_scalar(raw);

    let config: AppConfig = toml::from_str(&doc.to_string())?;
    Ok(config)
}

fn parse_scalar(raw: &str) -> toml_edit::Item {
    if let Ok(b) = raw.parse::<bool>() {
        toml_edit::value(b)
    } else if let Ok(i) = raw.parse::<i64>() {
        toml_edit::value(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        toml_edit::value(f)
    } else {
        toml_edit::value(raw)
    }
}
