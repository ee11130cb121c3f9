//! YAML config load/create with generated per-field comments.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid yaml at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("validation error: {0}")]
    Validation(String),
}

/// Comment text emitted above a field in the generated config file.
#[derive(Debug, Clone, Copy)]
pub struct FieldHelp {
    pub name: &'static str,
    pub help: &'static str,
}

pub trait ConfigSchema: Serialize + DeserializeOwned + Default {
    const FILE_NAME: &'static str;
    fn fields() -> &'static [FieldHelp];
}

/// Load the config file, creating a commented default one when absent.
///
/// `base_dir` overrides where the file lives (for `--data-dir`); otherwise the
/// current directory is used. Unknown or missing user fields are merged over
/// the defaults, and the file is rewritten when fields were missing so newly
/// added options become visible.
pub fn load_or_create<T: ConfigSchema>(base_dir: Option<&Path>) -> Result<T, ConfigError> {
    let path = match base_dir {
        Some(base) => base.join(T::FILE_NAME),
        None => PathBuf::from(T::FILE_NAME),
    };
    ensure_parent(&path)?;

    if !path.exists() {
        let defaults = T::default();
        write_with_comments(&defaults, &path)?;
        return Ok(defaults);
    }

    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let user: Value = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;

    let mut merged = serde_yaml::to_value(T::default())
        .map_err(|err| ConfigError::Validation(err.to_string()))?;
    let incomplete = missing_any_field::<T>(&user);
    merge_over_defaults(&mut merged, user);

    let config: T =
        serde_yaml::from_value(merged).map_err(|err| ConfigError::Validation(err.to_string()))?;

    if incomplete {
        write_with_comments(&config, &path)?;
    }

    Ok(config)
}

pub fn write_with_comments<T: ConfigSchema>(config: &T, path: &Path) -> Result<(), ConfigError> {
    ensure_parent(path)?;
    let yaml = render_with_comments(config)?;
    fs::write(path, yaml).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn render_with_comments<T: ConfigSchema>(config: &T) -> Result<String, ConfigError> {
    let value =
        serde_yaml::to_value(config).map_err(|err| ConfigError::Validation(err.to_string()))?;
    let Value::Mapping(mapping) = value else {
        return Err(ConfigError::Validation(
            "config must serialize to a mapping".to_string(),
        ));
    };

    let mut out = String::new();
    for field in T::fields() {
        if !field.help.is_empty() {
            out.push_str("# ");
            out.push_str(&field.help.replace('\n', "\n# "));
            out.push('\n');
        }
        let key = Value::String(field.name.to_string());
        let val = mapping.get(&key).cloned().unwrap_or(Value::Null);
        let line = serde_yaml::to_string(&serde_yaml::Mapping::from_iter([(key, val)]))
            .map_err(|err| ConfigError::Validation(err.to_string()))?;
        out.push_str(line.trim());
        out.push('\n');
    }
    Ok(out)
}

fn missing_any_field<T: ConfigSchema>(user: &Value) -> bool {
    let Value::Mapping(map) = user else {
        return true;
    };
    T::fields()
        .iter()
        .any(|f| !map.contains_key(Value::String(f.name.to_string())))
}

fn merge_over_defaults(defaults: &mut Value, user: Value) {
    match (defaults, user) {
        (Value::Mapping(dest), Value::Mapping(src)) => {
            for (key, val) in src {
                match dest.get_mut(&key) {
                    Some(slot) => merge_over_defaults(slot, val),
                    None => {
                        dest.insert(key, val);
                    }
                }
            }
        }
        (dest, other) => *dest = other,
    }
}

fn ensure_parent(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_system::context::Config;

    #[test]
    fn creates_commented_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config: Config = load_or_create(Some(dir.path())).unwrap();
        assert_eq!(config, Config::default());

        let raw = fs::read_to_string(dir.path().join(Config::FILE_NAME)).unwrap();
        assert!(raw.contains("save_path:"));
        assert!(raw.lines().any(|l| l.starts_with("# ")));
    }

    #[test]
    fn user_values_survive_merge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(Config::FILE_NAME);
        // Partial file: only one field set, the rest should fall back to defaults.
        fs::write(&path, "save_path: /tmp/elsewhere\n").unwrap();

        let config: Config = load_or_create(Some(dir.path())).unwrap();
        assert_eq!(config.save_path, "/tmp/elsewhere");
        assert_eq!(config.jpeg_quality, Config::default().jpeg_quality);

        // The rewrite should have filled in the missing fields.
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("jpeg_quality:"));
    }
}
