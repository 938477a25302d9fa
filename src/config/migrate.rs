//! Bring an existing config file up to date with the current set of keys.

use super::Config;
use crate::errors::{AppError, AppResult};
use serde_yaml::Value;
use std::fs;
use std::path::Path;

/// Keys present in the defaults but absent from the file at `path`.
pub fn missing_keys(path: &Path) -> AppResult<Vec<String>> {
    let (map, defaults) = read_with_defaults(path)?;
    Ok(defaults
        .keys()
        .filter(|k| !map.contains_key(*k))
        .filter_map(|k| k.as_str().map(str::to_string))
        .collect())
}

/// Add every missing key with its default value; returns the keys added.
pub fn fill_missing_keys(path: &Path) -> AppResult<Vec<String>> {
    let (mut map, defaults) = read_with_defaults(path)?;
    let mut added = Vec::new();

    for (key, value) in defaults {
        if !map.contains_key(&key) {
            if let Some(k) = key.as_str() {
                added.push(k.to_string());
            }
            map.insert(key, value);
        }
    }

    if !added.is_empty() {
        let serialized =
            serde_yaml::to_string(&Value::Mapping(map)).map_err(|_| AppError::ConfigSave)?;
        fs::write(path, serialized)?;
    }

    Ok(added)
}

fn read_with_defaults(path: &Path) -> AppResult<(serde_yaml::Mapping, serde_yaml::Mapping)> {
    let content = fs::read_to_string(path)?;
    let yaml: Value = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

    let map = match yaml {
        Value::Mapping(m) => m,
        Value::Null => serde_yaml::Mapping::new(),
        _ => {
            return Err(AppError::Config(format!(
                "{}: expected a mapping at top level",
                path.display()
            )));
        }
    };

    let defaults = match serde_yaml::to_value(Config::default()).map_err(|_| AppError::ConfigLoad)? {
        Value::Mapping(m) => m,
        _ => return Err(AppError::ConfigLoad),
    };

    Ok((map, defaults))
}
