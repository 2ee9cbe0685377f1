use std::path::Path;
use std::time::Duration;

use super::types::AppConfig;
use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "gsearch.toml";

/// Loads `gsearch.toml` from the working directory when present, defaults otherwise.
pub fn load_default() -> Result<AppConfig, ConfigError> {
    let path = Path::new(DEFAULT_CONFIG_FILE);
    let cfg = if path.exists() {
        read_file(path)?
    } else {
        AppConfig::default()
    };
    finish(cfg)
}

/// Loads an explicitly named config file, which must exist.
pub fn load_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }
    finish(read_file(path)?)
}

pub fn parse_config(s: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str::<AppConfig>(s).map_err(ConfigError::Parse)
}

fn read_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&s)
}

fn finish(mut cfg: AppConfig) -> Result<AppConfig, ConfigError> {
    apply_env_overrides(&mut cfg, |k| std::env::var(k).ok());
    resolve_instruction_files(&mut cfg)?;
    Ok(cfg)
}

pub fn apply_env_overrides(cfg: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("GSEARCH_MODEL") {
        cfg.search.model = v;
    }
    if let Some(v) = get("GSEARCH_BASE_URL") {
        cfg.backend.base_url = v;
    }
    if let Some(v) = get("GSEARCH_SYSTEM_PROMPT_FILE") {
        cfg.search.system_instruction_file = Some(v);
    }
    if let Some(v) = get("GSEARCH_SUMMARY_PROMPT_FILE") {
        cfg.search.summary_instruction_file = Some(v);
    }
}

fn resolve_instruction_files(cfg: &mut AppConfig) -> Result<(), ConfigError> {
    if let Some(path) = cfg.search.system_instruction_file.as_deref() {
        cfg.search.system_instruction = read_prompt(path)?;
    }
    if let Some(path) = cfg.search.summary_instruction_file.as_deref() {
        cfg.search.summary_instruction = read_prompt(path)?;
    }
    Ok(())
}

fn read_prompt(path: &str) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })
}

/// Parses a duration such as `180s`, `2m`, `1m30s`, `1.5h` or `500ms`.
/// A bare number is taken as seconds.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::InvalidDuration(input.to_string());
    let s = input.trim();
    if s.is_empty() {
        return Err(invalid());
    }
    if let Ok(secs) = s.parse::<f64>() {
        return Duration::try_from_secs_f64(secs).map_err(|_| invalid());
    }

    let mut total = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        if num_end == 0 {
            return Err(invalid());
        }
        let value: f64 = rest[..num_end].parse().map_err(|_| invalid())?;
        rest = &rest[num_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_end] {
            "ms" => 0.001,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return Err(invalid()),
        };
        rest = &rest[unit_end..];
        total += value * scale;
    }
    Duration::try_from_secs_f64(total).map_err(|_| invalid())
}
