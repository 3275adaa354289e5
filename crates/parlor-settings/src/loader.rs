//! Settings file loading and `PARLOR_*` overrides.

use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::{LogLevel, ParlorSettings};

/// Load settings, optionally from a file, then apply env overrides.
pub fn load_settings(path: Option<&Path>) -> Result<ParlorSettings> {
    match path {
        Some(path) => load_settings_from_path(path),
        None => {
            let mut settings = ParlorSettings::default();
            apply_env_overrides(&mut settings);
            Ok(settings)
        }
    }
}

/// Merge the JSON file at `path` over the defaults, then apply env overrides.
///
/// A missing file yields defaults; unreadable or malformed JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<ParlorSettings> {
    let mut merged = serde_json::to_value(ParlorSettings::default())?;
    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!(?path, "loading settings file");
            deep_merge(&mut merged, serde_json::from_str(&content)?);
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(?path, "no settings file, using defaults");
        }
        Err(e) => return Err(e.into()),
    }

    let mut settings: ParlorSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Merge `overlay` into `base` in place.
///
/// Objects merge per key, `null` leaves the base value alone, and anything
/// else replaces it.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None if value.is_null() => {}
                    None => {
                        let _ = base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Apply `PARLOR_*` environment variable overrides.
///
/// Invalid values are logged and ignored (the file/default value stays).
pub fn apply_env_overrides(settings: &mut ParlorSettings) {
    apply_overrides_from(settings, |name| std::env::var(name).ok());
}

/// Apply overrides read through `lookup` instead of the process environment.
pub fn apply_overrides_from(
    settings: &mut ParlorSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let env = EnvReader { lookup };

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = env.string("PARLOR_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = env.u16("PARLOR_PORT", 1, 65535) {
        settings.server.port = v;
    }
    if let Some(v) = env.usize("PARLOR_MAX_CONNECTIONS", 1, 1_000_000) {
        settings.server.max_connections = v;
    }
    if let Some(v) = env.usize("PARLOR_MAX_MESSAGE_SIZE", 1, 64 * 1024 * 1024) {
        settings.server.max_message_size = v;
    }

    // ── Room ────────────────────────────────────────────────────────
    if let Some(v) = env.usize("PARLOR_INTAKE_CAPACITY", 1, 1_000_000) {
        settings.room.intake_capacity = v;
    }
    if let Some(v) = env.usize("PARLOR_MAILBOX_CAPACITY", 1, 1_000_000) {
        settings.room.mailbox_capacity = v;
    }

    // ── HTTP ────────────────────────────────────────────────────────
    if let Some(v) = env.string("PARLOR_ASSETS_DIR") {
        settings.http.assets_dir = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = env.string("PARLOR_LOG_LEVEL") {
        match parse_log_level(&v) {
            Some(level) => settings.logging.level = level,
            None => warn!(key = "PARLOR_LOG_LEVEL", value = %v, "invalid log level, ignoring"),
        }
    }
    if let Some(v) = env.bool("PARLOR_LOG_JSON") {
        settings.logging.json = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a log level name (case-insensitive).
pub fn parse_log_level(val: &str) -> Option<LogLevel> {
    serde_json::from_value(Value::String(val.to_lowercase())).ok()
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

struct EnvReader<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn bool(&self, name: &str) -> Option<bool> {
        let val = (self.lookup)(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    }

    fn u16(&self, name: &str, min: u16, max: u16) -> Option<u16> {
        let val = (self.lookup)(name)?;
        let result = parse_u16_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid u16 env var, ignoring");
        }
        result
    }

    fn usize(&self, name: &str, min: usize, max: usize) -> Option<usize> {
        let val = (self.lookup)(name)?;
        let result = parse_usize_range(&val, min, max);
        if result.is_none() {
            warn!(key = name, value = %val, "invalid usize env var, ignoring");
        }
        result
    }
}
