//! # parlor-settings
//!
//! Configuration for the parlor chat server: compiled defaults, then an
//! optional JSON file merged over them, then `PARLOR_*` environment
//! variables. The binary applies `--addr` last.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_env_overrides, deep_merge, load_settings, load_settings_from_path};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let settings = ParlorSettings::default();
        assert_eq!(settings.server.listen_addr(), "127.0.0.1:8080");
        let mut merged = serde_json::json!({"x": 1});
        deep_merge(&mut merged, serde_json::json!({"y": 2}));
        assert_eq!(merged, serde_json::json!({"x": 1, "y": 2}));
    }
}
