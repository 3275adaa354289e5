//! Static-asset location.

use serde::{Deserialize, Serialize};

/// Where the HTTP surface finds its files.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpSettings {
    /// Directory served under `/assets`.
    pub assets_dir: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            assets_dir: "assets".to_string(),
        }
    }
}
