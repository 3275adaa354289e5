//! The `auth` cookie: who is looking at the page.
//!
//! The cookie value is standard base64 over a JSON object such as
//! `{"name":"Ada"}`. It is set by whatever login flow sits in front of the
//! server; this module only reads it. The room itself never sees identity.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Cookie that marks a visitor as signed in.
pub const AUTH_COOKIE: &str = "auth";

/// User data carried in the `auth` cookie.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Display name.
    #[serde(default)]
    pub name: String,
}

impl Identity {
    /// Decode a cookie value. Anything malformed yields `None`.
    pub fn from_cookie_value(value: &str) -> Option<Self> {
        let raw = STANDARD.decode(value.trim()).ok()?;
        serde_json::from_slice(&raw).ok()
    }

    /// Encode as a cookie value.
    pub fn to_cookie_value(&self) -> String {
        // Serializing a struct of plain strings cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        STANDARD.encode(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_name() {
        let value = STANDARD.encode(r#"{"name":"Ada"}"#);
        let id = Identity::from_cookie_value(&value).unwrap();
        assert_eq!(id.name, "Ada");
    }

    #[test]
    fn extra_fields_are_ignored() {
        let value = STANDARD.encode(r#"{"name":"Ada","avatar_url":"x"}"#);
        assert_eq!(Identity::from_cookie_value(&value).unwrap().name, "Ada");
    }

    #[test]
    fn missing_name_defaults_to_empty() {
        let value = STANDARD.encode("{}");
        assert_eq!(Identity::from_cookie_value(&value), Some(Identity::default()));
    }

    #[test]
    fn garbage_is_none() {
        assert!(Identity::from_cookie_value("not base64!").is_none());
        assert!(Identity::from_cookie_value(&STANDARD.encode("not json")).is_none());
        assert!(Identity::from_cookie_value(&STANDARD.encode("[1,2]")).is_none());
    }

    #[test]
    fn cookie_value_decodes_back() {
        let id = Identity {
            name: "Grace".into(),
        };
        assert_eq!(Identity::from_cookie_value(&id.to_cookie_value()), Some(id));
    }
}
