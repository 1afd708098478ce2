//! Prebuilt-config selector (§4.10): `--prebuilt <name>` loads an embedded YAML
//! bundle instead of a user-supplied file. Env substitution still runs, so an
//! operator still supplies secrets externally; only the YAML document itself
//! ships inside the binary.
//!
//! The two bundles here are placeholders standing in for whatever curated
//! content a real deployment would embed (§10 Non-goals: "the content of
//! individual prebuilt YAML documents" is out of scope for this core).

use crate::error::ConfigError;

const DEMO_POSTGRES: &str = include_str!("../prebuilt/demo-postgres.yaml");
const DEMO_HTTP: &str = include_str!("../prebuilt/demo-http.yaml");

/// Resolve `name` to its embedded YAML text, or a fatal [`ConfigError::UnknownPrebuilt`].
pub fn lookup(name: &str) -> Result<&'static str, ConfigError> {
    match name {
        "demo-postgres" => Ok(DEMO_POSTGRES),
        "demo-http" => Ok(DEMO_HTTP),
        other => Err(ConfigError::UnknownPrebuilt { name: other.to_string() }),
    }
}

/// Names of every embedded prebuilt bundle, for `--help` and error messages.
pub fn names() -> &'static [&'static str] {
    &["demo-postgres", "demo-http"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_prebuilt_names_resolve_to_non_empty_yaml() {
        for name in names() {
            let yaml = lookup(name).unwrap();
            assert!(!yaml.trim().is_empty());
        }
    }

    #[test]
    fn unknown_prebuilt_name_is_fatal() {
        let err = lookup("does-not-exist").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPrebuilt { .. }));
    }
}
