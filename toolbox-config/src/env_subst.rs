//! `${VAR}` / `${VAR:default}` substitution over the raw YAML text (§4.2 first pass,
//! §6 "Environment variables").
//!
//! Substitution runs once, textually, before the document is parsed as YAML, so a
//! placeholder can stand anywhere a scalar is expected (a host, a credential, a
//! whole mapping value). A reference with no default that has no matching
//! environment variable fails the whole load rather than substituting an empty
//! string, per §4.2 "missing variables fail fast unless a default is supplied".

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;

static VAR_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(:([^}]*))?\}").unwrap());

/// Resolve every `${VAR}` / `${VAR:default}` reference in `text` against the
/// process environment.
pub fn substitute(text: &str) -> Result<String, ConfigError> {
    substitute_with(text, |name| std::env::var(name).ok())
}

/// Same as [`substitute`] but against a caller-supplied lookup, so tests don't
/// have to mutate the real process environment.
pub fn substitute_with(
    text: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    let mut missing = Vec::new();
    let substituted = VAR_REF.replace_all(text, |caps: &regex::Captures| {
        let name = &caps[1];
        let default = caps.get(3).map(|m| m.as_str());
        match lookup(name) {
            Some(value) => value,
            None => match default {
                Some(default) => default.to_string(),
                None => {
                    missing.push(name.to_string());
                    String::new()
                }
            },
        }
    });

    if missing.is_empty() {
        Ok(substituted.into_owned())
    } else {
        Err(ConfigError::MissingEnvVar { names: missing })
    }
}
