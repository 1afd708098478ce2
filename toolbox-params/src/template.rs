//! Template-lane parameter substitution (§4.3 Safety contract).
//!
//! Template parameters are interpolated directly into backend-specific query or
//! request text (table names, column lists, API path segments) rather than
//! passed as bound driver arguments, so their rendered literal is restricted to
//! an identifier-shape whitelist to rule out injection through this lane.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParamError;
use crate::parameter::Parameter;
use crate::value::{ParamValue, ParamValues};

/// Characters a template-lane literal may contain. Chosen to cover identifiers,
/// dotted paths, and slugs while excluding quotes, whitespace, and shell/SQL
/// metacharacters.
static SAFE_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]*$").unwrap());

/// The token a declared template parameter's placeholder is replaced with, e.g.
/// `{{.table}}` for a parameter named `table`.
fn placeholder(name: &str) -> String {
    format!("{{{{.{name}}}}}")
}

/// Render one resolved parameter's template-lane literal, enforcing the
/// identifier-shape whitelist unless the declaration opts out.
pub fn render_literal(param: &Parameter, value: &ParamValue) -> Result<String, ParamError> {
    let literal = value.as_template_literal();
    if param.allow_unsafe_template_value {
        return Ok(literal);
    }
    if SAFE_LITERAL.is_match(&literal) {
        Ok(literal)
    } else {
        Err(ParamError::UnsafeTemplateValue {
            name: param.name.clone(),
        })
    }
}

/// Substitute every declared template parameter's placeholder in `text` with its
/// rendered, whitelist-checked literal.
///
/// `template_params` and `resolved` must be declaration-order aligned with one
/// another by name; only parameters with a placeholder present in `text` need a
/// resolved value.
pub fn expand(
    text: &str,
    template_params: &[Parameter],
    resolved: &ParamValues,
) -> Result<String, ParamError> {
    let mut out = text.to_string();
    for param in template_params {
        let token = placeholder(&param.name);
        if !out.contains(&token) {
            continue;
        }
        let value = resolved
            .get(&param.name)
            .ok_or_else(|| ParamError::Missing {
                name: param.name.clone(),
            })?;
        let literal = render_literal(param, value)?;
        out = out.replace(&token, &literal);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ParamType;

    fn param(name: &str) -> Parameter {
        Parameter {
            name: name.into(),
            param_type: ParamType::String,
            description: String::new(),
            required: None,
            default: None,
            auth_services: vec![],
            items: None,
            value_type: None,
            allowed_keys: None,
            allow_unsafe_template_value: false,
        }
    }

    #[test]
    fn plain_identifier_passes_whitelist() {
        let p = param("table");
        let literal = render_literal(&p, &ParamValue::String("orders_2024".into())).unwrap();
        assert_eq!(literal, "orders_2024");
    }

    #[test]
    fn quote_character_is_rejected() {
        let p = param("table");
        let err =
            render_literal(&p, &ParamValue::String("orders; DROP TABLE users; --".into()))
                .unwrap_err();
        assert!(matches!(err, ParamError::UnsafeTemplateValue { .. }));
    }

    #[test]
    fn expand_replaces_matching_placeholder_only() {
        let params = vec![param("table")];
        let mut resolved = ParamValues::new();
        resolved.push("table", ParamValue::String("orders".into()));

        let out = expand("SELECT * FROM {{.table}} LIMIT 10", &params, &resolved).unwrap();
        assert_eq!(out, "SELECT * FROM orders LIMIT 10");
    }

    #[test]
    fn expand_skips_placeholders_not_present_in_text() {
        let params = vec![param("table"), param("unused")];
        let mut resolved = ParamValues::new();
        resolved.push("table", ParamValue::String("orders".into()));
        // `unused` is intentionally left unresolved; since its placeholder never
        // appears in `text`, expand must not look it up.
        let out = expand("SELECT * FROM {{.table}}", &params, &resolved).unwrap();
        assert_eq!(out, "SELECT * FROM orders");
    }
}
