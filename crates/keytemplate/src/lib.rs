//! Cache-key template evaluation
//!
//! Renders key templates such as `deps-{{ .Branch }}` against the build
//! context of the current run. The template language is deliberately small:
//! member-style placeholders only, no conditionals, no loops.
//!
//! Evaluation is pure and deterministic: the same template and context
//! always produce the same key. A known field holding an empty value
//! substitutes the empty string; only a field name outside the
//! [`BuildContext`] schema is an error.

mod context;
mod error;

pub use context::{BuildContext, ENV_GIT_BRANCH, ENV_GIT_COMMIT, ENV_WORKFLOW_ID};
pub use error::{Error, Result};

/// Render `template` against `ctx`.
///
/// Placeholders have the form `{{ .Field }}` (inner whitespace optional).
/// Text outside placeholders is copied through verbatim, including a stray
/// `}}` with no opener.
///
/// # Errors
///
/// Returns [`Error::Syntax`] for an unterminated `{{` or a placeholder body
/// that is not a `.Field` reference, and [`Error::UnknownField`] when the
/// referenced field is not part of the build-context schema.
pub fn evaluate(template: &str, ctx: &BuildContext) -> Result<String> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        rendered.push_str(&rest[..open]);
        let body = &rest[open + 2..];
        let Some(close) = body.find("}}") else {
            return Err(Error::syntax("unterminated '{{' placeholder"));
        };

        let field = parse_field(body[..close].trim())?;
        let value = ctx
            .field(field)
            .ok_or_else(|| Error::unknown_field(field))?;
        tracing::debug!(field, value, "substituting template field");
        rendered.push_str(value);

        rest = &body[close + 2..];
    }
    rendered.push_str(rest);

    Ok(rendered)
}

/// Validate a placeholder body and return the bare field name.
fn parse_field(body: &str) -> Result<&str> {
    let Some(name) = body.strip_prefix('.') else {
        return Err(Error::syntax(format!(
            "placeholder '{{{{ {body} }}}}' must reference a field as '.Name'"
        )));
    };
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::syntax(format!(
            "'{name}' is not a valid field name"
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> BuildContext {
        BuildContext {
            workflow: "primary".into(),
            branch: "main".into(),
            commit_hash: "76b48d12".into(),
        }
    }

    #[test]
    fn plain_text_passes_through() {
        let key = evaluate("npm-cache", &ctx()).unwrap();
        assert_eq!(key, "npm-cache");
    }

    #[test]
    fn substitutes_all_known_fields() {
        let key = evaluate(
            "{{ .Workflow }}-{{ .Branch }}-{{ .CommitHash }}",
            &ctx(),
        )
        .unwrap();
        assert_eq!(key, "primary-main-76b48d12");
    }

    #[test]
    fn whitespace_inside_braces_is_optional() {
        assert_eq!(evaluate("{{.Branch}}", &ctx()).unwrap(), "main");
        assert_eq!(evaluate("{{   .Branch   }}", &ctx()).unwrap(), "main");
    }

    #[test]
    fn empty_field_renders_as_empty_string() {
        let ctx = BuildContext {
            branch: String::new(),
            ..ctx()
        };
        let key = evaluate("cache-{{ .Branch }}", &ctx).unwrap();
        assert_eq!(key, "cache-");
    }

    #[test]
    fn unknown_field_is_an_error() {
        let err = evaluate("cache-{{ .Stack }}", &ctx()).unwrap_err();
        assert!(matches!(err, Error::UnknownField { field } if field == "Stack"));
    }

    #[test]
    fn unterminated_placeholder_is_a_syntax_error() {
        let err = evaluate("cache-{{ .Branch", &ctx()).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn placeholder_without_leading_dot_is_a_syntax_error() {
        let err = evaluate("cache-{{ Branch }}", &ctx()).unwrap_err();
        assert!(matches!(err, Error::Syntax { .. }));
    }

    #[test]
    fn stray_closer_is_literal_text() {
        let key = evaluate("cache-}}-{{ .Branch }}", &ctx()).unwrap();
        assert_eq!(key, "cache-}}-main");
    }

    #[test]
    fn evaluation_is_idempotent() {
        let template = "deps-{{ .Branch }}-{{ .CommitHash }}";
        let first = evaluate(template, &ctx()).unwrap();
        let second = evaluate(template, &ctx()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn adjacent_placeholders_concatenate() {
        let key = evaluate("{{ .Branch }}{{ .Workflow }}", &ctx()).unwrap();
        assert_eq!(key, "mainprimary");
    }
}
