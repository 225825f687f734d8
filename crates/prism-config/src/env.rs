use std::sync::OnceLock;

use regex::Regex;

/// Expand `{{ env.VAR }}` placeholders in a raw TOML string
///
/// An optional fallback is supported via `{{ env.VAR | default("value") }}`;
/// when the variable is unset the fallback is substituted instead of
/// returning an error. Placeholders on TOML comment lines are left alone so
/// commented-out secrets never fail expansion.
pub fn expand_env(input: &str) -> Result<String, String> {
    fn placeholder() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        // Group 1: scoped key (e.g. `env.API_KEY`), group 2: optional fallback
        RE.get_or_init(|| {
            Regex::new(r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#)
                .expect("must be valid regex")
        })
    }

    let mut output = String::with_capacity(input.len());
    let mut lines = input.lines().peekable();

    while let Some(line) = lines.next() {
        if line.trim_start().starts_with('#') {
            output.push_str(line);
        } else {
            let mut cursor = 0;
            for captures in placeholder().captures_iter(line) {
                let matched = captures.get(0).expect("capture 0 always present");
                output.push_str(&line[cursor..matched.start()]);
                output.push_str(&resolve_placeholder(
                    captures.get(1).map_or("", |m| m.as_str()),
                    captures.get(2).map(|m| m.as_str()),
                )?);
                cursor = matched.end();
            }
            output.push_str(&line[cursor..]);
        }

        if lines.peek().is_some() {
            output.push('\n');
        }
    }

    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

/// Look up a single `env.`-scoped placeholder value
fn resolve_placeholder(key: &str, fallback: Option<&str>) -> Result<String, String> {
    let Some(("env", var_name)) = key.split_once('.') else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };
    if var_name.contains('.') {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    }

    match std::env::var(var_name) {
        Ok(value) => Ok(value),
        Err(_) => fallback.map_or_else(
            || Err(format!("environment variable not found: `{var_name}`")),
            |value| Ok(value.to_owned()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_without_placeholders() {
        let input = "key = \"value\"\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn expands_set_variable() {
        temp_env::with_var("PRISM_TEST_KEY", Some("sk-123"), || {
            let result = expand_env("api_key = \"{{ env.PRISM_TEST_KEY }}\"").unwrap();
            assert_eq!(result, "api_key = \"sk-123\"");
        });
    }

    #[test]
    fn missing_variable_errors() {
        temp_env::with_var_unset("PRISM_MISSING", || {
            let err = expand_env("key = \"{{ env.PRISM_MISSING }}\"").unwrap_err();
            assert!(err.contains("PRISM_MISSING"));
        });
    }

    #[test]
    fn fallback_used_when_unset() {
        temp_env::with_var_unset("PRISM_OPTIONAL", || {
            let result = expand_env("key = \"{{ env.PRISM_OPTIONAL | default(\"none\") }}\"").unwrap();
            assert_eq!(result, "key = \"none\"");
        });
    }

    #[test]
    fn fallback_ignored_when_set() {
        temp_env::with_var("PRISM_OPTIONAL", Some("actual"), || {
            let result = expand_env("key = \"{{ env.PRISM_OPTIONAL | default(\"none\") }}\"").unwrap();
            assert_eq!(result, "key = \"actual\"");
        });
    }

    #[test]
    fn unsupported_scope_errors() {
        let err = expand_env("key = \"{{ vault.SECRET }}\"").unwrap_err();
        assert!(err.contains("only variables scoped with 'env.'"));
    }

    #[test]
    fn comment_lines_skip_expansion() {
        temp_env::with_var_unset("PRISM_MISSING", || {
            let input = "  # key = \"{{ env.PRISM_MISSING }}\"\nother = 1";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }
}
