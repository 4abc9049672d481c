use anyhow::Result;
use regex::{Captures, Regex};
use std::env;
use tracing::{debug, warn};

const ENV_VAR_PATTERN: &str = r"\$\{(\w+)\}|\$(\w+)";

/// Substitute environment variables in the format ${VAR_NAME} or $VAR_NAME
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(ENV_VAR_PATTERN)?;
    let mut missing_vars = Vec::new();

    let result = re.replace_all(content, |caps: &Captures| {
        let whole = &caps[0];
        let Some(name) = caps.get(1).or_else(|| caps.get(2)) else {
            return whole.to_string();
        };
        let var_name = name.as_str();

        match env::var(var_name) {
            Ok(value) => {
                debug!("Substituting environment variable: {} = \"{}\"", var_name, value);
                value
            }
            Err(_) => {
                warn!("Environment variable '{}' not set", var_name);
                // Placeholder stays; the validator reports it
                missing_vars.push(var_name.to_string());
                whole.to_string()
            }
        }
    });

    if !missing_vars.is_empty() {
        debug!("Environment variables not set: {:?}", missing_vars);
    }

    Ok(result.into_owned())
}

/// Check if a string contains unresolved environment variable placeholders
pub fn has_unresolved_env_vars(content: &str) -> bool {
    Regex::new(ENV_VAR_PATTERN)
        .map(|re| re.is_match(content))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_braced_and_bare_vars() {
        env::set_var("INSTRACK_TEST_DIR", "/srv/lab");
        let out = substitute_env_vars("path: ${INSTRACK_TEST_DIR}/a.csv\nb: $INSTRACK_TEST_DIR").unwrap();
        assert_eq!(out, "path: /srv/lab/a.csv\nb: /srv/lab");
    }

    #[test]
    fn test_missing_var_keeps_placeholder() {
        let out = substitute_env_vars("path: ${INSTRACK_SURELY_UNSET_VAR}").unwrap();
        assert_eq!(out, "path: ${INSTRACK_SURELY_UNSET_VAR}");
        assert!(has_unresolved_env_vars(&out));
        assert!(!has_unresolved_env_vars("path: data.csv"));
    }

    #[test]
    fn test_set_var_does_not_rewrite_longer_name() {
        env::set_var("INSTRACK_TEST_ROOT", "/srv");
        let out = substitute_env_vars("a: $INSTRACK_TEST_ROOT\nb: $INSTRACK_TEST_ROOTDIR/x").unwrap();
        assert_eq!(out, "a: /srv\nb: $INSTRACK_TEST_ROOTDIR/x");
    }
}
