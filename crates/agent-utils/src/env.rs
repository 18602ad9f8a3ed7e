//! Environment variable helpers

use thiserror::Error;

/// Errors raised while reading the environment
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// A required variable is unset or blank
    #[error("{name} environment variable not set (see {help})")]
    Missing { name: String, help: String },

    /// A variable is set but cannot be parsed
    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: String, reason: String },
}

/// Read an optional variable, treating blank values as unset
pub fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a required variable
pub fn required_env(name: &str, help: &str) -> Result<String, EnvError> {
    optional_env(name).ok_or_else(|| EnvError::Missing {
        name: name.to_string(),
        help: help.to_string(),
    })
}

/// Read and parse an optional variable
pub fn parse_env<T>(name: &str) -> Result<Option<T>, EnvError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(name)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| EnvError::Invalid {
                name: name.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

/// A variable the application knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvRequirement {
    pub name: &'static str,
    /// Where to obtain a value
    pub help: &'static str,
    pub required: bool,
}

/// Result of checking one [`EnvRequirement`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvStatus {
    pub requirement: EnvRequirement,
    /// Masked value, `None` when unset
    pub masked_value: Option<String>,
}

impl EnvStatus {
    pub fn is_set(&self) -> bool {
        self.masked_value.is_some()
    }

    /// A required variable that is missing
    pub fn is_blocking(&self) -> bool {
        self.requirement.required && !self.is_set()
    }
}

impl std::fmt::Display for EnvStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.masked_value {
            Some(value) => write!(f, "{} is set: {value}", self.requirement.name),
            None => write!(
                f,
                "{} is not set! See {}",
                self.requirement.name, self.requirement.help
            ),
        }
    }
}

/// Check every requirement against the current environment
pub fn check_environment(requirements: &[EnvRequirement]) -> Vec<EnvStatus> {
    requirements
        .iter()
        .map(|req| EnvStatus {
            requirement: *req,
            masked_value: optional_env(req.name).map(|v| mask(&v)),
        })
        .collect()
}

/// Keep the first four characters of a secret
fn mask(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    if value.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask("abc"), "****");
        assert_eq!(mask("abcdefgh"), "abcd****");
    }

    #[test]
    fn test_missing_required() {
        let err = required_env("AGENT_UTILS_TEST_SURELY_UNSET", "https://example.com").unwrap_err();
        assert_eq!(
            err.to_string(),
            "AGENT_UTILS_TEST_SURELY_UNSET environment variable not set (see https://example.com)"
        );
    }

    #[test]
    fn test_check_environment_reports_unset() {
        let req = EnvRequirement {
            name: "AGENT_UTILS_TEST_ALSO_UNSET",
            help: "https://example.com/keys",
            required: true,
        };
        let statuses = check_environment(&[req]);
        assert_eq!(statuses.len(), 1);
        assert!(statuses[0].is_blocking());
        assert!(statuses[0].to_string().contains("is not set! See https://example.com/keys"));
    }

    #[test]
    fn test_parse_env_unset_is_none() {
        let parsed: Option<u64> = parse_env("AGENT_UTILS_TEST_NUMBER_UNSET").unwrap();
        assert_eq!(parsed, None);
    }
}
