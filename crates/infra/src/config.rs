//! Infrastructure configuration.

/// Environment variable for [`InfraConfig::conflict_retries`].
pub const CONFLICT_RETRIES_VAR: &str = "TABSPLIT_CONFLICT_RETRIES";

const DEFAULT_CONFLICT_RETRIES: u32 = 3;

/// Tunables for the command pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfraConfig {
    /// How many times a command is re-run after losing an optimistic
    /// concurrency race. Zero disables retries.
    pub conflict_retries: u32,
}

impl Default for InfraConfig {
    fn default() -> Self {
        Self {
            conflict_retries: DEFAULT_CONFLICT_RETRIES,
        }
    }
}

impl InfraConfig {
    /// Read configuration from the process environment. Entry point for
    /// whatever embeds the dispatcher.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`; unset or unparsable values fall
    /// back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(CONFLICT_RETRIES_VAR) {
            match raw.trim().parse() {
                Ok(retries) => config.conflict_retries = retries,
                Err(_) => tracing::warn!(
                    value = %raw,
                    default = config.conflict_retries,
                    "{CONFLICT_RETRIES_VAR} is not a valid count; using default"
                ),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_environment_uses_defaults() {
        assert_eq!(InfraConfig::from_lookup(|_| None), InfraConfig::default());
    }

    #[test]
    fn retries_are_read_from_lookup() {
        let config = InfraConfig::from_lookup(|key| {
            (key == CONFLICT_RETRIES_VAR).then(|| " 7 ".to_string())
        });
        assert_eq!(config.conflict_retries, 7);
    }

    #[test]
    fn garbage_falls_back_to_default() {
        let config = InfraConfig::from_lookup(|_| Some("many".to_string()));
        assert_eq!(config.conflict_retries, DEFAULT_CONFLICT_RETRIES);
    }
}
