//! Configuration handling.
//!
//! All environment-sourced settings are read once at process start into an
//! explicit [`Config`] value that is passed into each component; nothing else
//! in the crate consults the process environment.
use std::env;

/// Credentials for one git endpoint.
#[derive(Debug, Default, Clone)]
pub struct EndpointCredentials {
    /// Username for the endpoint.
    pub username: Option<String>,

    /// Access token for the endpoint.
    pub token: Option<String>,
}

/// Settings for server-side mirror registration.
#[derive(Debug, Clone)]
pub struct MirrorSettings {
    /// Platform selector (`MIRROR_PLATFORM`, defaults to `gitlab`).
    pub platform: String,

    /// Management-API base override (`GITLAB_API_BASE`).
    pub api_base: Option<String>,

    /// Management-API token override (`GITLAB_API_TOKEN`).
    pub api_token: Option<String>,

    /// Project-path override (`GITLAB_PROJECT_PATH`).
    pub project_path: Option<String>,

    /// Branch filter regex (`GITLAB_MIRROR_BRANCH_REGEX`).
    pub branch_regex: Option<String>,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            platform: "gitlab".to_string(),
            api_base: None,
            api_token: None,
            project_path: None,
            branch_regex: None,
        }
    }
}

/// Configuration snapshot for one process run.
#[derive(Debug, Default, Clone)]
pub struct Config {
    /// Source endpoint credentials (`SOURCE_USERNAME` / `SOURCE_TOKEN`).
    pub source: EndpointCredentials,

    /// Target endpoint credentials (`TARGET_USERNAME` / `TARGET_TOKEN`).
    pub target: EndpointCredentials,

    /// Remote-mirror registration settings.
    pub mirror: MirrorSettings,

    /// Pointer-only mode (`GIT_LFS_SKIP_SMUDGE`): skip large-object content,
    /// sync pointer files only.
    pub pointer_only: bool,
}

impl Config {
    /// Build a configuration snapshot from the current environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            source: EndpointCredentials {
                username: env_opt("SOURCE_USERNAME"),
                token: env_opt("SOURCE_TOKEN"),
            },
            target: EndpointCredentials {
                username: env_opt("TARGET_USERNAME"),
                token: env_opt("TARGET_TOKEN"),
            },
            mirror: MirrorSettings {
                platform: env_opt("MIRROR_PLATFORM")
                    .unwrap_or_else(|| "gitlab".to_string())
                    .to_lowercase(),
                api_base: env_opt("GITLAB_API_BASE"),
                api_token: env_opt("GITLAB_API_TOKEN"),
                project_path: env_opt("GITLAB_PROJECT_PATH"),
                branch_regex: env_opt("GITLAB_MIRROR_BRANCH_REGEX"),
            },
            pointer_only: env_opt("GIT_LFS_SKIP_SMUDGE")
                .map(|v| truthy(&v))
                .unwrap_or(false),
        }
    }
}

/// Read an environment variable, treating empty values as unset.
fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Parse a truthy environment string.
pub(crate) fn truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn truthy_strings() {
        assert!(truthy("1"));
        assert!(truthy("TRUE"));
        assert!(truthy(" yes "));
        assert!(truthy("on"));
        assert!(!truthy("0"));
        assert!(!truthy("false"));
        assert!(!truthy(""));
    }

    #[test]
    fn default_platform_is_gitlab() {
        let settings = MirrorSettings::default();
        assert_eq!(settings.platform, "gitlab");
    }
}
