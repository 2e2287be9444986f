//! Server-side pull-mirror registration.
//!
//! Instead of transferring locally, instruct the target hosting platform to
//! continuously pull from the source on its own schedule. No working copy is
//! involved; everything goes through the platform's management API.
use std::str::FromStr;

use log::info;

use crate::config::Config;
use crate::errors::{LfsMoverError, LfsMoverErrorKind};
use crate::urls::{ensure_git_suffix, redact_credentials};

pub(crate) mod gitlab;

/// Hosting platforms with a mirror-registration integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorPlatform {
    /// GitLab pull mirrors (`remote_mirrors` API).
    Gitlab,
}

impl std::fmt::Display for MirrorPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MirrorPlatform::Gitlab => write!(f, "gitlab"),
        }
    }
}

impl FromStr for MirrorPlatform {
    type Err = LfsMoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gitlab" => Ok(MirrorPlatform::Gitlab),
            other => Err(LfsMoverError::new(LfsMoverErrorKind::MirrorConfiguration)
                .with_text(format!(
                    "unsupported MIRROR_PLATFORM '{other}', only 'gitlab' is implemented"
                ))),
        }
    }
}

/// Registers a pull mirror for one (source, target) pair.
pub struct MirrorManager {
    /// Source repository URL, normalized to a `.git` suffix.
    source_url: String,

    /// Target repository URL, normalized to a `.git` suffix.
    target_url: String,

    /// Process configuration (credentials and platform settings).
    config: Config,
}

impl MirrorManager {
    /// Build a registrar for one (source, target) pair.
    ///
    /// Both URLs are normalized to the canonical `.git`-suffixed form before
    /// any API operation.
    #[must_use]
    pub fn new(source_url: &str, target_url: &str, config: &Config) -> Self {
        Self {
            source_url: ensure_git_suffix(source_url),
            target_url: ensure_git_suffix(target_url),
            config: config.clone(),
        }
    }

    /// Configure continuous pull-mirroring on the target platform.
    ///
    /// Idempotent: an existing registration for the same (credential-
    /// stripped) source URL is updated rather than duplicated.
    ///
    /// # Errors
    /// Error of kind `MirrorConfiguration` on an unsupported platform,
    /// missing token or credentials, or any non-success API response.
    pub async fn configure(&self) -> Result<(), LfsMoverError> {
        info!("Remote mirroring: {} <- {}",
            redact_credentials(&self.target_url),
            redact_credentials(&self.source_url)
        );
        // Fail fast on an unknown selector, before any API call.
        let platform = MirrorPlatform::from_str(&self.config.mirror.platform)?;
        match platform {
            MirrorPlatform::Gitlab => {
                gitlab::configure_mirror(
                    &self.source_url,
                    &self.target_url,
                    &self.config.source,
                    &self.config.mirror,
                    self.config.target.token.as_deref(),
                )
                .await?;
            }
        }
        info!("Remote mirror configured; the platform now syncs from the source on its own schedule");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::MirrorSettings;

    #[test]
    fn platform_selector_parses_case_insensitively() {
        assert_eq!(MirrorPlatform::from_str("GitLab").unwrap(), MirrorPlatform::Gitlab);
    }

    #[tokio::test]
    async fn unsupported_platform_fails_before_any_api_call() {
        let config = Config {
            mirror: MirrorSettings {
                platform: "gitea".to_string(),
                ..MirrorSettings::default()
            },
            ..Config::default()
        };
        let manager = MirrorManager::new(
            "https://host-a/org/repo",
            "https://host-b/org/repo",
            &config,
        );
        let err = manager.configure().await.unwrap_err();
        assert_eq!(err.kind(), LfsMoverErrorKind::MirrorConfiguration);
        assert!(err.to_string().contains("gitea"));
    }

    #[test]
    fn urls_are_normalized_to_git_suffix() {
        let manager = MirrorManager::new(
            "https://host-a/org/repo",
            "https://host-b/org/repo/",
            &Config::default(),
        );
        assert_eq!(manager.source_url, "https://host-a/org/repo.git");
        assert_eq!(manager.target_url, "https://host-b/org/repo.git");
    }
}
