//! Release configuration.
//!
//! Everything the workflow needs to know about the repository it is
//! releasing lives in [`ReleaseConfig`]. The defaults describe the labtail
//! README install snippet.
use derive_builder::Builder;
use std::path::PathBuf;

use crate::{error::ReleaseError, error::Result, readme::PatchTarget};

/// README file patched on every release, relative to the working directory.
pub const DEFAULT_README_PATH: &str = "README.md";

/// Start of the install snippet line that carries the pinned commit.
pub const DEFAULT_MARKER_PREFIX: &str =
    "curl -LsSf https://raw.githubusercontent.com/ivarref/labtail/";

/// Everything following the commit on the install snippet line.
pub const DEFAULT_MARKER_SUFFIX: &str = "/labtail.sh -O \\";

/// Commit message for the release commit.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Make release";

/// Version control executable.
pub const DEFAULT_GIT_PROGRAM: &str = "git";

/// Settings for a single release run.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(default, setter(into))]
pub struct ReleaseConfig {
    /// README file to patch.
    pub readme_path: PathBuf,
    /// Line to locate and the shape of its replacement.
    pub target: PatchTarget,
    /// Message used for the release commit.
    pub commit_message: String,
    /// Program invoked for every version control command.
    pub git_program: String,
    /// Preview the patch without writing, committing or pushing.
    pub dry_run: bool,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            readme_path: PathBuf::from(DEFAULT_README_PATH),
            target: PatchTarget::new(
                DEFAULT_MARKER_PREFIX,
                DEFAULT_MARKER_SUFFIX,
            ),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            git_program: DEFAULT_GIT_PROGRAM.to_string(),
            dry_run: false,
        }
    }
}

impl ReleaseConfig {
    /// Rejects settings that would make the workflow misbehave silently.
    pub fn validate(&self) -> Result<()> {
        // an empty prefix matches every line of the README
        if self.target.prefix.is_empty() {
            return Err(ReleaseError::invalid_config(
                "marker prefix must not be empty",
            ));
        }

        if self.git_program.trim().is_empty() {
            return Err(ReleaseError::invalid_config(
                "git program must not be empty",
            ));
        }

        if self.readme_path.as_os_str().is_empty() {
            return Err(ReleaseError::invalid_config(
                "readme path must not be empty",
            ));
        }

        Ok(())
    }

    /// Builds the argv for a git subcommand.
    pub fn git_argv(&self, args: &[&str]) -> Vec<String> {
        std::iter::once(self.git_program.clone())
            .chain(args.iter().map(|arg| arg.to_string()))
            .collect()
    }

    /// README path as it should be passed to `git add`.
    pub fn readme_arg(&self) -> String {
        self.readme_path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_defaults() {
        let config = ReleaseConfig::default();
        assert_eq!(config.readme_path, PathBuf::from("README.md"));
        assert_eq!(config.target.prefix, DEFAULT_MARKER_PREFIX);
        assert_eq!(config.target.suffix, "/labtail.sh -O \\");
        assert_eq!(config.commit_message, "Make release");
        assert_eq!(config.git_program, "git");
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_falls_back_to_defaults() {
        let config = ReleaseConfigBuilder::default()
            .dry_run(true)
            .readme_path("docs/README.md")
            .build()
            .unwrap();

        assert!(config.dry_run);
        assert_eq!(config.readme_path, PathBuf::from("docs/README.md"));
        assert_eq!(config.commit_message, DEFAULT_COMMIT_MESSAGE);
        assert_eq!(config.git_program, DEFAULT_GIT_PROGRAM);
    }

    #[test]
    fn rejects_empty_marker_prefix() {
        let config = ReleaseConfigBuilder::default()
            .target(PatchTarget::new("", "/suffix"))
            .build()
            .unwrap();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ReleaseError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_blank_git_program() {
        let config = ReleaseConfigBuilder::default()
            .git_program("  ")
            .build()
            .unwrap();

        assert!(config.validate().is_err());
    }

    #[test]
    fn builds_git_argv() {
        let config = ReleaseConfig::default();
        assert_eq!(
            config.git_argv(&["diff-index", "--quiet", "HEAD", "--"]),
            vec!["git", "diff-index", "--quiet", "HEAD", "--"]
        );
    }
}
