//! CLI argument parsing.
use clap::Parser;

use crate::config::ReleaseConfig;

/// Pin the README install snippet to the current commit, then commit and
/// push it.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value_t = false)]
    /// Show the patched line without writing, committing or pushing.
    pub dry: bool,

    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}

impl Args {
    /// Release settings for this invocation.
    pub fn release_config(&self) -> ReleaseConfig {
        ReleaseConfig {
            dry_run: self.dry,
            ..ReleaseConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_without_flags() {
        let args = Args::try_parse_from(["labtail-release"]).unwrap();
        assert!(!args.dry);
        assert!(!args.debug);

        let config = args.release_config();
        assert!(!config.dry_run);
        assert_eq!(config, ReleaseConfig::default());
    }

    #[test]
    fn parses_dry_flag() {
        let args =
            Args::try_parse_from(["labtail-release", "--dry", "--debug"])
                .unwrap();
        assert!(args.dry);
        assert!(args.debug);
        assert!(args.release_config().dry_run);
    }

    #[test]
    fn rejects_unknown_flags() {
        let result = Args::try_parse_from(["labtail-release", "--push-only"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_subcommands() {
        let result = Args::try_parse_from(["labtail-release", "release"]);
        assert!(result.is_err());
    }
}
