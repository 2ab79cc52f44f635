//! The release workflow.
//!
//! A release is a strictly linear sequence of steps. Each step either
//! advances to the next one or ends the run with a [`ReleaseOutcome`]:
//!
//! 1. **CheckIndexClean**: `git update-index --refresh`
//! 2. **CheckTreeClean**: `git diff-index --quiet HEAD --`
//! 3. **ResolveHeadCommit**: `git rev-parse --verify HEAD`
//! 4. **PatchReadme**: rewrite the install snippet line in memory
//! 5. **DryRunCheck**: stop here when previewing
//! 6. **WriteReadme**: write the patched README back
//! 7. **StageFile**: `git add README.md`
//! 8. **CommitChanges**: `git commit -m "Make release"`
//! 9. **PushChanges**: `git push`
//! 10. **Done**
//!
//! Step failures are values, not errors. Only conditions the workflow cannot
//! reason about (a missing `git` binary, an unreadable README) escape as
//! [`ReleaseError`](crate::error::ReleaseError).
use log::*;
use std::fmt;

use crate::{
    config::ReleaseConfig,
    error::Result,
    readme::{FileEditor, patch_lines},
    runner::CommandRunner,
};

/// Why a release run stopped before publishing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    PendingChangesUpdateIndex,
    PendingChangesDiffIndex,
    UnresolvedHead,
    PatchTargetNotFound,
    StageFailed,
    CommitFailed,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            AbortReason::PendingChangesUpdateIndex => {
                "pending changes (update-index)"
            }
            AbortReason::PendingChangesDiffIndex => {
                "pending changes (diff-index)"
            }
            AbortReason::UnresolvedHead => "could not get git sha",
            AbortReason::PatchTargetNotFound => "did not find line to patch",
            AbortReason::StageFailed => "failed to git add",
            AbortReason::CommitFailed => "failed to git commit",
        };
        write!(f, "{msg}")
    }
}

/// How a release run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// README patched, committed and pushed.
    Released { sha: String },
    /// Preview only: nothing was written, committed or pushed.
    DryRun { sha: String, patched_lines: usize },
    /// Stopped before anything was published.
    Aborted(AbortReason),
    /// The release commit exists locally but the push failed. Retrying
    /// `git push` finishes the release; re-running the workflow does not.
    CommittedNotPushed { sha: String },
}

impl ReleaseOutcome {
    /// Whether the release reached the remote.
    pub fn is_success(&self) -> bool {
        matches!(self, ReleaseOutcome::Released { .. })
    }

    /// Closing line for a run, if one should be printed.
    ///
    /// Dry runs stay quiet whatever happened: the workflow has already said
    /// what it would have done.
    pub fn summary(&self, dry_run: bool) -> Option<&'static str> {
        if dry_run {
            return None;
        }

        match self {
            ReleaseOutcome::Released { .. } => Some("Releasing ... Done"),
            ReleaseOutcome::DryRun { .. } => None,
            ReleaseOutcome::Aborted(_)
            | ReleaseOutcome::CommittedNotPushed { .. } => {
                Some("Releasing ... Failed!")
            }
        }
    }
}

/// Steps of a release run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseState {
    CheckIndexClean,
    CheckTreeClean,
    ResolveHeadCommit,
    PatchReadme,
    DryRunCheck,
    WriteReadme,
    StageFile,
    CommitChanges,
    PushChanges,
    Done,
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseState::CheckIndexClean => "check-index-clean",
            ReleaseState::CheckTreeClean => "check-tree-clean",
            ReleaseState::ResolveHeadCommit => "resolve-head-commit",
            ReleaseState::PatchReadme => "patch-readme",
            ReleaseState::DryRunCheck => "dry-run-check",
            ReleaseState::WriteReadme => "write-readme",
            ReleaseState::StageFile => "stage-file",
            ReleaseState::CommitChanges => "commit-changes",
            ReleaseState::PushChanges => "push-changes",
            ReleaseState::Done => "done",
        };
        write!(f, "{name}")
    }
}

/// Patches the README to the current commit and publishes it.
pub struct ReleaseWorkflow<R: CommandRunner, F: FileEditor> {
    config: ReleaseConfig,
    runner: R,
    editor: F,
}

impl<R: CommandRunner, F: FileEditor> ReleaseWorkflow<R, F> {
    /// Creates a workflow after validating `config`.
    pub fn new(config: ReleaseConfig, runner: R, editor: F) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            runner,
            editor,
        })
    }

    pub fn config(&self) -> &ReleaseConfig {
        &self.config
    }

    /// Runs every step in order and reports where the run ended.
    pub fn run(&self) -> Result<ReleaseOutcome> {
        enter(ReleaseState::CheckIndexClean);
        if !self.git(&["update-index", "--refresh"])? {
            return Ok(abort(AbortReason::PendingChangesUpdateIndex));
        }

        enter(ReleaseState::CheckTreeClean);
        if !self.git(&["diff-index", "--quiet", "HEAD", "--"])? {
            return Ok(abort(AbortReason::PendingChangesDiffIndex));
        }
        info!("No changes / pending changes. Good!");

        enter(ReleaseState::ResolveHeadCommit);
        let Some(sha) = self.head_sha()? else {
            return Ok(abort(AbortReason::UnresolvedHead));
        };
        info!("git sha is '{sha}'");

        enter(ReleaseState::PatchReadme);
        let readme_path = &self.config.readme_path;
        let lines = self.editor.read_lines(readme_path)?;
        let patch = patch_lines(&lines, &self.config.target, &sha);
        if !patch.found() {
            error!("not found in {}", readme_path.display());
            return Ok(abort(AbortReason::PatchTargetNotFound));
        }

        enter(ReleaseState::DryRunCheck);
        if self.config.dry_run {
            info!("Dry mode, exiting!");
            return Ok(ReleaseOutcome::DryRun {
                sha,
                patched_lines: patch.patched,
            });
        }

        enter(ReleaseState::WriteReadme);
        self.editor.write_lines(readme_path, &patch.lines)?;
        info!("Updated {}", readme_path.display());

        enter(ReleaseState::StageFile);
        let readme_arg = self.config.readme_arg();
        if !self.git(&["add", readme_arg.as_str()])? {
            return Ok(abort(AbortReason::StageFailed));
        }
        info!("git add {readme_arg} OK");

        enter(ReleaseState::CommitChanges);
        let commit = ["commit", "-m", self.config.commit_message.as_str()];
        if !self.git(&commit)? {
            return Ok(abort(AbortReason::CommitFailed));
        }
        info!("OK commit: {}", self.config.git_argv(&commit).join(" "));

        enter(ReleaseState::PushChanges);
        if !self.git(&["push"])? {
            error!("failed to git push");
            warn!(
                "release commit for {sha} exists locally: run `{} push` to finish the release",
                self.config.git_program
            );
            return Ok(ReleaseOutcome::CommittedNotPushed { sha });
        }
        info!("OK push: {}", self.config.git_argv(&["push"]).join(" "));

        enter(ReleaseState::Done);
        info!("Released sha {sha}");
        Ok(ReleaseOutcome::Released { sha })
    }

    fn git(&self, args: &[&str]) -> Result<bool> {
        let outcome = self.runner.run(&self.config.git_argv(args))?;
        Ok(outcome.succeeded())
    }

    fn head_sha(&self) -> Result<Option<String>> {
        let outcome = self
            .runner
            .run(&self.config.git_argv(&["rev-parse", "--verify", "HEAD"]))?;

        if !outcome.succeeded() {
            return Ok(None);
        }

        let sha = outcome.stdout_text().trim().to_string();
        if sha.is_empty() {
            return Ok(None);
        }

        Ok(Some(sha))
    }
}

fn enter(state: ReleaseState) {
    debug!("entering state: {state}");
}

fn abort(reason: AbortReason) -> ReleaseOutcome {
    error!("{reason}: aborting release!");
    ReleaseOutcome::Aborted(reason)
}
