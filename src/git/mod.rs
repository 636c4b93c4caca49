//! Version-control command abstraction
//!
//! The orchestrator consumes git as a set of black-box request/response
//! operations, each returning output text or a success indicator. The
//! [GitCli] trait captures that boundary; the concrete implementations are:
//!
//! - [cli::SystemGit]: runs the system `git` binary
//! - [mock::MockGit]: an in-memory scripted implementation for testing
//!
//! Most code should depend on the trait rather than a concrete type so the
//! workflow can be exercised without a real repository.

pub mod cli;
pub mod mock;

pub use cli::SystemGit;
pub use mock::MockGit;

use crate::error::Result;

/// Git operations the release workflow needs.
///
/// ## Thread safety
///
/// Implementors must be `Send + Sync`.
///
/// ## Error handling
///
/// Methods return [crate::error::Result]; implementations map a failed
/// subcommand to [crate::error::GitRelError::VcsCommandFailed] carrying the
/// raw tool output for diagnosis. The one exception is
/// [cherry_pick_abort](GitCli::cherry_pick_abort), which is best-effort by
/// contract and whose outcome callers ignore.
pub trait GitCli: Send + Sync {
    /// Name of the currently checked-out branch (`rev-parse --abbrev-ref HEAD`).
    fn current_branch(&self) -> Result<String>;

    /// Names of all local branches.
    fn local_branches(&self) -> Result<Vec<String>>;

    /// Delete a local branch. `force` maps to `-D`.
    fn delete_branch(&self, name: &str, force: bool) -> Result<()>;

    /// Create (or reset) a branch at `base_ref` and check it out
    /// (`checkout -B name base_ref`).
    fn checkout_new_branch(&self, name: &str, base_ref: &str) -> Result<()>;

    /// Check out an existing branch.
    fn checkout(&self, name: &str) -> Result<()>;

    /// Hard-reset the current branch and working tree to `git_ref`.
    fn hard_reset(&self, git_ref: &str) -> Result<()>;

    /// Apply the cumulative changes of the range `(from, to]` to the working
    /// tree without committing (`cherry-pick -n from..to`).
    fn cherry_pick_no_commit(&self, from: &str, to: &str) -> Result<()>;

    /// Abort a pending cherry-pick, if any. Safe to call when none is in
    /// progress; the result is diagnostic-only.
    fn cherry_pick_abort(&self);

    /// Stage every working-tree change (`add .`).
    fn stage_all(&self) -> Result<()>;

    /// Commit staged changes with the given message, verbatim.
    fn commit(&self, message: &str) -> Result<()>;

    /// Push a branch to a remote.
    fn push(&self, remote: &str, branch: &str, force: bool, set_upstream: bool) -> Result<()>;

    /// Full commit message (subject and body) of `git_ref`, verbatim
    /// (`show -s --format=%B`).
    fn commit_message(&self, git_ref: &str) -> Result<String>;

    /// Commit ids reachable from `branch`, newest first
    /// (`log --pretty=format:%H`).
    fn commit_log(&self, branch: &str) -> Result<Vec<String>>;
}
