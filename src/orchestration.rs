//! Release-branch reconstruction workflow
//!
//! Drives the end-to-end run: resolve the cut-point, validate it against the
//! development branch's history, rebuild the release branch from the commits
//! past the cut-point, squash them into one commit carrying the first
//! replayed commit's message, and optionally force-push the result.
//!
//! Cleanup is guaranteed by drop guards: once the release branch exists, the
//! run always ends with the development branch checked out again, and a
//! half-applied replay is always aborted, whichever step failed.

use log::{error, info};

use crate::branch::BranchPair;
use crate::error::{GitRelError, Result};
use crate::git::GitCli;
use crate::store::CutpointStore;

/// Remote the release branch is published to.
pub const PUSH_REMOTE: &str = "origin";

/// Arguments for the release workflow
///
/// Mirrors the CLI args but in a format suitable for orchestration logic, so
/// the workflow can be called programmatically without depending on clap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseWorkflowArgs {
    /// Cut-point commit id supplied on the command line, if any. When absent
    /// the stored cut-point for the current branch is used.
    pub cut_point: Option<String>,

    /// Force-push the rebuilt branch to the remote afterwards.
    pub force_push: bool,
}

/// Result of a successful release workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowResult {
    /// The development branch the run started from (and ends on).
    pub dev_branch: String,

    /// The rebuilt release branch.
    pub release_branch: String,

    /// Full message of the squashed commit, taken verbatim from the first
    /// included commit.
    pub commit_message: String,

    /// Whether the branch was pushed to the remote.
    pub pushed: bool,
}

/// Checks the development branch out again when dropped.
///
/// Registered right after the release branch is created so the user is never
/// left stranded on it, success or failure. Drop cannot propagate errors, so
/// a failed checkout-back is logged.
struct CheckoutBackGuard<'a> {
    git: &'a dyn GitCli,
    branch: &'a str,
}

impl Drop for CheckoutBackGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.git.checkout(self.branch) {
            error!("could not return to branch '{}': {}", self.branch, e);
        }
    }
}

/// Aborts a pending cherry-pick when dropped.
///
/// Idempotent: aborting when no replay is pending is a no-op by contract, so
/// the guard stays armed even after the squash commit lands.
struct ReplayAbortGuard<'a> {
    git: &'a dyn GitCli,
}

impl Drop for ReplayAbortGuard<'_> {
    fn drop(&mut self) {
        self.git.cherry_pick_abort();
    }
}

/// Locate the cut-point in a newest-first commit log.
///
/// Returns its index; fails when the id is absent or is already the branch
/// head (an empty release range).
fn locate_cut_point(log: &[String], cut_point: &str) -> Result<usize> {
    let idx = log
        .iter()
        .position(|id| id == cut_point)
        .ok_or_else(|| GitRelError::InvalidCutPoint(cut_point.to_string()))?;
    if idx == 0 {
        return Err(GitRelError::CutPointIsHead(cut_point.to_string()));
    }
    Ok(idx)
}

/// Run the release-branch reconstruction workflow.
///
/// A cut-point supplied in `args` is recorded in the store immediately; the
/// caller saves the store after this returns, success or failure, so the
/// record survives a failed run.
pub fn run_release_workflow(
    args: &ReleaseWorkflowArgs,
    git: &dyn GitCli,
    store: &CutpointStore,
) -> Result<WorkflowResult> {
    // Step 1: identity. Only branches following the `<release>_dev` naming
    // convention can be rebuilt.
    let current = git.current_branch()?;
    let pair = BranchPair::from_dev(&current)?;
    info!("rebuilding '{}' from '{}'", pair.release, pair.dev);

    // Step 2: resolve the cut-point.
    let cut_point = match &args.cut_point {
        Some(id) => {
            store.put(&pair.dev, id);
            id.clone()
        }
        None => {
            let id = store
                .get(&pair.dev)
                .ok_or_else(|| GitRelError::NoCutPoint(pair.dev.clone()))?;
            info!("using stored cut-point {}", id);
            id
        }
    };

    // Step 3: validate against history before touching any branch. Both the
    // stale-id and empty-range cases must fail without mutation.
    let log = git.commit_log(&pair.dev)?;
    locate_cut_point(&log, &cut_point)?;

    // Step 4: force-recreate the release branch at the dev tip.
    if git.local_branches()?.iter().any(|b| *b == pair.release) {
        if let Err(e) = git.delete_branch(&pair.release, true) {
            let output = match e {
                GitRelError::VcsCommandFailed { output, .. } => output,
                other => other.to_string(),
            };
            return Err(GitRelError::BranchBusy {
                branch: pair.release.clone(),
                output,
            });
        }
    }
    git.checkout_new_branch(&pair.release, &pair.dev)?;

    // Step 5: from here on, every exit path ends back on the dev branch.
    let _checkout_back = CheckoutBackGuard {
        git,
        branch: &pair.dev,
    };

    // Step 6: re-query the log (identifiers can shift after branch surgery)
    // and pick the first included commit, whose message seeds the squash.
    let log = git.commit_log(&pair.dev)?;
    let idx = locate_cut_point(&log, &cut_point)?;
    let first_included = &log[idx - 1];
    let tip = &log[0];
    let message = git.commit_message(first_included)?;

    // Step 7: release branch content becomes the cut-point's tree.
    git.hard_reset(&cut_point)?;

    // Step 8: content-only replay of (cut_point, tip]. Clear any stale
    // sequencer state first; the guard aborts a half-applied replay on every
    // exit path (guards drop in reverse order: abort, then checkout back).
    git.cherry_pick_abort();
    let _abort_replay = ReplayAbortGuard { git };
    git.cherry_pick_no_commit(&cut_point, tip)?;

    // Step 9: one commit, message verbatim from the first included commit.
    git.stage_all()?;
    git.commit(&message)?;
    info!("committed squashed release on '{}'", pair.release);

    // Step 10: optional publication. Failure leaves the local branch valid.
    let pushed = if args.force_push {
        if let Err(e) = git.push(PUSH_REMOTE, &pair.release, true, true) {
            let output = match e {
                GitRelError::VcsCommandFailed { output, .. } => output,
                other => other.to_string(),
            };
            return Err(GitRelError::PublishFailed {
                branch: pair.release.clone(),
                output,
            });
        }
        true
    } else {
        false
    };

    // Step 11: guards unwind here, on this and every earlier return. The
    // checkout-back guard still borrows pair.dev, so the result gets a copy.
    Ok(WorkflowResult {
        dev_branch: pair.dev.clone(),
        release_branch: pair.release,
        commit_message: message,
        pushed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockGit;

    fn scripted_git() -> MockGit {
        let git = MockGit::new();
        git.add_branch(
            "feature_dev",
            &[("c3", "third change"), ("c2", "second change"), ("c1", "first change")],
        );
        git.set_current_branch("feature_dev");
        git
    }

    fn store() -> CutpointStore {
        CutpointStore::empty("/nonexistent/gitrel.cfg")
    }

    #[test]
    fn test_happy_path_squashes_to_one_commit() {
        let git = scripted_git();
        let args = ReleaseWorkflowArgs {
            cut_point: Some("c1".to_string()),
            force_push: false,
        };

        let result = run_release_workflow(&args, &git, &store()).unwrap();
        assert_eq!(result.dev_branch, "feature_dev");
        assert_eq!(result.release_branch, "feature");
        assert_eq!(result.commit_message, "second change");
        assert!(!result.pushed);

        // One commit ahead of the cut-point, message from the first
        // included commit.
        let commits = git.branch_commits("feature").unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].1, "second change");
        assert_eq!(commits[1].0, "c1");

        // Run ends back on the dev branch.
        assert_eq!(git.current_branch().unwrap(), "feature_dev");
    }

    #[test]
    fn test_locate_cut_point_boundaries() {
        let log: Vec<String> = ["c3", "c2", "c1"].iter().map(|s| s.to_string()).collect();
        assert_eq!(locate_cut_point(&log, "c1").unwrap(), 2);
        assert!(matches!(
            locate_cut_point(&log, "c3"),
            Err(GitRelError::CutPointIsHead(_))
        ));
        assert!(matches!(
            locate_cut_point(&log, "zz"),
            Err(GitRelError::InvalidCutPoint(_))
        ));
    }

    #[test]
    fn test_branch_without_suffix_is_rejected() {
        let git = scripted_git();
        git.add_branch("main", &[("m1", "init")]);
        git.set_current_branch("main");
        let args = ReleaseWorkflowArgs {
            cut_point: Some("m1".to_string()),
            force_push: false,
        };
        assert!(matches!(
            run_release_workflow(&args, &git, &store()),
            Err(GitRelError::InvalidBranchName(_))
        ));
    }

    #[test]
    fn test_missing_cut_point_requires_argument() {
        let git = scripted_git();
        let args = ReleaseWorkflowArgs {
            cut_point: None,
            force_push: false,
        };
        assert!(matches!(
            run_release_workflow(&args, &git, &store()),
            Err(GitRelError::NoCutPoint(_))
        ));
    }

    #[test]
    fn test_stored_cut_point_is_used() {
        let git = scripted_git();
        let store = store();
        store.put("feature_dev", "c1");
        let args = ReleaseWorkflowArgs {
            cut_point: None,
            force_push: false,
        };
        let result = run_release_workflow(&args, &git, &store).unwrap();
        assert_eq!(result.commit_message, "second change");
    }

    #[test]
    fn test_supplied_cut_point_is_recorded() {
        let git = scripted_git();
        let store = store();
        let args = ReleaseWorkflowArgs {
            cut_point: Some("c1".to_string()),
            force_push: false,
        };
        run_release_workflow(&args, &git, &store).unwrap();
        assert_eq!(store.get("feature_dev"), Some("c1".to_string()));
    }

    #[test]
    fn test_push_failure_maps_to_publish_failed() {
        let git = scripted_git();
        git.fail_push();
        let args = ReleaseWorkflowArgs {
            cut_point: Some("c1".to_string()),
            force_push: true,
        };
        let err = run_release_workflow(&args, &git, &store()).unwrap_err();
        assert!(matches!(err, GitRelError::PublishFailed { .. }));
        // Local reconstruction is intact and we are back on the dev branch.
        assert_eq!(git.branch_commits("feature").unwrap().len(), 2);
        assert_eq!(git.current_branch().unwrap(), "feature_dev");
    }
}
