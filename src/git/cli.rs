use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, warn};

use crate::error::{GitRelError, Result};
use crate::git::GitCli;

/// Git backend that shells out to the system `git` binary.
///
/// Every subprocess is pinned to the repository with `git -C <work_tree>`,
/// so the implementation does not depend on the process working directory.
pub struct SystemGit {
    work_tree: PathBuf,
}

impl SystemGit {
    /// Open the repository containing `path`.
    ///
    /// Resolves the working-tree root with `rev-parse --show-toplevel`; the
    /// one call also confirms we are inside a git repository at all.
    pub fn open(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .arg("-C")
            .arg(path)
            .args(["rev-parse", "--show-toplevel"])
            .output()?;

        if !output.status.success() {
            return Err(GitRelError::vcs(
                "rev-parse --show-toplevel",
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let work_tree = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(SystemGit {
            work_tree: PathBuf::from(work_tree),
        })
    }

    /// Path of the repository's `.git` control directory.
    pub fn git_dir(&self) -> Result<PathBuf> {
        let dir = self.run(&["rev-parse", "--absolute-git-dir"])?;
        Ok(PathBuf::from(dir.trim()))
    }

    fn git_cmd(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.work_tree);
        cmd
    }

    /// Run a git subcommand, returning its stdout on success and a
    /// [GitRelError::VcsCommandFailed] carrying the combined output on
    /// failure.
    fn run(&self, args: &[&str]) -> Result<String> {
        debug!("git {}", args.join(" "));
        let output = self.git_cmd().args(args).output()?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).trim().to_string();
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if !stderr.is_empty() {
                if !combined.is_empty() {
                    combined.push('\n');
                }
                combined.push_str(stderr);
            }
            return Err(GitRelError::vcs(args.join(" "), combined));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl GitCli for SystemGit {
    fn current_branch(&self) -> Result<String> {
        let out = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        Ok(out.trim().to_string())
    }

    fn local_branches(&self) -> Result<Vec<String>> {
        // --format avoids having to strip the "* " current-branch marker.
        let out = self.run(&["branch", "--list", "--format=%(refname:short)"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    fn delete_branch(&self, name: &str, force: bool) -> Result<()> {
        let flag = if force { "-D" } else { "-d" };
        self.run(&["branch", flag, name])?;
        Ok(())
    }

    fn checkout_new_branch(&self, name: &str, base_ref: &str) -> Result<()> {
        self.run(&["checkout", "-B", name, base_ref])?;
        Ok(())
    }

    fn checkout(&self, name: &str) -> Result<()> {
        self.run(&["checkout", name])?;
        Ok(())
    }

    fn hard_reset(&self, git_ref: &str) -> Result<()> {
        self.run(&["reset", "--hard", git_ref])?;
        Ok(())
    }

    fn cherry_pick_no_commit(&self, from: &str, to: &str) -> Result<()> {
        let range = format!("{}..{}", from, to);
        self.run(&["cherry-pick", "-n", &range])?;
        Ok(())
    }

    fn cherry_pick_abort(&self) {
        // Fails whenever no cherry-pick is in progress, which is the common
        // case. Diagnostic-only.
        if let Err(e) = self.run(&["cherry-pick", "--abort"]) {
            debug!("cherry-pick --abort: {}", e);
        }
    }

    fn stage_all(&self) -> Result<()> {
        self.run(&["add", "."])?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "-m", message])?;
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str, force: bool, set_upstream: bool) -> Result<()> {
        let mut args = vec!["push"];
        if force {
            args.push("-f");
        }
        if set_upstream {
            args.push("--set-upstream");
        }
        args.push(remote);
        args.push(branch);
        if let Err(e) = self.run(&args) {
            warn!("push failed: {}", e);
            return Err(e);
        }
        Ok(())
    }

    fn commit_message(&self, git_ref: &str) -> Result<String> {
        // No trim: the message is reused verbatim, body included.
        self.run(&["show", "-s", "--format=%B", git_ref])
    }

    fn commit_log(&self, branch: &str) -> Result<Vec<String>> {
        let out = self.run(&["log", branch, "--pretty=format:%H"])?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }
}

