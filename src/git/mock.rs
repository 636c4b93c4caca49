use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::{GitRelError, Result};
use crate::git::GitCli;

#[derive(Default)]
struct MockState {
    /// Branch name -> commits, newest first, as `(id, message)` pairs.
    branches: BTreeMap<String, Vec<(String, String)>>,
    current: String,
    /// Journal of mutating operations, in call order.
    ops: Vec<String>,
    /// Uncommitted replay in progress.
    pending_replay: bool,
    fail_delete: bool,
    fail_push: bool,
    fail_cherry_pick: bool,
    next_commit_seq: u32,
}

/// Scripted in-memory git for testing the workflow without a repository.
///
/// Models just enough: named branches with newest-first commit lists, a
/// current-branch cell, a pending-replay flag, and switches that make
/// individual operations fail. Every mutating call is journaled so tests can
/// assert cleanup ordering.
pub struct MockGit {
    state: Mutex<MockState>,
}

impl MockGit {
    pub fn new() -> Self {
        MockGit {
            state: Mutex::new(MockState::default()),
        }
    }

    /// Add a branch with commits listed newest first.
    pub fn add_branch(&self, name: &str, commits: &[(&str, &str)]) {
        let mut st = self.state.lock().unwrap();
        st.branches.insert(
            name.to_string(),
            commits
                .iter()
                .map(|(id, msg)| (id.to_string(), msg.to_string()))
                .collect(),
        );
    }

    pub fn set_current_branch(&self, name: &str) {
        self.state.lock().unwrap().current = name.to_string();
    }

    pub fn fail_delete_branch(&self) {
        self.state.lock().unwrap().fail_delete = true;
    }

    pub fn fail_push(&self) {
        self.state.lock().unwrap().fail_push = true;
    }

    pub fn fail_cherry_pick(&self) {
        self.state.lock().unwrap().fail_cherry_pick = true;
    }

    /// Journal of mutating operations, in call order.
    pub fn ops(&self) -> Vec<String> {
        self.state.lock().unwrap().ops.clone()
    }

    /// Commits of a branch as `(id, message)`, newest first.
    pub fn branch_commits(&self, name: &str) -> Option<Vec<(String, String)>> {
        self.state.lock().unwrap().branches.get(name).cloned()
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.state.lock().unwrap().branches.contains_key(name)
    }

    pub fn has_pending_replay(&self) -> bool {
        self.state.lock().unwrap().pending_replay
    }
}

impl Default for MockGit {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli for MockGit {
    fn current_branch(&self) -> Result<String> {
        let st = self.state.lock().unwrap();
        if st.current.is_empty() {
            return Err(GitRelError::vcs("rev-parse --abbrev-ref HEAD", "no HEAD"));
        }
        Ok(st.current.clone())
    }

    fn local_branches(&self) -> Result<Vec<String>> {
        Ok(self.state.lock().unwrap().branches.keys().cloned().collect())
    }

    fn delete_branch(&self, name: &str, force: bool) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        let flag = if force { "-D" } else { "-d" };
        st.ops.push(format!("branch {} {}", flag, name));
        if st.fail_delete {
            return Err(GitRelError::vcs(
                format!("branch {} {}", flag, name),
                format!("error: Cannot delete branch '{}' checked out", name),
            ));
        }
        if st.branches.remove(name).is_none() {
            return Err(GitRelError::vcs(
                format!("branch {} {}", flag, name),
                format!("error: branch '{}' not found", name),
            ));
        }
        Ok(())
    }

    fn checkout_new_branch(&self, name: &str, base_ref: &str) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        st.ops.push(format!("checkout -B {} {}", name, base_ref));
        let commits = st.branches.get(base_ref).cloned().ok_or_else(|| {
            GitRelError::vcs(
                format!("checkout -B {} {}", name, base_ref),
                format!("fatal: invalid reference: {}", base_ref),
            )
        })?;
        st.branches.insert(name.to_string(), commits);
        st.current = name.to_string();
        Ok(())
    }

    fn checkout(&self, name: &str) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        st.ops.push(format!("checkout {}", name));
        if !st.branches.contains_key(name) {
            return Err(GitRelError::vcs(
                format!("checkout {}", name),
                format!("error: pathspec '{}' did not match", name),
            ));
        }
        st.current = name.to_string();
        Ok(())
    }

    fn hard_reset(&self, git_ref: &str) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        st.ops.push(format!("reset --hard {}", git_ref));
        let current = st.current.clone();
        let commits = st
            .branches
            .get_mut(&current)
            .ok_or_else(|| GitRelError::vcs("reset --hard", "no current branch"))?;
        let pos = commits.iter().position(|(id, _)| id == git_ref).ok_or_else(|| {
            GitRelError::vcs(
                format!("reset --hard {}", git_ref),
                format!("fatal: ambiguous argument '{}'", git_ref),
            )
        })?;
        commits.drain(..pos);
        Ok(())
    }

    fn cherry_pick_no_commit(&self, from: &str, to: &str) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        st.ops.push(format!("cherry-pick -n {}..{}", from, to));
        if st.fail_cherry_pick {
            // A conflicting pick leaves sequencer state behind.
            st.pending_replay = true;
            return Err(GitRelError::vcs(
                format!("cherry-pick -n {}..{}", from, to),
                "error: could not apply; fix conflicts",
            ));
        }
        st.pending_replay = true;
        Ok(())
    }

    fn cherry_pick_abort(&self) {
        let mut st = self.state.lock().unwrap();
        st.ops.push("cherry-pick --abort".to_string());
        st.pending_replay = false;
    }

    fn stage_all(&self) -> Result<()> {
        self.state.lock().unwrap().ops.push("add .".to_string());
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        st.ops.push(format!("commit -m {:?}", message));
        st.next_commit_seq += 1;
        let id = format!("squash{}", st.next_commit_seq);
        let current = st.current.clone();
        let commits = st
            .branches
            .get_mut(&current)
            .ok_or_else(|| GitRelError::vcs("commit", "no current branch"))?;
        commits.insert(0, (id, message.to_string()));
        // Committing consumes the pending replay state.
        st.pending_replay = false;
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str, force: bool, set_upstream: bool) -> Result<()> {
        let mut st = self.state.lock().unwrap();
        let mut op = String::from("push");
        if force {
            op.push_str(" -f");
        }
        if set_upstream {
            op.push_str(" --set-upstream");
        }
        op.push(' ');
        op.push_str(remote);
        op.push(' ');
        op.push_str(branch);
        st.ops.push(op.clone());
        if st.fail_push {
            return Err(GitRelError::vcs(op, "error: failed to push some refs"));
        }
        Ok(())
    }

    fn commit_message(&self, git_ref: &str) -> Result<String> {
        let st = self.state.lock().unwrap();
        for commits in st.branches.values() {
            if let Some((_, msg)) = commits.iter().find(|(id, _)| id == git_ref) {
                return Ok(msg.clone());
            }
        }
        Err(GitRelError::vcs(
            format!("show -s --format=%B {}", git_ref),
            format!("fatal: bad revision '{}'", git_ref),
        ))
    }

    fn commit_log(&self, branch: &str) -> Result<Vec<String>> {
        let st = self.state.lock().unwrap();
        st.branches
            .get(branch)
            .map(|commits| commits.iter().map(|(id, _)| id.clone()).collect())
            .ok_or_else(|| {
                GitRelError::vcs(
                    format!("log {} --pretty=format:%H", branch),
                    format!("fatal: ambiguous argument '{}'", branch),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted() -> MockGit {
        let git = MockGit::new();
        git.add_branch(
            "feature_dev",
            &[("c3", "third"), ("c2", "second"), ("c1", "first")],
        );
        git.set_current_branch("feature_dev");
        git
    }

    #[test]
    fn test_current_branch_and_log() {
        let git = scripted();
        assert_eq!(git.current_branch().unwrap(), "feature_dev");
        assert_eq!(git.commit_log("feature_dev").unwrap(), ["c3", "c2", "c1"]);
    }

    #[test]
    fn test_checkout_new_branch_copies_history() {
        let git = scripted();
        git.checkout_new_branch("feature", "feature_dev").unwrap();
        assert_eq!(git.current_branch().unwrap(), "feature");
        assert_eq!(git.commit_log("feature").unwrap(), ["c3", "c2", "c1"]);
        // Source branch untouched.
        assert_eq!(git.commit_log("feature_dev").unwrap(), ["c3", "c2", "c1"]);
    }

    #[test]
    fn test_hard_reset_truncates() {
        let git = scripted();
        git.checkout_new_branch("feature", "feature_dev").unwrap();
        git.hard_reset("c1").unwrap();
        assert_eq!(git.commit_log("feature").unwrap(), ["c1"]);
    }

    #[test]
    fn test_commit_clears_pending_replay() {
        let git = scripted();
        git.cherry_pick_no_commit("c1", "c3").unwrap();
        assert!(git.has_pending_replay());
        git.commit("squashed").unwrap();
        assert!(!git.has_pending_replay());
        assert_eq!(
            git.commit_message(&git.commit_log("feature_dev").unwrap()[0])
                .unwrap(),
            "squashed"
        );
    }

    #[test]
    fn test_delete_branch_failure_injection() {
        let git = scripted();
        git.fail_delete_branch();
        assert!(git.delete_branch("feature_dev", true).is_err());
        assert!(git.has_branch("feature_dev"));
    }

    #[test]
    fn test_commit_message_unknown_ref() {
        let git = scripted();
        assert!(git.commit_message("nope").is_err());
    }
}
