use thiserror::Error;

/// Unified error type for gitrel operations
///
/// Every failure is fatal: the workflow has no retry policy, so each variant
/// aborts the remaining steps and surfaces to the user after the cleanup
/// guards have run.
#[derive(Error, Debug)]
pub enum GitRelError {
    #[error("invalid current branch '{0}': expected a name ending in '_dev'")]
    InvalidBranchName(String),

    #[error("no cut-point for branch '{0}': pass the newest commit you don't want released")]
    NoCutPoint(String),

    #[error("invalid cut-point '{0}': not found in the current branch's history")]
    InvalidCutPoint(String),

    #[error("cut-point '{0}' is already the branch head: nothing to release")]
    CutPointIsHead(String),

    #[error("cannot delete release branch '{branch}' (are you checked out on it?): {output}")]
    BranchBusy { branch: String, output: String },

    #[error("git {command} failed: {output}")]
    VcsCommandFailed { command: String, output: String },

    #[error("push of '{branch}' failed (the local release branch is intact): {output}")]
    PublishFailed { branch: String, output: String },

    #[error("cut-point store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in gitrel
pub type Result<T> = std::result::Result<T, GitRelError>;

impl GitRelError {
    /// Create a store error with context
    pub fn store(msg: impl Into<String>) -> Self {
        GitRelError::Store(msg.into())
    }

    /// Create a failed-command error from a git subcommand and its output
    pub fn vcs(command: impl Into<String>, output: impl Into<String>) -> Self {
        GitRelError::VcsCommandFailed {
            command: command.into(),
            output: output.into(),
        }
    }
}
