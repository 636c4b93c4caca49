use crate::error::{GitRelError, Result};

/// Suffix that marks a branch as a development branch.
pub const DEV_SUFFIX: &str = "_dev";

/// A development branch and the release branch derived from it.
///
/// The release name is a pure function of the development name: strip the
/// `_dev` suffix. The two names are always distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPair {
    pub dev: String,
    pub release: String,
}

impl BranchPair {
    /// Derive the pair from a current-branch name.
    ///
    /// Fails with [`GitRelError::InvalidBranchName`] when the name does not
    /// follow the `<release>_dev` convention or strips down to nothing.
    pub fn from_dev(name: &str) -> Result<Self> {
        let release = name
            .strip_suffix(DEV_SUFFIX)
            .ok_or_else(|| GitRelError::InvalidBranchName(name.to_string()))?;
        if release.is_empty() {
            return Err(GitRelError::InvalidBranchName(name.to_string()));
        }

        Ok(BranchPair {
            dev: name.to_string(),
            release: release.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_dev_suffix() {
        let pair = BranchPair::from_dev("feature_dev").unwrap();
        assert_eq!(pair.dev, "feature_dev");
        assert_eq!(pair.release, "feature");
    }

    #[test]
    fn test_rejects_branch_without_suffix() {
        assert!(matches!(
            BranchPair::from_dev("main"),
            Err(GitRelError::InvalidBranchName(_))
        ));
    }

    #[test]
    fn test_rejects_bare_suffix() {
        assert!(matches!(
            BranchPair::from_dev("_dev"),
            Err(GitRelError::InvalidBranchName(_))
        ));
    }

    #[test]
    fn test_suffix_only_matches_at_end() {
        assert!(BranchPair::from_dev("dev_feature").is_err());
        let pair = BranchPair::from_dev("my_dev_branch_dev").unwrap();
        assert_eq!(pair.release, "my_dev_branch");
    }
}
