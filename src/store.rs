use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{GitRelError, Result};

/// File name of the cut-point store inside the repository's `.git` directory.
pub const STORE_FILE: &str = "gitrel.cfg";

/// Persistent mapping from development-branch name to the last-used cut-point
/// commit.
///
/// The on-disk layout is alternating newline-delimited lines:
///
/// ```text
/// branch_name_1
/// commit_id_1
/// branch_name_2
/// commit_id_2
/// ```
///
/// No header, no checksum. An odd number of lines means the file is corrupt
/// and loading fails rather than proceeding with half-parsed state.
///
/// The map is mutex-guarded so the store stays safe to share if the workflow
/// is ever parallelized; under current single-actor usage the lock is
/// uncontended.
#[derive(Debug)]
pub struct CutpointStore {
    path: PathBuf,
    data: Mutex<BTreeMap<String, String>>,
}

impl CutpointStore {
    /// Load the store from `path`.
    ///
    /// A missing file yields an empty store. Any other read failure, or a
    /// malformed file, is fatal.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(raw) => parse_pairs(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(GitRelError::store(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(CutpointStore {
            path,
            data: Mutex::new(data),
        })
    }

    /// Create an empty store that will save to `path`. Used by tests.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        CutpointStore {
            path: path.into(),
            data: Mutex::new(BTreeMap::new()),
        }
    }

    /// Look up the stored cut-point for a branch.
    pub fn get(&self, branch: &str) -> Option<String> {
        self.data.lock().unwrap().get(branch).cloned()
    }

    /// Insert or overwrite the cut-point for a branch. In-memory only until
    /// [`save`](Self::save) runs.
    pub fn put(&self, branch: impl Into<String>, commit: impl Into<String>) {
        self.data
            .lock()
            .unwrap()
            .insert(branch.into(), commit.into());
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.data.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize every record back to the file, overwriting whatever was
    /// there. Record order on disk follows the map order and carries no
    /// meaning.
    ///
    /// Called exactly once per run, after the workflow returns, so a
    /// cut-point supplied on the command line is remembered even when a later
    /// step failed.
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().unwrap();
        let mut lines = Vec::with_capacity(data.len() * 2);
        for (branch, commit) in data.iter() {
            lines.push(branch.as_str());
            lines.push(commit.as_str());
        }
        fs::write(&self.path, lines.join("\n")).map_err(|e| {
            GitRelError::store(format!("cannot write {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }
}

fn parse_pairs(raw: &str) -> Result<BTreeMap<String, String>> {
    // A 0-byte file carries zero records. A single trailing newline after
    // the last pair is tolerated.
    let mut lines: Vec<&str> = raw.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    if lines.len() % 2 != 0 {
        return Err(GitRelError::store(format!(
            "corrupt store: odd line count ({})",
            lines.len()
        )));
    }

    let mut map = BTreeMap::new();
    for pair in lines.chunks(2) {
        map.insert(pair[0].to_string(), pair[1].to_string());
    }
    Ok(map)
}
