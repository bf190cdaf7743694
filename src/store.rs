use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::schema::NormalizedMatch;
use crate::tabular::{self, TRANSFORM_HINT};

/// How `MatchStore::load` treats a table it has read before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Always re-read the file.
    Reload,
    /// Reuse the last read while the file's modification time and length are
    /// unchanged.
    ByModifiedTime,
}

impl FromStr for LoadPolicy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reload" | "always" => Ok(LoadPolicy::Reload),
            "mtime" | "cache" => Ok(LoadPolicy::ByModifiedTime),
            other => Err(PipelineError::InvalidConfig(format!(
                "unknown load policy {other:?} (expected reload or mtime)"
            ))),
        }
    }
}

#[derive(Debug)]
struct Cached {
    path: PathBuf,
    modified: Option<SystemTime>,
    len: u64,
    matches: Vec<NormalizedMatch>,
}

/// Holds the normalized table between dashboard refreshes.
#[derive(Debug)]
pub struct MatchStore {
    policy: LoadPolicy,
    cached: Option<Cached>,
    reads: usize,
}

impl MatchStore {
    pub fn new(policy: LoadPolicy) -> Self {
        Self {
            policy,
            cached: None,
            reads: 0,
        }
    }

    /// Number of times the file was actually parsed.
    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn load(&mut self, path: &Path) -> Result<&[NormalizedMatch]> {
        let (modified, len) = match fs::metadata(path) {
            Ok(meta) => (meta.modified().ok(), meta.len()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                self.cached = None;
                return Err(PipelineError::MissingInput {
                    path: path.to_path_buf(),
                    hint: TRANSFORM_HINT,
                });
            }
            Err(err) => return Err(err.into()),
        };

        let fresh = match (&self.cached, self.policy) {
            (Some(c), LoadPolicy::ByModifiedTime) => {
                c.path == path && c.modified.is_some() && c.modified == modified && c.len == len
            }
            _ => false,
        };

        if !fresh {
            let matches = tabular::read_normalized(path)?;
            self.reads += 1;
            debug!(path = %path.display(), rows = matches.len(), "loaded normalized table");
            self.cached = Some(Cached {
                path: path.to_path_buf(),
                modified,
                len,
                matches,
            });
        }

        Ok(self
            .cached
            .as_ref()
            .map(|c| c.matches.as_slice())
            .unwrap_or(&[]))
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
