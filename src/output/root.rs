//! Output root resolution
//!
//! Each splitting run writes into its own directory. The resolver decides
//! where that directory lives; the splitter creates it.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};

/// Last stamp handed out by any [`TimestampedOutputRoot`] in this process
static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// Trait for choosing the output root of a run
pub trait OutputRootResolver: Send + Sync {
    /// Resolve the directory for one run
    fn resolve(&self) -> PathBuf;
}

/// Resolves `<base>/<epoch millis>`, unique within the process
#[derive(Debug, Clone)]
pub struct TimestampedOutputRoot {
    base: PathBuf,
}

impl TimestampedOutputRoot {
    /// Create a resolver below `base`
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    /// Base directory
    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl OutputRootResolver for TimestampedOutputRoot {
    fn resolve(&self) -> PathBuf {
        self.base.join(next_stamp().to_string())
    }
}

/// Current epoch millis, bumped past the previous stamp on collision
fn next_stamp() -> i64 {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_STAMP
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or_else(|last| last);
    now.max(previous + 1)
}

/// Always resolves to the same directory
#[derive(Debug, Clone)]
pub struct FixedOutputRoot {
    path: PathBuf,
}

impl FixedOutputRoot {
    /// Create a resolver for `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl OutputRootResolver for FixedOutputRoot {
    fn resolve(&self) -> PathBuf {
        self.path.clone()
    }
}
