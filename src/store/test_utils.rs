#![allow(missing_docs)]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A unique path under the OS temp directory that is removed on drop.
pub(crate) struct TempPath {
    root: PathBuf,
    path: PathBuf,
}

impl TempPath {
    pub(crate) fn new(file_name: &str) -> Self {
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let root = std::env::temp_dir().join(format!(
            "fintrack_rs_test_{}_{}",
            std::process::id(),
            id
        ));
        fs::create_dir_all(&root).expect("Could not create temp directory");
        let path = root.join(file_name);

        Self { root, path }
    }

    pub(crate) fn as_path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempPath {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}
