use std::fs::File;

/// Exclusive hold on a store, released on drop.
///
/// For a [`crate::JsonFileStore`] this is an OS file lock, so it also excludes other
/// processes working on the same data directory.
#[derive(Debug, Default)]
pub struct StoreLock {
    _file: Option<File>,
}

impl StoreLock {
    /// Guard for stores that never leave the current process.
    pub fn in_process() -> Self {
        Self::default()
    }

    pub(crate) fn file(file: File) -> Self {
        Self { _file: Some(file) }
    }
}
