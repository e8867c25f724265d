//! Repository directories and their index overlays.

use std::{
    fs::{self, OpenOptions},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Compression, Error, Index};

/// The file name of the public index overlay.
pub const PUBLIC_INDEX_FILE: &str = "repodata";
/// The file name of the stage index overlay.
pub const STAGE_INDEX_FILE: &str = "stagedata";
/// The name of the lock file that excludes concurrent indexers.
const LOCK_FILE_NAME: &str = "repodata.lock";
/// The temporary file a new public index is written to before renaming.
const FLUSH_TEMP_FILE: &str = "repodata.new";

/// An exclusive per-repository lock.
///
/// The lock is a file created with `create_new` in the repository directory
/// and removed again on drop. Contention surfaces the operating system
/// error of the failed creation.
#[derive(Debug)]
pub struct RepositoryLock {
    /// The path to the lock file.
    path: PathBuf,
    /// The underlying file handle.
    _file: fs::File,
}

impl RepositoryLock {
    /// Acquires the lock for the repository at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Locked`] if the lock file already exists or cannot
    /// be created.
    pub fn acquire(path: &Path) -> Result<Self, Error> {
        let lock_path = path.join(LOCK_FILE_NAME);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|source| Error::Locked {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: lock_path,
            _file: file,
        })
    }
}

impl Drop for RepositoryLock {
    /// Releases the lock by removing the lock file.
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// The serialized form of one index overlay.
#[derive(Debug, Deserialize, Serialize)]
struct IndexDocument {
    /// The package records, keyed by package name.
    #[serde(default)]
    index: Index,

    /// The opaque repository metadata blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<serde_json::Value>,
}

/// An opened repository: its directory, both index overlays and the lock.
///
/// Opening acquires the repository lock first; overlay files that are not
/// present are treated as empty overlays. The metadata blob of the public
/// overlay is retained and written back with the next flush.
#[derive(Debug)]
pub struct Repository {
    /// The repository directory.
    pub path: PathBuf,
    /// The public index overlay (currently served to clients).
    pub public: Index,
    /// The stage index overlay (proposed updates).
    pub stage: Index,
    /// The metadata blob of the public overlay.
    pub meta: Option<serde_json::Value>,
    /// The held repository lock.
    _lock: RepositoryLock,
}

impl Repository {
    /// Opens the repository at `path`, locking it first.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired or an overlay file
    /// exists but cannot be read or parsed. Absent overlay files are not an
    /// error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let lock = RepositoryLock::acquire(path)?;

        let public = read_overlay(path, PUBLIC_INDEX_FILE)?;
        if public.is_none() {
            debug!("repository index '{}' is not there", path.display());
        }
        let stage = read_overlay(path, STAGE_INDEX_FILE)?;
        if stage.is_none() {
            debug!("repository stage '{}' is not there", path.display());
        }

        let (public, meta) = public
            .map(|document| (document.index, document.meta))
            .unwrap_or_default();
        Ok(Self {
            path: path.to_path_buf(),
            public,
            stage: stage.map(|document| document.index).unwrap_or_default(),
            meta,
            _lock: lock,
        })
    }

    /// Replaces the public index overlay with `index`.
    ///
    /// The document is serialized together with the retained metadata blob,
    /// compressed as requested, written to a temporary file in the
    /// repository directory and renamed over the public overlay file.
    ///
    /// # Errors
    ///
    /// Returns an error if serializing, compressing or writing fails.
    pub fn flush(&self, index: &Index, compression: Compression) -> Result<(), Error> {
        let document = IndexDocument {
            index: index.clone(),
            meta: self.meta.clone(),
        };
        let serialized =
            serde_json::to_vec(&document).map_err(|source| Error::Json {
                path: self.path.join(PUBLIC_INDEX_FILE),
                source,
            })?;
        let compressed = compression.compress(&serialized)?;

        let temp_path = self.path.join(FLUSH_TEMP_FILE);
        fs::write(&temp_path, compressed).map_err(|source| Error::IoPath {
            path: temp_path.clone(),
            context: "writing the new public index",
            source,
        })?;
        fs::rename(&temp_path, self.path.join(PUBLIC_INDEX_FILE)).map_err(|source| {
            Error::IoPath {
                path: temp_path,
                context: "renaming the new public index into place",
                source,
            }
        })
    }
}

/// Reads one overlay file, returning `None` if it does not exist.
fn read_overlay(path: &Path, file_name: &str) -> Result<Option<IndexDocument>, Error> {
    let file_path = path.join(file_name);
    let raw = match fs::read(&file_path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(Error::IoPath {
                path: file_path,
                context: "reading an index overlay",
                source,
            });
        }
    };
    let decompressed = Compression::decompress(&raw)?;
    let document =
        serde_json::from_slice(&decompressed).map_err(|source| Error::Json {
            path: file_path,
            source,
        })?;
    Ok(Some(document))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use repodb_types::Name;
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;
    use crate::IndexRecord;

    fn sample_index() -> TestResult<Index> {
        let mut index = Index::new();
        index.insert(
            Name::from_str("zlib")?,
            IndexRecord::new("zlib-1.3_1".parse()?),
        );
        Ok(index)
    }

    #[test]
    fn missing_overlays_are_empty() -> TestResult {
        let tmp = tempfile::tempdir()?;
        let repo = Repository::open(tmp.path())?;
        assert!(repo.public.is_empty());
        assert!(repo.stage.is_empty());
        assert!(repo.meta.is_none());
        Ok(())
    }

    #[rstest]
    #[case(Compression::None)]
    #[case(Compression::Gzip)]
    #[case(Compression::Zstd)]
    fn flush_then_reopen(#[case] compression: Compression) -> TestResult {
        let tmp = tempfile::tempdir()?;
        let index = sample_index()?;
        {
            let repo = Repository::open(tmp.path())?;
            repo.flush(&index, compression)?;
        }
        let reopened = Repository::open(tmp.path())?;
        assert_eq!(reopened.public, index);
        assert!(reopened.stage.is_empty());
        Ok(())
    }

    #[test]
    fn metadata_blob_is_preserved() -> TestResult {
        let tmp = tempfile::tempdir()?;
        let meta = serde_json::json!({"signed-by": "builder@example.org"});
        let document = IndexDocument {
            index: sample_index()?,
            meta: Some(meta.clone()),
        };
        fs::write(
            tmp.path().join(PUBLIC_INDEX_FILE),
            serde_json::to_vec(&document)?,
        )?;

        {
            let repo = Repository::open(tmp.path())?;
            assert_eq!(repo.meta.as_ref(), Some(&meta));
            repo.flush(&Index::new(), Compression::Gzip)?;
        }
        let reopened = Repository::open(tmp.path())?;
        assert!(reopened.public.is_empty());
        assert_eq!(reopened.meta, Some(meta));
        Ok(())
    }

    #[test]
    fn lock_excludes_a_second_open() -> TestResult {
        let tmp = tempfile::tempdir()?;
        let repo = Repository::open(tmp.path())?;
        assert!(matches!(
            Repository::open(tmp.path()),
            Err(Error::Locked { .. })
        ));
        drop(repo);
        assert!(Repository::open(tmp.path()).is_ok());
        Ok(())
    }
}
