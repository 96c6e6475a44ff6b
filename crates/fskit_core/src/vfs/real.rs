use std::fs;
use std::path::PathBuf;

use tracing::{debug, instrument};

use crate::error::{FsError, FsResult};
use crate::path::FsPath;

use super::traits::{
    DirSearch, FileKind, FileStat, ReadSeek, SearchEntry, Vfs, WriteMode, WriteSeek,
};

/* 📖 # Why use std::fs instead of async or other crates?

The core is a synchronous, blocking layer by design: every operation
holds the calling thread until the OS call completes. std::fs is:
- Sufficient for synchronous file operations
- Requires no external dependencies beyond what we already use
- Well-tested and reliable

This keeps the codebase simple and maintainable.
*/

/// Concrete Vfs implementation over the real filesystem.
///
/// Relative paths resolve against a configured base directory; absolute
/// paths are used as-is. Metadata follows symbolic links exactly as far
/// as the OS stat call does.
#[derive(Debug)]
pub struct RealVfs {
    base_dir: PathBuf,
}

impl RealVfs {
    /// Creates a new RealVfs with the given base directory.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Resolves an FsPath to a filesystem path.
    ///
    /// `PathBuf::join` replaces the base when the argument is absolute,
    /// which is exactly the resolution rule we want.
    fn resolve(&self, path: &FsPath) -> PathBuf {
        self.base_dir.join(path.as_std_path())
    }
}

impl Vfs for RealVfs {
    #[instrument(skip(self), fields(path = %path))]
    fn stat(&self, path: &FsPath) -> FsResult<Option<FileStat>> {
        let resolved = self.resolve(path);
        match fs::metadata(&resolved) {
            Ok(meta) => {
                let kind = if meta.is_file() {
                    FileKind::File
                } else if meta.is_dir() {
                    FileKind::Directory
                } else {
                    FileKind::Other
                };
                Ok(Some(FileStat {
                    kind,
                    len: meta.len(),
                }))
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) => {
                debug!(%error, "stat failed");
                Err(Box::new(FsError::file(path, error)))
            }
        }
    }

    #[instrument(skip(self), fields(dir = %dir))]
    fn open_search(&self, dir: &FsPath) -> FsResult<Box<dyn DirSearch>> {
        let resolved = self.resolve(dir);
        let inner = fs::read_dir(&resolved).map_err(|error| {
            debug!(%error, "failed to open directory search");
            Box::new(FsError::file(dir, error))
        })?;
        Ok(Box::new(RealSearch {
            dir: dir.clone(),
            inner,
        }))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn create_dir(&self, path: &FsPath) -> FsResult<()> {
        let resolved = self.resolve(path);
        match fs::create_dir(&resolved) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(error) => {
                debug!(%error, "failed to create directory");
                Err(Box::new(FsError::file(path, error)))
            }
        }
    }

    #[instrument(skip(self), fields(src = %src, dest = %dest))]
    fn copy_file(&self, src: &FsPath, dest: &FsPath) -> FsResult<()> {
        fs::copy(self.resolve(src), self.resolve(dest)).map_err(|error| {
            debug!(%error, "failed to copy file");
            Box::new(FsError::file(src, error))
        })?;
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    fn open_read(&self, path: &FsPath) -> FsResult<Box<dyn ReadSeek>> {
        let file = fs::File::open(self.resolve(path)).map_err(|error| {
            debug!(%error, "failed to open file for reading");
            Box::new(FsError::file(path, error))
        })?;
        Ok(Box::new(file))
    }

    #[instrument(skip(self), fields(path = %path, mode = ?mode))]
    fn open_write(&self, path: &FsPath, mode: WriteMode) -> FsResult<Box<dyn WriteSeek>> {
        let resolved = self.resolve(path);
        let mut options = fs::OpenOptions::new();
        match mode {
            WriteMode::Truncate => options.write(true).create(true).truncate(true),
            WriteMode::Append => options.append(true).create(true),
            // Update writes in place and requires the file to exist
            WriteMode::Update => options.write(true),
        };
        let file = options.open(&resolved).map_err(|error| {
            debug!(%error, "failed to open file for writing");
            Box::new(FsError::file(path, error))
        })?;
        Ok(Box::new(file))
    }
}

/// Directory search over `std::fs::ReadDir`.
///
/// ReadDir is the platform search handle here; dropping this struct
/// releases it exactly once.
struct RealSearch {
    dir: FsPath,
    inner: fs::ReadDir,
}

impl DirSearch for RealSearch {
    fn advance(&mut self) -> FsResult<Option<SearchEntry>> {
        match self.inner.next() {
            None => Ok(None),
            Some(Ok(entry)) => {
                let name = entry.file_name().to_string_lossy().into_owned();
                let is_directory = entry
                    .file_type()
                    .map_err(|error| Box::new(FsError::file(&self.dir, error)))?
                    .is_dir();
                Ok(Some(SearchEntry { name, is_directory }))
            }
            Some(Err(error)) => Err(Box::new(FsError::file(&self.dir, error))),
        }
    }
}
