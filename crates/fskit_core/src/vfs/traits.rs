use std::io::{Read, Seek, Write};
use std::sync::Arc;

use crate::dir::DirEntries;
use crate::error::{ErrorKind, FsError, FsResult};
use crate::path::FsPath;

/* 📖 # What is the Vfs capability layer?

Vfs is a trait-based abstraction over the handful of OS primitives the
path and stream subsystems need: a stat call, a directory-search triple
(open/advance/release), single-level directory creation, single-file copy,
and byte-stream open calls. Two implementations are provided:
- RealVfs: the real filesystem via std::fs
- MockVfs: an in-memory implementation for deterministic tests

Everything above the primitives (existence queries, recursive creation,
checked and recursive copies) is derived in default methods, so every
implementation gets identical semantics for free.
*/

/// Trait combining Read + Seek for read-side file handles.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Trait combining Write + Seek for write-side file handles.
pub trait WriteSeek: Write + Seek {}
impl<T: Write + Seek> WriteSeek for T {}

/// Kind bits reported by [`Vfs::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    /// Anything the OS reports that is neither a regular file nor a
    /// directory (sockets, devices, ...).
    Other,
}

/// Metadata snapshot for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub kind: FileKind,
    /// Size in bytes; zero for directories.
    pub len: u64,
}

impl FileStat {
    pub fn file(len: u64) -> Self {
        Self {
            kind: FileKind::File,
            len,
        }
    }

    pub fn directory() -> Self {
        Self {
            kind: FileKind::Directory,
            len: 0,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

/// One raw entry produced by a directory search.
///
/// The kind bit comes from the search API itself, so consumers such as
/// the recursive copy never have to re-stat each child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    /// Bare entry name, without the parent directory. May be the
    /// synthetic `.` or `..`; callers skip those.
    pub name: String,
    pub is_directory: bool,
}

/// Open directory-search resource, the FindFirst/FindNext/FindClose
/// triple behind one object. Exclusively owned by its caller; dropping it
/// releases the underlying handle exactly once.
pub trait DirSearch {
    /// Advances to the next raw entry, `Ok(None)` when exhausted.
    fn advance(&mut self) -> FsResult<Option<SearchEntry>>;
}

/// Mode for [`Vfs::open_write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Create or truncate.
    Truncate,
    /// Create if missing, write at the end.
    Append,
    /// In-place writes to an existing file, no truncation.
    Update,
}

/// Filesystem capability trait.
///
/// Implementations supply the six OS primitives; the derived operations
/// below are defined purely in terms of them.
pub trait Vfs: std::fmt::Debug + Send + Sync + 'static {
    /// Queries metadata for a path.
    ///
    /// `Ok(None)` means "not found"; any other failure (permissions, I/O)
    /// is an error.
    fn stat(&self, path: &FsPath) -> FsResult<Option<FileStat>>;

    /// Opens a directory search scoped to one directory.
    fn open_search(&self, dir: &FsPath) -> FsResult<Box<dyn DirSearch>>;

    /// Creates exactly one directory level. "Already exists" is success.
    fn create_dir(&self, path: &FsPath) -> FsResult<()>;

    /// Raw single-file copy. Precondition checks live in [`Vfs::copy`].
    fn copy_file(&self, src: &FsPath, dest: &FsPath) -> FsResult<()>;

    /// Opens a file for reading.
    fn open_read(&self, path: &FsPath) -> FsResult<Box<dyn ReadSeek>>;

    /// Opens a file for writing in the given mode.
    fn open_write(&self, path: &FsPath, mode: WriteMode) -> FsResult<Box<dyn WriteSeek>>;

    /// True when the path exists at all.
    fn exists(&self, path: &FsPath) -> FsResult<bool> {
        Ok(self.stat(path)?.is_some())
    }

    /// True when the path exists and is a regular file.
    fn is_file(&self, path: &FsPath) -> FsResult<bool> {
        Ok(self.stat(path)?.is_some_and(|stat| stat.is_file()))
    }

    /// True when the path exists and is a directory.
    fn is_dir(&self, path: &FsPath) -> FsResult<bool> {
        Ok(self.stat(path)?.is_some_and(|stat| stat.is_dir()))
    }

    /// Recursively ensures every ancestor exists, then creates the
    /// directory itself. Short-circuits when the path is already present.
    fn create_dir_all(&self, path: &FsPath) -> FsResult<()> {
        if self.exists(path)? {
            return Ok(());
        }
        if !path.is_root() {
            let parent = path.parent();
            if !self.exists(&parent)? {
                self.create_dir_all(&parent)?;
            }
        }
        self.create_dir(path)
    }

    /// Copies one file.
    ///
    /// The source must be a regular file; anything else is a
    /// precondition error. Copying a file onto itself is a no-op success.
    fn copy(&self, src: &FsPath, dest: &FsPath) -> FsResult<()> {
        if !self.is_file(src)? {
            return Err(Box::new(FsError::precondition(format!(
                "copy source is not a file: {}",
                src
            ))));
        }
        if src == dest {
            return Ok(());
        }
        self.copy_file(src, dest)
    }

    /// Recursively copies a directory tree, depth-first.
    ///
    /// The source must be a directory; `dest` is created if absent.
    /// One failed child does not stop the walk: failures are collected
    /// and reported together as [`ErrorKind::Multiple`], while the
    /// successful copies stay on disk.
    fn copy_dir_all(&self, src: &FsPath, dest: &FsPath) -> FsResult<()> {
        if !self.is_dir(src)? {
            return Err(Box::new(FsError::precondition(format!(
                "copy source is not a directory: {}",
                src
            ))));
        }
        self.create_dir(dest)?;

        let mut search = self.open_search(src)?;
        let mut errors: Vec<FsError> = Vec::new();
        loop {
            match search.advance() {
                Ok(Some(entry)) => {
                    if entry.name == "." || entry.name == ".." {
                        continue;
                    }
                    let entry_src = src.join(&entry.name);
                    let entry_dest = dest.join(&entry.name);
                    let result = if entry.is_directory {
                        self.copy_dir_all(&entry_src, &entry_dest)
                    } else {
                        self.copy(&entry_src, &entry_dest)
                    };
                    if let Err(error) = result {
                        errors.push(*error);
                    }
                }
                Ok(None) => break,
                Err(error) => {
                    // The search itself failed mid-walk; the sequence is over.
                    errors.push(*error);
                    break;
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            let count = errors.len();
            Err(Box::new(FsError::new(ErrorKind::Multiple { errors, count })))
        }
    }
}

/* 📖 # Why use Arc<dyn Vfs> with VfsHandle?

Arc enables cheap cloning of the entire Vfs implementation, allowing it to
be shared across the application (thread-safe via the dyn Vfs bounds).
VfsHandle wraps this for ergonomic Deref access and Clone support, and
avoids threading lifetime parameters through the codebase.
*/

/// Handle to a Vfs implementation, enabling shared ownership.
///
/// # Examples
///
/// ```no_run
/// use fskit_core::{RealVfs, VfsHandle};
///
/// let vfs = VfsHandle::new(RealVfs::new(".".into()));
/// let vfs_clone = vfs.clone(); // Cheap clone, shares the same implementation
/// ```
#[derive(Debug, Clone)]
pub struct VfsHandle(Arc<dyn Vfs>);

impl VfsHandle {
    /// Creates a new VfsHandle from a Vfs implementation.
    pub fn new(vfs: impl Vfs + 'static) -> Self {
        Self(Arc::new(vfs))
    }

    /// Returns a lazy enumeration of the entries directly under `root`.
    pub fn entries(&self, root: &FsPath) -> DirEntries<'_> {
        DirEntries::new(&*self.0, root)
    }
}

impl std::ops::Deref for VfsHandle {
    type Target = dyn Vfs;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
