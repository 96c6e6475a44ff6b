use std::iter::FusedIterator;

use tracing::debug;

use crate::path::FsPath;
use crate::vfs::{DirSearch, Vfs};

/* 📖 # Why does DirIter own the search handle instead of borrowing the Vfs?

Opening the search hands the iterator an exclusively-owned handle; from
then on the iterator only ever talks to that handle. Every exit path
(exhaustion, advance failure, drop) releases it exactly once, and because
the handle moves with the iterator there can never be two live owners of
one OS search. This is the scoped-acquisition discipline from the
FindFirst/FindNext/FindClose family, expressed through ownership.
*/

/// Lazy enumeration of the entries directly under one directory.
///
/// A thin range adapter: each call to [`DirEntries::iter`] opens a fresh
/// search handle and yields the directory's entries once, in OS order.
///
/// # Examples
///
/// ```no_run
/// use fskit_core::{DirEntries, FsPath, RealVfs};
///
/// let vfs = RealVfs::new(".".into());
/// for entry in &DirEntries::new(&vfs, &FsPath::new("src")) {
///     println!("{}", entry);
/// }
/// ```
#[derive(Debug)]
pub struct DirEntries<'v> {
    vfs: &'v dyn Vfs,
    root: FsPath,
}

impl<'v> DirEntries<'v> {
    pub fn new(vfs: &'v dyn Vfs, root: &FsPath) -> Self {
        Self {
            vfs,
            root: root.clone(),
        }
    }

    /// Opens a fresh search over the root and returns a single-pass
    /// iterator over its entries.
    pub fn iter(&self) -> DirIter {
        DirIter::new(self.vfs, &self.root)
    }
}

impl<'v> IntoIterator for &DirEntries<'v> {
    type Item = FsPath;
    type IntoIter = DirIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Single-pass, forward-only iterator over one directory.
///
/// The sequence is finite, produced once, and not restartable: construct
/// a fresh iterator (or call [`DirEntries::iter`] again) to re-enumerate.
/// Synthetic `.` and `..` entries are skipped transparently, inside the
/// same logical advance. A root that is not a directory, a failed open,
/// or a failed advance all degrade the iterator to its exhausted state
/// after a diagnostic; they are never surfaced as panics.
pub struct DirIter {
    root: FsPath,
    /// `None` is the exhausted (end) state; the handle is released the
    /// moment the iterator reaches it.
    search: Option<Box<dyn DirSearch>>,
}

impl DirIter {
    pub fn new(vfs: &dyn Vfs, root: &FsPath) -> Self {
        let search = match vfs.is_dir(root) {
            Ok(true) => match vfs.open_search(root) {
                Ok(search) => Some(search),
                Err(error) => {
                    debug!(root = %root, %error, "directory search failed to open");
                    None
                }
            },
            Ok(false) => {
                debug!(root = %root, "not a directory, yielding no entries");
                None
            }
            Err(error) => {
                debug!(root = %root, %error, "stat failed, yielding no entries");
                None
            }
        };
        Self {
            root: root.clone(),
            search,
        }
    }

    /// True once the sequence is over; the handle has been released.
    pub fn is_exhausted(&self) -> bool {
        self.search.is_none()
    }
}

impl Iterator for DirIter {
    type Item = FsPath;

    fn next(&mut self) -> Option<FsPath> {
        let search = self.search.as_mut()?;
        loop {
            match search.advance() {
                Ok(Some(entry)) => {
                    if entry.name == "." || entry.name == ".." {
                        continue;
                    }
                    return Some(self.root.join(&entry.name));
                }
                Ok(None) => {
                    self.search = None;
                    return None;
                }
                Err(error) => {
                    debug!(root = %self.root, %error, "directory search failed, ending iteration");
                    self.search = None;
                    return None;
                }
            }
        }
    }
}

impl FusedIterator for DirIter {}

impl std::fmt::Debug for DirIter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirIter")
            .field("root", &self.root)
            .field("exhausted", &self.is_exhausted())
            .finish()
    }
}
