/* 📖 # Why have fskit_core as a core library?
fskit_core provides the path value type, the Vfs capability layer, and the
stream primitives used by every consumer. Keeping them in one crate ensures
a single error-handling convention and one place where OS access happens.
*/

pub mod dir;
pub mod error;
pub mod file;
pub mod path;
pub mod stream;
pub mod tracing;
pub mod vfs;

// Re-export commonly used types for convenience
pub use dir::{DirEntries, DirIter};
pub use error::{FsError, FsResult, ResultExt};
pub use path::{FsPath, SEPARATOR};
pub use stream::{StreamReader, StreamWriter};
pub use vfs::{
    DirSearch, FileKind, FileStat, MockVfs, RealVfs, SearchEntry, Vfs, VfsHandle, WriteMode,
};
