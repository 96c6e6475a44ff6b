/* 📖 # What lives in the vfs module?

The capability trait over OS filesystem primitives and its two
implementations. Code above this module depends on the Vfs abstraction,
not on std::fs directly, so every operation built on it (directory
iteration, streams, whole-file helpers) can be tested deterministically
against MockVfs and runs unchanged against RealVfs.
*/

pub mod mock;
pub mod real;
mod traits;

pub use mock::MockVfs;
pub use real::RealVfs;
pub use traits::{
    DirSearch, FileKind, FileStat, ReadSeek, SearchEntry, Vfs, VfsHandle, WriteMode, WriteSeek,
};
