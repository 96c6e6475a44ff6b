use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{Cursor, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};

use crate::error::{FsError, FsResult};
use crate::path::FsPath;

use super::traits::{
    DirSearch, FileKind, FileStat, ReadSeek, SearchEntry, Vfs, WriteMode, WriteSeek,
};

/* 📖 # Why use HashMap storage for MockVfs?

MockVfs keeps files and directories in memory behind Arc<Mutex<T>>:
1. **Speed**: no filesystem I/O, deterministic and fast for unit tests
2. **Isolation**: no side effects on the real filesystem
3. **Control**: easy to stage exact trees, including entry kinds the real
   filesystem makes awkward to create (see add_other)
4. **Thread-safe**: Mutex allows concurrent test execution

Searches emit the synthetic "." and ".." entries the OS search APIs
produce, so the iterator's skipping logic is exercised by every mock test.
*/

/// In-memory Vfs implementation for testing.
///
/// # Examples
///
/// ```
/// use fskit_core::{FsPath, MockVfs, Vfs};
///
/// let mock = MockVfs::new();
/// mock.add_file(FsPath::from("test.txt"), b"content".to_vec());
/// assert!(mock.is_file(&FsPath::from("test.txt")).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockVfs {
    files: Arc<Mutex<HashMap<FsPath, Vec<u8>>>>,
    dirs: Arc<Mutex<HashSet<FsPath>>>,
    others: Arc<Mutex<HashSet<FsPath>>>,
}

impl MockVfs {
    /// Creates a new empty MockVfs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    pub fn add_file(&self, path: FsPath, content: Vec<u8>) {
        self.files.lock().unwrap().insert(path, content);
    }

    /// Adds a directory.
    pub fn add_dir(&self, path: FsPath) {
        self.dirs.lock().unwrap().insert(path);
    }

    /// Adds an entry that is neither a file nor a directory, like a
    /// socket or device node. Useful for exercising failure paths.
    pub fn add_other(&self, path: FsPath) {
        self.others.lock().unwrap().insert(path);
    }

    /// Returns a file's current content, if present.
    pub fn file_contents(&self, path: &FsPath) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    fn is_child_of(child: &FsPath, dir: &FsPath) -> bool {
        let rest = if dir.is_empty() {
            Some(child.as_str())
        } else if dir.is_root() {
            child.as_str().strip_prefix('/')
        } else {
            child
                .as_str()
                .strip_prefix(dir.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
        };
        matches!(rest, Some(rest) if !rest.is_empty() && !rest.contains('/'))
    }

    /// Snapshot of the direct children of `dir`, sorted by name for
    /// deterministic iteration order.
    fn children_of(&self, dir: &FsPath) -> Vec<SearchEntry> {
        let files = self.files.lock().unwrap();
        let dirs = self.dirs.lock().unwrap();
        let others = self.others.lock().unwrap();

        let mut entries: Vec<SearchEntry> = Vec::new();
        for path in files.keys().chain(others.iter()) {
            if Self::is_child_of(path, dir) {
                entries.push(SearchEntry {
                    name: path.file_name().to_string(),
                    is_directory: false,
                });
            }
        }
        for path in dirs.iter() {
            if Self::is_child_of(path, dir) {
                entries.push(SearchEntry {
                    name: path.file_name().to_string(),
                    is_directory: true,
                });
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    fn not_found(path: &FsPath) -> Box<FsError> {
        Box::new(FsError::file(
            path,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such entry: {}", path),
            ),
        ))
    }
}

impl Vfs for MockVfs {
    fn stat(&self, path: &FsPath) -> FsResult<Option<FileStat>> {
        // The base directory itself always exists
        if path.is_empty() || path.is_root() {
            return Ok(Some(FileStat::directory()));
        }
        if let Some(content) = self.files.lock().unwrap().get(path) {
            return Ok(Some(FileStat::file(content.len() as u64)));
        }
        if self.dirs.lock().unwrap().contains(path) {
            return Ok(Some(FileStat::directory()));
        }
        if self.others.lock().unwrap().contains(path) {
            return Ok(Some(FileStat {
                kind: FileKind::Other,
                len: 0,
            }));
        }
        Ok(None)
    }

    fn open_search(&self, dir: &FsPath) -> FsResult<Box<dyn DirSearch>> {
        if !self.is_dir(dir)? {
            return Err(Self::not_found(dir));
        }
        // FindFirst-style searches surface the synthetic dot entries
        let mut entries = VecDeque::from([
            SearchEntry {
                name: ".".to_string(),
                is_directory: true,
            },
            SearchEntry {
                name: "..".to_string(),
                is_directory: true,
            },
        ]);
        entries.extend(self.children_of(dir));
        Ok(Box::new(MockSearch { entries }))
    }

    fn create_dir(&self, path: &FsPath) -> FsResult<()> {
        self.dirs.lock().unwrap().insert(path.clone());
        Ok(())
    }

    fn copy_file(&self, src: &FsPath, dest: &FsPath) -> FsResult<()> {
        let mut files = self.files.lock().unwrap();
        let content = files.get(src).ok_or_else(|| Self::not_found(src))?.clone();
        files.insert(dest.clone(), content);
        Ok(())
    }

    fn open_read(&self, path: &FsPath) -> FsResult<Box<dyn ReadSeek>> {
        let content = self
            .files
            .lock()
            .unwrap()
            .get(path)
            .ok_or_else(|| Self::not_found(path))?
            .clone();
        Ok(Box::new(Cursor::new(content)))
    }

    fn open_write(&self, path: &FsPath, mode: WriteMode) -> FsResult<Box<dyn WriteSeek>> {
        let existing = self.files.lock().unwrap().get(path).cloned();
        let mut cursor = match mode {
            WriteMode::Truncate => Cursor::new(Vec::new()),
            WriteMode::Append => Cursor::new(existing.unwrap_or_default()),
            WriteMode::Update => Cursor::new(existing.ok_or_else(|| Self::not_found(path))?),
        };
        if mode == WriteMode::Append {
            // Position at end of the existing content
            cursor.seek(SeekFrom::End(0)).map_err(|error| {
                Box::new(FsError::file(path, error))
            })?;
        }
        Ok(Box::new(MockWriter {
            path: path.clone(),
            files: Arc::clone(&self.files),
            cursor,
        }))
    }
}

/// Snapshot directory search over the mock storage.
struct MockSearch {
    entries: VecDeque<SearchEntry>,
}

impl DirSearch for MockSearch {
    fn advance(&mut self) -> FsResult<Option<SearchEntry>> {
        Ok(self.entries.pop_front())
    }
}

/// Write handle that commits its buffer back into the mock storage on
/// flush and on drop.
struct MockWriter {
    path: FsPath,
    files: Arc<Mutex<HashMap<FsPath, Vec<u8>>>>,
    cursor: Cursor<Vec<u8>>,
}

impl MockWriter {
    fn commit(&self) {
        self.files
            .lock()
            .unwrap()
            .insert(self.path.clone(), self.cursor.get_ref().clone());
    }
}

impl Write for MockWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.cursor.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.commit();
        Ok(())
    }
}

impl Seek for MockWriter {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl Drop for MockWriter {
    fn drop(&mut self) {
        self.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Read;

    #[test]
    fn test_stat_kinds() {
        let mock = MockVfs::new();
        mock.add_file(FsPath::from("f.txt"), b"abc".to_vec());
        mock.add_dir(FsPath::from("d"));
        mock.add_other(FsPath::from("s.sock"));

        let file = mock.stat(&FsPath::from("f.txt")).unwrap().unwrap();
        assert!(file.is_file());
        assert_eq!(file.len, 3);

        assert!(mock.stat(&FsPath::from("d")).unwrap().unwrap().is_dir());
        assert_eq!(
            mock.stat(&FsPath::from("s.sock")).unwrap().unwrap().kind,
            FileKind::Other
        );
        assert!(mock.stat(&FsPath::from("missing")).unwrap().is_none());
    }

    #[test]
    fn test_base_dir_always_exists() {
        let mock = MockVfs::new();
        assert!(mock.is_dir(&FsPath::from("")).unwrap());
        assert!(mock.is_dir(&FsPath::from("/")).unwrap());
    }

    #[test]
    fn test_search_emits_dot_entries_then_children() {
        let mock = MockVfs::new();
        mock.add_dir(FsPath::from("root"));
        mock.add_file(FsPath::from("root/b"), b"".to_vec());
        mock.add_file(FsPath::from("root/a"), b"".to_vec());

        let mut search = mock.open_search(&FsPath::from("root")).unwrap();
        let names: Vec<String> = std::iter::from_fn(|| search.advance().unwrap())
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, vec![".", "..", "a", "b"]);
    }

    #[test]
    fn test_search_only_lists_direct_children() {
        let mock = MockVfs::new();
        mock.add_dir(FsPath::from("root"));
        mock.add_dir(FsPath::from("root/sub"));
        mock.add_file(FsPath::from("root/sub/deep.txt"), b"".to_vec());

        let mut search = mock.open_search(&FsPath::from("root")).unwrap();
        let mut names = Vec::new();
        while let Some(entry) = search.advance().unwrap() {
            if entry.name != "." && entry.name != ".." {
                names.push((entry.name, entry.is_directory));
            }
        }
        assert_eq!(names, vec![("sub".to_string(), true)]);
    }

    #[test]
    fn test_open_search_missing_dir_fails() {
        let mock = MockVfs::new();
        assert!(mock.open_search(&FsPath::from("missing")).is_err());
    }

    #[test]
    fn test_read_round_trip() {
        let mock = MockVfs::new();
        mock.add_file(FsPath::from("data.bin"), vec![1, 2, 3]);

        let mut reader = mock.open_read(&FsPath::from("data.bin")).unwrap();
        let mut content = Vec::new();
        reader.read_to_end(&mut content).unwrap();
        assert_eq!(content, vec![1, 2, 3]);
    }

    #[test]
    fn test_read_missing_file_fails() {
        let mock = MockVfs::new();
        assert!(mock.open_read(&FsPath::from("missing")).is_err());
    }

    #[test]
    fn test_writer_commits_on_drop() {
        let mock = MockVfs::new();
        let mut writer = mock
            .open_write(&FsPath::from("out.txt"), WriteMode::Truncate)
            .unwrap();
        writer.write_all(b"committed").unwrap();
        drop(writer);

        assert_eq!(
            mock.file_contents(&FsPath::from("out.txt")),
            Some(b"committed".to_vec())
        );
    }

    #[test]
    fn test_writer_truncate_discards_existing() {
        let mock = MockVfs::new();
        mock.add_file(FsPath::from("out.txt"), b"old".to_vec());

        let mut writer = mock
            .open_write(&FsPath::from("out.txt"), WriteMode::Truncate)
            .unwrap();
        writer.write_all(b"new").unwrap();
        drop(writer);

        assert_eq!(
            mock.file_contents(&FsPath::from("out.txt")),
            Some(b"new".to_vec())
        );
    }

    #[test]
    fn test_writer_append_preserves_existing() {
        let mock = MockVfs::new();
        mock.add_file(FsPath::from("log.txt"), b"one\n".to_vec());

        let mut writer = mock
            .open_write(&FsPath::from("log.txt"), WriteMode::Append)
            .unwrap();
        writer.write_all(b"two\n").unwrap();
        drop(writer);

        assert_eq!(
            mock.file_contents(&FsPath::from("log.txt")),
            Some(b"one\ntwo\n".to_vec())
        );
    }

    #[test]
    fn test_writer_update_requires_existing() {
        let mock = MockVfs::new();
        assert!(
            mock.open_write(&FsPath::from("missing"), WriteMode::Update)
                .is_err()
        );
    }

    #[test]
    fn test_copy_dir_all_partial_failure() {
        let mock = MockVfs::new();
        mock.add_dir(FsPath::from("src"));
        mock.add_file(FsPath::from("src/good.txt"), b"ok".to_vec());
        // A socket-like entry cannot be file-copied
        mock.add_other(FsPath::from("src/weird.sock"));

        let err = mock
            .copy_dir_all(&FsPath::from("src"), &FsPath::from("dest"))
            .unwrap_err();
        match err.kind() {
            ErrorKind::Multiple { count, .. } => assert_eq!(*count, 1),
            other => panic!("expected Multiple, got {:?}", other),
        }

        // The healthy sibling was still copied
        assert_eq!(
            mock.file_contents(&FsPath::from("dest/good.txt")),
            Some(b"ok".to_vec())
        );
    }
}
