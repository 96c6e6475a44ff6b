use std::io::{Seek, SeekFrom, Write};

use tracing::instrument;

use crate::err;
use crate::error::{FsError, FsResult, ResultExt};
use crate::path::FsPath;
use crate::stream::{StreamReader, StreamWriter};
use crate::vfs::{Vfs, WriteMode};

/* 📖 # Why whole-file helpers on top of the streams?

Most call sites want "give me the file" or "replace the file" and do not
care about cursors. These free functions wrap StreamReader/StreamWriter so
the open/close protocol lives in exactly one place, while block-level
access (read_block/write_block) stays available for code that patches
files in place.
*/

fn open_reader(vfs: &dyn Vfs, path: &FsPath) -> FsResult<StreamReader> {
    let reader = StreamReader::open(vfs, path);
    if !reader.is_open() {
        return Err(err!("failed to open file for reading: {path}"));
    }
    Ok(reader)
}

/// Reads the entire file into a byte vector.
#[instrument(skip(vfs))]
pub fn read_bytes(vfs: &dyn Vfs, path: &FsPath) -> FsResult<Vec<u8>> {
    let mut reader = open_reader(vfs, path)?;
    let mut data = Vec::new();
    reader.read_all(&mut data)?;
    Ok(data)
}

/// Reads the entire file as UTF-8 text.
#[instrument(skip(vfs))]
pub fn read_text(vfs: &dyn Vfs, path: &FsPath) -> FsResult<String> {
    let data = read_bytes(vfs, path)?;
    String::from_utf8(data).map_err(|_| err!("file is not valid UTF-8: {path}"))
}

/// Reads the file line by line, without terminators.
#[instrument(skip(vfs))]
pub fn read_lines(vfs: &dyn Vfs, path: &FsPath) -> FsResult<Vec<String>> {
    let mut reader = open_reader(vfs, path)?;
    let mut lines = Vec::new();
    while let Some(line) = reader.read_line()? {
        lines.push(line);
    }
    Ok(lines)
}

/// Reads `size` bytes starting at `offset`.
/// The range must lie entirely within the file.
#[instrument(skip(vfs))]
pub fn read_block(vfs: &dyn Vfs, path: &FsPath, size: u64, offset: u64) -> FsResult<Vec<u8>> {
    let mut reader = open_reader(vfs, path)?;
    let end = offset
        .checked_add(size)
        .ok_or_else(|| err!("block range overflows: offset {offset}, size {size}"))?;
    if end > reader.size() {
        return Err(err!(
            "block out of range: offset {offset}, size {size}, file size {}: {path}",
            reader.size()
        ));
    }
    reader.seek(offset)?;
    let mut data = Vec::new();
    reader.read(&mut data, size as usize)?;
    Ok(data)
}

/// Returns the file size in bytes.
#[instrument(skip(vfs))]
pub fn query_size(vfs: &dyn Vfs, path: &FsPath) -> FsResult<u64> {
    let reader = open_reader(vfs, path)?;
    Ok(reader.size())
}

fn open_writer(vfs: &dyn Vfs, path: &FsPath) -> FsResult<StreamWriter> {
    let writer = StreamWriter::open(vfs, path, false);
    if !writer.is_open() {
        return Err(err!("failed to open file for writing: {path}"));
    }
    Ok(writer)
}

/// Replaces the file contents with the given bytes.
#[instrument(skip(vfs, data))]
pub fn write_bytes(vfs: &dyn Vfs, path: &FsPath, data: &[u8]) -> FsResult<()> {
    let mut writer = open_writer(vfs, path)?;
    if !data.is_empty() {
        writer.write(data)?;
    }
    writer.close()
}

/// Replaces the file contents with the given text, guaranteeing exactly
/// one trailing newline. Empty text is rejected.
#[instrument(skip(vfs, text))]
pub fn write_text(vfs: &dyn Vfs, path: &FsPath, text: &str) -> FsResult<()> {
    if text.is_empty() {
        return Err(err!("refusing to write empty text: {path}"));
    }
    let mut writer = open_writer(vfs, path)?;
    writer.write(text.as_bytes())?;
    if !text.ends_with('\n') {
        writer.write(b"\n")?;
    }
    writer.close()
}

/// Replaces the file contents with the given lines, one `\n` terminator
/// each.
#[instrument(skip(vfs, lines))]
pub fn write_lines(vfs: &dyn Vfs, path: &FsPath, lines: &[String]) -> FsResult<()> {
    let mut writer = open_writer(vfs, path)?;
    for line in lines {
        writer.write_line(line)?;
    }
    writer.close()
}

/// Overwrites `data.len()` bytes in place starting at `offset`, leaving
/// the rest of the file untouched. The range must lie entirely within
/// the existing file.
#[instrument(skip(vfs, data))]
pub fn write_block(vfs: &dyn Vfs, path: &FsPath, data: &[u8], offset: u64) -> FsResult<()> {
    let file_size = query_size(vfs, path).context("write_block")?;
    let end = offset
        .checked_add(data.len() as u64)
        .ok_or_else(|| err!("block range overflows: offset {offset}, size {}", data.len()))?;
    if end > file_size {
        return Err(err!(
            "block out of range: offset {offset}, size {}, file size {file_size}: {path}",
            data.len()
        ));
    }
    let mut stream = vfs.open_write(path, WriteMode::Update)?;
    stream
        .seek(SeekFrom::Start(offset))
        .map_err(|error| Box::new(FsError::file(path, error)))?;
    stream
        .write_all(data)
        .and_then(|()| stream.flush())
        .map_err(|error| Box::new(FsError::file(path, error)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::MockVfs;

    fn mock_with(path: &str, content: &[u8]) -> MockVfs {
        let mock = MockVfs::new();
        mock.add_file(FsPath::from(path), content.to_vec());
        mock
    }

    #[test]
    fn test_read_bytes() {
        let mock = mock_with("data.bin", b"\x00\x01\x02");
        assert_eq!(
            read_bytes(&mock, &FsPath::from("data.bin")).unwrap(),
            b"\x00\x01\x02"
        );
    }

    #[test]
    fn test_read_bytes_missing_file() {
        let mock = MockVfs::new();
        assert!(read_bytes(&mock, &FsPath::from("missing")).is_err());
    }

    #[test]
    fn test_read_text() {
        let mock = mock_with("hello.txt", b"hello\n");
        assert_eq!(read_text(&mock, &FsPath::from("hello.txt")).unwrap(), "hello\n");
    }

    #[test]
    fn test_read_text_invalid_utf8() {
        let mock = mock_with("bad.bin", b"\xff\xfe");
        assert!(read_text(&mock, &FsPath::from("bad.bin")).is_err());
    }

    #[test]
    fn test_read_lines() {
        let mock = mock_with("lines.txt", b"a\nb\nc\n");
        assert_eq!(
            read_lines(&mock, &FsPath::from("lines.txt")).unwrap(),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn test_read_block() {
        let mock = mock_with("data.bin", b"0123456789");
        assert_eq!(
            read_block(&mock, &FsPath::from("data.bin"), 4, 3).unwrap(),
            b"3456"
        );
    }

    #[test]
    fn test_read_block_out_of_range() {
        let mock = mock_with("data.bin", b"0123456789");
        assert!(read_block(&mock, &FsPath::from("data.bin"), 8, 5).is_err());
        assert!(read_block(&mock, &FsPath::from("data.bin"), 1, 10).is_err());
        // Exactly up to the end is fine.
        assert_eq!(
            read_block(&mock, &FsPath::from("data.bin"), 2, 8).unwrap(),
            b"89"
        );
    }

    #[test]
    fn test_query_size() {
        let mock = mock_with("data.bin", b"12345");
        assert_eq!(query_size(&mock, &FsPath::from("data.bin")).unwrap(), 5);
    }

    #[test]
    fn test_write_bytes_replaces_contents() {
        let mock = mock_with("out.bin", b"old old old");
        write_bytes(&mock, &FsPath::from("out.bin"), b"new").unwrap();
        assert_eq!(
            mock.file_contents(&FsPath::from("out.bin")),
            Some(b"new".to_vec())
        );
    }

    #[test]
    fn test_write_bytes_empty() {
        let mock = mock_with("out.bin", b"old");
        write_bytes(&mock, &FsPath::from("out.bin"), b"").unwrap();
        assert_eq!(
            mock.file_contents(&FsPath::from("out.bin")),
            Some(Vec::new())
        );
    }

    #[test]
    fn test_write_text_adds_trailing_newline() {
        let mock = MockVfs::new();
        write_text(&mock, &FsPath::from("out.txt"), "no newline").unwrap();
        assert_eq!(
            mock.file_contents(&FsPath::from("out.txt")),
            Some(b"no newline\n".to_vec())
        );
    }

    #[test]
    fn test_write_text_keeps_existing_newline() {
        let mock = MockVfs::new();
        write_text(&mock, &FsPath::from("out.txt"), "terminated\n").unwrap();
        assert_eq!(
            mock.file_contents(&FsPath::from("out.txt")),
            Some(b"terminated\n".to_vec())
        );
    }

    #[test]
    fn test_write_text_rejects_empty() {
        let mock = MockVfs::new();
        assert!(write_text(&mock, &FsPath::from("out.txt"), "").is_err());
    }

    #[test]
    fn test_write_lines() {
        let mock = MockVfs::new();
        let lines = vec!["one".to_string(), "two".to_string()];
        write_lines(&mock, &FsPath::from("out.txt"), &lines).unwrap();
        assert_eq!(
            mock.file_contents(&FsPath::from("out.txt")),
            Some(b"one\ntwo\n".to_vec())
        );
    }

    #[test]
    fn test_write_block_in_place() {
        let mock = mock_with("data.bin", b"0123456789");
        write_block(&mock, &FsPath::from("data.bin"), b"AB", 4).unwrap();
        assert_eq!(
            mock.file_contents(&FsPath::from("data.bin")),
            Some(b"0123AB6789".to_vec())
        );
    }

    #[test]
    fn test_write_block_out_of_range() {
        let mock = mock_with("data.bin", b"0123456789");
        assert!(write_block(&mock, &FsPath::from("data.bin"), b"AB", 9).is_err());
        // Unchanged after the failed write.
        assert_eq!(
            mock.file_contents(&FsPath::from("data.bin")),
            Some(b"0123456789".to_vec())
        );
    }

    #[test]
    fn test_write_block_missing_file() {
        let mock = MockVfs::new();
        assert!(write_block(&mock, &FsPath::from("missing"), b"x", 0).is_err());
    }

    #[test]
    fn test_round_trip_lines() {
        let mock = MockVfs::new();
        let lines = vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()];
        write_lines(&mock, &FsPath::from("round.txt"), &lines).unwrap();
        assert_eq!(read_lines(&mock, &FsPath::from("round.txt")).unwrap(), lines);
    }
}
