use std::io::{Read, Seek, SeekFrom, Write};

use tracing::debug;

use crate::err;
use crate::error::{FsError, FsResult};
use crate::path::FsPath;
use crate::vfs::{ReadSeek, Vfs, WriteMode, WriteSeek};

/* 📖 # Why do the stream constructors never fail?

A reader or writer whose open fails is still a valid object; it is just
permanently "not open", and every subsequent operation on it fails
deterministically. This mirrors how a handle that dies mid-use behaves,
so callers have exactly one failure surface to handle (the operation
results), not two. Callers that want to distinguish can check is_open()
right after construction.
*/

/// Buffered reader over one exclusively-owned open file handle.
///
/// The total size is captured once at open time by seeking to the end and
/// back; a file growing externally after open is not reflected.
pub struct StreamReader {
    path: FsPath,
    stream: Option<Box<dyn ReadSeek>>,
    size: u64,
}

impl StreamReader {
    /// Opens `path` for binary reading through the given Vfs.
    pub fn open(vfs: &dyn Vfs, path: &FsPath) -> Self {
        let mut size = 0;
        let stream = match vfs.open_read(path) {
            Ok(mut stream) => {
                let measured = stream
                    .seek(SeekFrom::End(0))
                    .and_then(|end| stream.seek(SeekFrom::Start(0)).map(|_| end));
                match measured {
                    Ok(end) => {
                        size = end;
                        Some(stream)
                    }
                    Err(error) => {
                        debug!(path = %path, %error, "failed to measure stream size");
                        None
                    }
                }
            }
            Err(error) => {
                debug!(path = %path, %error, "failed to open stream reader");
                None
            }
        };
        Self {
            path: path.clone(),
            stream,
            size,
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Total size in bytes, captured at open time.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Reads up to `size` bytes from the current cursor into `data`.
    ///
    /// `size` is clamped so the read never runs past the end; `data` is
    /// resized to the clamped count. Fails when not open or `size` is 0.
    pub fn read(&mut self, data: &mut Vec<u8>, size: usize) -> FsResult<()> {
        let total = self.size;
        let Some(stream) = self.stream.as_mut() else {
            return Err(err!("stream reader is not open: {}", self.path));
        };
        if size == 0 {
            return Err(err!("read size must be non-zero"));
        }
        let position = stream
            .stream_position()
            .map_err(|error| Box::new(FsError::file(&self.path, error)))?;
        let remaining = total.saturating_sub(position) as usize;
        let clamped = size.min(remaining);
        data.resize(clamped, 0);
        stream
            .read_exact(data)
            .map_err(|error| Box::new(FsError::file(&self.path, error)))?;
        Ok(())
    }

    /// Seeks to the start and reads the entire captured size into `data`.
    ///
    /// A zero-size file succeeds with an empty buffer without touching
    /// the handle further.
    pub fn read_all(&mut self, data: &mut Vec<u8>) -> FsResult<()> {
        let total = self.size;
        let Some(stream) = self.stream.as_mut() else {
            return Err(err!("stream reader is not open: {}", self.path));
        };
        if total == 0 {
            data.clear();
            return Ok(());
        }
        stream
            .seek(SeekFrom::Start(0))
            .map_err(|error| Box::new(FsError::file(&self.path, error)))?;
        data.resize(total as usize, 0);
        stream
            .read_exact(data)
            .map_err(|error| Box::new(FsError::file(&self.path, error)))?;
        Ok(())
    }

    /// Reads the next line, excluding the `\n` terminator.
    /// Returns `Ok(None)` once no data remains.
    pub fn read_line(&mut self) -> FsResult<Option<String>> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(err!("stream reader is not open: {}", self.path));
        };
        let mut bytes = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match stream.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    if byte[0] == b'\n' {
                        let line = String::from_utf8(bytes)
                            .map_err(|_| err!("line is not valid UTF-8: {}", self.path))?;
                        return Ok(Some(line));
                    }
                    bytes.push(byte[0]);
                }
                Err(error) => return Err(Box::new(FsError::file(&self.path, error))),
            }
        }
        if bytes.is_empty() {
            return Ok(None);
        }
        let line = String::from_utf8(bytes)
            .map_err(|_| err!("line is not valid UTF-8: {}", self.path))?;
        Ok(Some(line))
    }

    /// Moves the read cursor to an absolute offset.
    pub fn seek(&mut self, offset: u64) -> FsResult<()> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(err!("stream reader is not open: {}", self.path));
        };
        stream
            .seek(SeekFrom::Start(offset))
            .map_err(|error| Box::new(FsError::file(&self.path, error)))?;
        Ok(())
    }

    /// Current read cursor, or 0 when not open.
    pub fn position(&mut self) -> u64 {
        match self.stream.as_mut() {
            Some(stream) => stream.stream_position().unwrap_or(0),
            None => 0,
        }
    }

    /// Releases the handle. Idempotent; a second call is a no-op.
    pub fn close(&mut self) {
        self.stream = None;
    }
}

impl std::fmt::Debug for StreamReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamReader")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .field("size", &self.size)
            .finish()
    }
}

/// Buffered writer over one exclusively-owned open file handle.
///
/// Closing flushes pending data; dropping flushes best-effort.
pub struct StreamWriter {
    path: FsPath,
    stream: Option<Box<dyn WriteSeek>>,
}

impl StreamWriter {
    /// Opens `path` for binary writing, truncating unless `append`.
    pub fn open(vfs: &dyn Vfs, path: &FsPath, append: bool) -> Self {
        let mode = if append {
            WriteMode::Append
        } else {
            WriteMode::Truncate
        };
        let stream = match vfs.open_write(path, mode) {
            Ok(stream) => Some(stream),
            Err(error) => {
                debug!(path = %path, %error, "failed to open stream writer");
                None
            }
        };
        Self {
            path: path.clone(),
            stream,
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Writes the whole buffer at the current cursor.
    pub fn write(&mut self, buffer: &[u8]) -> FsResult<()> {
        self.write_len(buffer, buffer.len())
    }

    /// Writes the first `size` bytes of `buffer`, clamping `size` to the
    /// buffer length. Fails when not open or `size` is 0.
    pub fn write_len(&mut self, buffer: &[u8], size: usize) -> FsResult<()> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(err!("stream writer is not open: {}", self.path));
        };
        if size == 0 {
            return Err(err!("write size must be non-zero"));
        }
        let clamped = size.min(buffer.len());
        stream
            .write_all(&buffer[..clamped])
            .map_err(|error| Box::new(FsError::file(&self.path, error)))?;
        Ok(())
    }

    /// Writes the line followed by one `\n` terminator.
    pub fn write_line(&mut self, line: &str) -> FsResult<()> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(err!("stream writer is not open: {}", self.path));
        };
        stream
            .write_all(line.as_bytes())
            .and_then(|()| stream.write_all(b"\n"))
            .map_err(|error| Box::new(FsError::file(&self.path, error)))?;
        Ok(())
    }

    /// Forces pending data down to the OS.
    pub fn flush(&mut self) -> FsResult<()> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(err!("stream writer is not open: {}", self.path));
        };
        stream
            .flush()
            .map_err(|error| Box::new(FsError::file(&self.path, error)))?;
        Ok(())
    }

    /// Moves the write cursor to an absolute offset.
    pub fn seek(&mut self, offset: u64) -> FsResult<()> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(err!("stream writer is not open: {}", self.path));
        };
        stream
            .seek(SeekFrom::Start(offset))
            .map_err(|error| Box::new(FsError::file(&self.path, error)))?;
        Ok(())
    }

    /// Current write cursor, or 0 when not open.
    pub fn position(&mut self) -> u64 {
        match self.stream.as_mut() {
            Some(stream) => stream.stream_position().unwrap_or(0),
            None => 0,
        }
    }

    /// Flushes and releases the handle. Idempotent; a second call is a
    /// no-op success.
    pub fn close(&mut self) -> FsResult<()> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };
        stream
            .flush()
            .map_err(|error| Box::new(FsError::file(&self.path, error)))?;
        Ok(())
    }
}

impl Drop for StreamWriter {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.as_mut() {
            let _ = stream.flush();
        }
    }
}

impl std::fmt::Debug for StreamWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamWriter")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish()
    }
}
