//! Offset-addressed destinations.
//!
//! Workers write each part at its own start offset, so the final content does
//! not depend on the order in which parts complete. Concurrent calls always
//! target disjoint byte ranges.
use async_trait::async_trait;
use bytes::Bytes;
use std::fs::File;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};

#[async_trait]
pub trait PositionalWriter: Send + Sync {
    /// Writes all of `data` starting at `offset` and returns the byte count.
    async fn write_at(&self, data: Bytes, offset: u64) -> io::Result<usize>;
}

/// Writes into a file owned by the caller.
///
/// The handle is shared, not taken over: the caller opens it before the
/// transfer and closes it afterwards.
#[derive(Debug, Clone)]
pub struct FileWriter {
    file: Arc<File>,
}

impl FileWriter {
    pub fn new(file: Arc<File>) -> Self {
        Self { file }
    }
}

#[async_trait]
impl PositionalWriter for FileWriter {
    async fn write_at(&self, data: Bytes, offset: u64) -> io::Result<usize> {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || -> io::Result<usize> {
            write_all_at(&file, &data, offset)?;
            Ok(data.len())
        })
        .await
        .map_err(io::Error::other)?
    }
}

#[cfg(unix)]
fn write_all_at(file: &File, buf: &[u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.write_all_at(buf, offset)
}

#[cfg(windows)]
fn write_all_at(file: &File, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_write(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "failed to write whole buffer",
                ));
            }
            Ok(n) => {
                buf = &buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// In-memory destination. Grows to fit the highest write.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    buf: Mutex<Vec<u8>>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_len(len: usize) -> Self {
        Self {
            buf: Mutex::new(vec![0; len]),
        }
    }

    /// Copy of the current contents.
    pub fn contents(&self) -> Vec<u8> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PositionalWriter for MemoryWriter {
    async fn write_at(&self, data: Bytes, offset: u64) -> io::Result<usize> {
        let start = usize::try_from(offset).map_err(io::Error::other)?;
        let end = start + data.len();

        let mut buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        if buf.len() < end {
            buf.resize(end, 0);
        }
        buf[start..end].copy_from_slice(&data);
        Ok(data.len())
    }
}
