//! Resolved upload sources.
//!
//! Planning opens the source once. Each segment then reads its own byte
//! range independently, so segments can be read concurrently and in any
//! order without sharing a file cursor.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;

use cloudfiles_model::Part;

/// An upload source whose size is known.
#[derive(Debug, Clone)]
pub enum PlannedSource {
    /// Content held in memory.
    Inline(Bytes),
    /// An open local file.
    File {
        /// Path the file was opened from.
        path: PathBuf,
        /// Open handle used for positioned reads.
        file: Arc<File>,
        /// Size observed when the file was opened.
        size: u64,
    },
}

impl PlannedSource {
    /// Wrap an already opened file.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>, file: File, size: u64) -> Self {
        Self::File {
            path: path.into(),
            file: Arc::new(file),
            size,
        }
    }

    /// Total size in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        match self {
            Self::Inline(bytes) => bytes.len() as u64,
            Self::File { size, .. } => *size,
        }
    }

    /// Path of a file-backed source.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. } => Some(path),
            Self::Inline(_) => None,
        }
    }

    /// Read the bytes covered by `part`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file can no longer supply the range, for
    /// example because it was truncated after planning.
    pub async fn read(&self, part: &Part) -> io::Result<Bytes> {
        match self {
            Self::Inline(bytes) => {
                let start = usize::try_from(part.offset).map_err(io::Error::other)?;
                let end = usize::try_from(part.offset + part.length).map_err(io::Error::other)?;
                if end > bytes.len() {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("range {start}..{end} is outside a {} byte body", bytes.len()),
                    ));
                }
                Ok(bytes.slice(start..end))
            }
            Self::File { file, .. } => {
                let file = Arc::clone(file);
                let offset = part.offset;
                let length = usize::try_from(part.length).map_err(io::Error::other)?;
                tokio::task::spawn_blocking(move || read_range(&file, offset, length))
                    .await
                    .map_err(io::Error::other)?
            }
        }
    }
}

fn read_range(file: &File, offset: u64, length: usize) -> io::Result<Bytes> {
    let mut buf = vec![0u8; length];
    read_exact_at(file, &mut buf, offset)?;
    Ok(Bytes::from(buf))
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => {
                buf = &mut std::mem::take(&mut buf)[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
