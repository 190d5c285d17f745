//! Materialization of nested archives.
//!
//! A zip entry only offers a forward-only `Read`, but a zip archive needs
//! `Seek` to find its central directory. Nested archives are therefore copied
//! into memory, or into an anonymous temporary file once they exceed the
//! configured memory limit.

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};

use tracing::debug;

use crate::error::{ExtractError, Result};

/// Upper bound on the up-front allocation; the declared size is untrusted.
const MAX_PREALLOC: u64 = 1024 * 1024;

/// Size thresholds applied while materializing a nested archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLimits {
    /// Archives up to this size stay in memory.
    pub memory_limit: u64,
    /// Archives larger than this are rejected. `None` = unlimited.
    pub max_size: Option<u64>,
}

impl Default for BufferLimits {
    fn default() -> Self {
        Self {
            memory_limit: 64 * 1024 * 1024,
            max_size: None,
        }
    }
}

/// A nested archive copied out of its parent, ready for random access.
#[derive(Debug)]
pub enum NestedArchive {
    Memory(Cursor<Vec<u8>>),
    Spilled(File),
}

impl NestedArchive {
    /// Copy `reader` into a seekable buffer.
    ///
    /// `declared_size` is the uncompressed size recorded by the parent archive;
    /// it picks the storage but the real byte count is what the cap is checked
    /// against.
    pub fn materialize<R: Read>(
        reader: R,
        declared_size: u64,
        path: &str,
        limits: &BufferLimits,
    ) -> Result<Self> {
        let too_large = || ExtractError::NestedTooLarge {
            path: path.to_string(),
            limit: limits.max_size.unwrap_or(u64::MAX),
        };

        if let Some(max) = limits.max_size {
            if declared_size > max {
                return Err(too_large());
            }
        }

        // One byte past the cap is enough to detect an overflow.
        let read_cap = limits.max_size.map_or(u64::MAX, |max| max.saturating_add(1));
        let mut limited = reader.take(read_cap);

        let (nested, copied) = if declared_size <= limits.memory_limit {
            let mut buf = Vec::with_capacity(declared_size.min(MAX_PREALLOC) as usize);
            limited
                .read_to_end(&mut buf)
                .map_err(|e| ExtractError::io(path, e))?;
            let len = buf.len() as u64;
            (NestedArchive::Memory(Cursor::new(buf)), len)
        } else {
            let mut file = tempfile::tempfile().map_err(|e| ExtractError::io(path, e))?;
            let len = std::io::copy(&mut limited, &mut file).map_err(|e| ExtractError::io(path, e))?;
            file.seek(SeekFrom::Start(0))
                .map_err(|e| ExtractError::io(path, e))?;
            debug!(path, size = len, "Spilled nested archive to a temporary file");
            (NestedArchive::Spilled(file), len)
        };

        if let Some(max) = limits.max_size {
            if copied > max {
                return Err(too_large());
            }
        }

        Ok(nested)
    }

    /// Whether the archive is held in memory.
    pub fn is_in_memory(&self) -> bool {
        matches!(self, NestedArchive::Memory(_))
    }
}

impl Read for NestedArchive {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            NestedArchive::Memory(c) => c.read(buf),
            NestedArchive::Spilled(f) => f.read(buf),
        }
    }
}

impl Seek for NestedArchive {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        match self {
            NestedArchive::Memory(c) => c.seek(pos),
            NestedArchive::Spilled(f) => f.seek(pos),
        }
    }
}
