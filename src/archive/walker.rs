//! Depth-first walk over a zip archive and every zip archive nested inside it.

use std::io::{Read, Seek};

use tracing::debug;
use zip::ZipArchive;

use crate::archive::buffer::{BufferLimits, NestedArchive};
use crate::error::{ExtractError, Result};

/// Traversal settings.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Entries whose base name ends with this are walked as nested archives.
    pub nested_extension: String,
    /// How nested archives are buffered.
    pub limits: BufferLimits,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            nested_extension: ".zip".to_string(),
            limits: BufferLimits::default(),
        }
    }
}

/// A regular (non-directory, non-archive) entry handed to the callback.
pub struct ArchiveEntry<'a> {
    /// Base name of the entry, used for suffix matching.
    pub name: &'a str,
    /// Display path from the top-level archive, e.g. `outer.zip/inner.zip/a.mbox`.
    pub path: &'a str,
    /// Uncompressed size recorded in the archive.
    pub size: u64,
    /// The entry's decompressed content.
    pub reader: &'a mut dyn Read,
}

/// Counters collected during a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Archives opened, including the top-level one.
    pub archives: u64,
    /// Entries handed to the callback.
    pub entries: u64,
}

/// Walk `reader` as a zip archive.
///
/// Directory entries are skipped. Entries ending in the nested extension are
/// materialized and walked recursively in place of a callback. Every other
/// entry is passed to `callback` in archive order.
///
/// The first error aborts the walk. Callback errors are wrapped with the
/// entry's display path.
pub fn walk_archive<R: Read + Seek>(
    reader: R,
    display_path: &str,
    options: &WalkOptions,
    callback: &mut dyn FnMut(ArchiveEntry<'_>) -> Result<()>,
) -> Result<WalkStats> {
    let mut archive =
        ZipArchive::new(reader).map_err(|e| ExtractError::archive(display_path, e))?;
    let mut stats = WalkStats {
        archives: 1,
        entries: 0,
    };

    debug!(
        path = display_path,
        entries = archive.len(),
        "Walking archive"
    );

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| ExtractError::archive(display_path, e))?;
        if file.is_dir() {
            continue;
        }

        let name = base_name(file.name()).to_string();
        let path = format!("{display_path}/{name}");
        let size = file.size();

        if !options.nested_extension.is_empty() && name.ends_with(&options.nested_extension) {
            debug!(path = %path, size, "Descending into nested archive");
            let nested = NestedArchive::materialize(&mut file, size, &path, &options.limits)?;
            let nested_stats = walk_archive(nested, &path, options, callback)?;
            stats.archives += nested_stats.archives;
            stats.entries += nested_stats.entries;
            continue;
        }

        debug!(path = %path, size, "Visiting entry");
        callback(ArchiveEntry {
            name: &name,
            path: &path,
            size,
            reader: &mut file,
        })
        .map_err(|e| ExtractError::in_entry(path.clone(), e))?;
        stats.entries += 1;
    }

    Ok(stats)
}

/// Last path component of a zip entry name.
fn base_name(name: &str) -> &str {
    let trimmed = name.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
