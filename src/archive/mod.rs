//! Recursive traversal of nested zip archives.

pub mod buffer;
pub mod walker;
