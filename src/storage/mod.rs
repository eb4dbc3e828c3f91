//! Storage layer for ollama-backup
//!
//! Filesystem primitives shared by the inventory, backup and restore code:
//! manifest parsing, atomic writes, overwrite-aware tree copies and zip
//! packaging.

pub mod archive;
pub mod file_io;

pub use archive::{extract_archive, zip_directory};
pub use file_io::{
    copy_file, copy_file_atomic, copy_tree, find_conflicts, read_manifest, write_atomic,
};
