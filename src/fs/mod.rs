//! Filesystem utilities for mdxgen.
//!
//! Atomic writes for the prompt cache and generated files, plus output tree
//! preparation and listing.

pub mod atomic;
pub mod tree;

pub use atomic::{atomic_write, atomic_write_file};
pub use tree::{list_files, recreate_dir};
