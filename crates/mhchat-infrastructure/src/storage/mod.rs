//! File storage primitives shared by the repositories.

mod atomic_file;

pub use atomic_file::{AtomicFile, AtomicFileError, FileFormat};
