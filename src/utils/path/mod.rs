//! Path utilities.
//!
//! Pure functions for path manipulation.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`)
//! - [`relative`]: Relative path between a directory and a file (`relative_path`)
//! - [`value`]: Manifest value strings (`is_absolute_value`, `value_dir`)

pub mod fs;
pub mod relative;
pub mod value;

pub use fs::normalize_path;
pub use relative::{relative_between, relative_path};
pub use value::{is_absolute_value, value_dir};
