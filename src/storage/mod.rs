//! Filesystem side of the server
//!
//! Everything that touches the served tree lives here: finding the root,
//! mapping request paths under it and creating uploaded files.

pub mod root;
pub mod target;
pub mod upload;

pub use root::resolve_root;
pub use target::resolve_target;
pub use upload::{write_new_file, UploadOutcome};
