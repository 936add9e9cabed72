//! Directory listing
//!
//! Scans the immediate children of a directory and renders them as an
//! HTML page.

pub mod entry;
pub mod page;

pub use page::render_listing;
