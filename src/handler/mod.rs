//! Request handler module
//!
//! Dispatches requests to the list/serve and upload operations.

pub mod files;
pub mod router;
pub mod upload;

// Re-export main entry point
pub use router::{handle_request, RouteTable};
