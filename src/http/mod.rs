//! HTTP protocol layer module
//!
//! Content negotiation, header tables and response builders, decoupled from
//! how a path is resolved to a file.

pub mod cache;
pub mod compress;
pub mod mime;
pub mod response;

// Re-export commonly used items
pub use response::{build_400_response, build_404_response, build_file_response, FileResponse};
