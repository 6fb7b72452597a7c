//! Request handler module
//!
//! Request dispatch and static file serving.

pub mod error;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use error::ServeError;
pub use router::{handle_request, RequestContext};
