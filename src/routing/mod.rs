//! Routing module
//!
//! Maps request paths to files: reserved aliases first, then safe
//! resolution under the site root.

pub mod alias;
pub mod path;

pub use alias::AliasTable;
pub use path::{contained_target, resolve_under_root, UnsafePath};
