//! Request handler module
//!
//! Responsible for request routing dispatch: health probes, the static
//! image mount and the creature query routes.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
