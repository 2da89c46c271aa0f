//! User interface module - operator-facing output.
//!
//! The resource runs unattended inside a pipeline, so there are no prompts;
//! `formatter` holds all display logic. Boundary warnings travel through
//! the log instead (see `BoundaryWarning::emit`).

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{display_error, display_status, display_success, format_error};
