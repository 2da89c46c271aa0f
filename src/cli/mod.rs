//! Command-line workflows
//!
//! - `orchestration` - check/in/out request handling

pub mod orchestration;

pub use orchestration::{run_check, run_in, run_out};
