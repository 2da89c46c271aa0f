pub mod boundary;
pub mod bump;
pub mod check;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod git;
pub mod models;
pub mod store;
pub mod ui;

pub use error::{ResourceError, Result};
