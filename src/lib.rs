pub mod config;
pub mod coverage;
pub mod domain;
pub mod error;
pub mod git;
pub mod note;
pub mod release;
pub mod tracker;
pub mod ui;

pub use error::{ReleaseError, Result};
