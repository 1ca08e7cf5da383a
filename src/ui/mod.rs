//! User interface module - terminal formatting.

pub mod formatter;

pub use formatter::{
    display_error, display_release_outcome, display_status, display_success,
    display_sync_outcomes,
};
