//! Browser infrastructure for launching and releasing Chrome instances
//!
//! Each scraping session owns exactly one browser; nothing here is shared
//! between sessions.

mod wrapper;

pub use wrapper::{BrowserWrapper, launch_session_browser};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to find browser executable: {0}")]
    NotFound(String),

    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Navigation timed out after {0}ms")]
    NavigationTimeout(u64),

    #[error("Failed to read page content: {0}")]
    ContentFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

pub type BrowserResult<T> = Result<T, BrowserError>;
