//! Browser lifecycle for a single scraping session
//!
//! Launches a chromiumoxide browser with its own profile directory and
//! guarantees the process, its event handler and the profile are released
//! when the session ends, whether it ends normally or not.

use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{BrowserError, BrowserResult};
use crate::BrowserConfig;

/// Wrapper for Browser and its event handler task
///
/// Handler MUST be aborted to prevent it running indefinitely after
/// browser is closed. `Drop` does that, and `Browser::drop()` kills the
/// Chrome process, so an early return or a panic still releases everything.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    /// Open a fresh tab on `about:blank`
    pub async fn new_page(&self) -> BrowserResult<Page> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))
    }

    /// Close the browser, wait for the process to exit and remove its profile
    ///
    /// Errors are logged, never returned: shutdown runs on failure paths too.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            debug!("Browser close failed (process may already be gone): {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Waiting for browser exit failed: {}", e);
        }
        self.handler.abort();
        self.cleanup_temp_dir();
    }

    /// Clean up temp directory (blocking operation)
    ///
    /// MUST be called AFTER `browser.wait()` completes to ensure Chrome
    /// has released all file handles. Windows will fail to remove locked files.
    pub fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            info!("Cleaning up temp directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to clean up temp directory {}: {}. Manual cleanup may be required.",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        debug!("Dropping BrowserWrapper - aborting handler task");
        self.handler.abort();
        // Browser::drop() kills the Chrome process; the profile may still be
        // locked for a moment, so removal can fail here
        if let Some(path) = self.user_data_dir.as_ref() {
            warn!(
                "BrowserWrapper dropped without shutdown, removing {}",
                path.display()
            );
            self.cleanup_temp_dir();
        }
    }
}

/// Launch a browser for one scraping session
///
/// The profile directory is unique per call, so concurrent sessions never
/// share Chrome state.
pub async fn launch_session_browser(config: &BrowserConfig) -> BrowserResult<BrowserWrapper> {
    let user_data_dir =
        std::env::temp_dir().join(format!("medical_sources_chrome_{}", uuid::Uuid::new_v4()));

    info!("Launching scraping browser with profile {}", user_data_dir.display());
    let (browser, handler) =
        crate::browser_setup::launch_browser(config, user_data_dir.clone()).await?;

    Ok(BrowserWrapper::new(browser, handler, user_data_dir))
}
