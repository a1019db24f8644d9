//! Chrome discovery and launch for scraping sessions

use std::path::{Path, PathBuf};
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::BrowserConfig;
use crate::browser::{BrowserError, BrowserResult};
use crate::utils::constants::CHROME_USER_AGENT;

#[cfg(target_os = "windows")]
const INSTALL_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

#[cfg(target_os = "macos")]
const INSTALL_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const INSTALL_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
];

/// Binary names looked up on `PATH` when no install path exists
const PATH_NAMES: &[&str] = &["chromium", "chromium-browser", "google-chrome", "chrome"];

/// Installed Chrome: `CHROMIUM_PATH`, then the usual install paths, then `PATH`
pub fn locate_chrome() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("CHROMIUM_PATH").map(PathBuf::from) {
        if path.is_file() {
            return Some(path);
        }
        warn!("CHROMIUM_PATH points to a missing file: {}", path.display());
    }

    let on_path = std::env::var_os("PATH")
        .map(|dirs| std::env::split_paths(&dirs).collect::<Vec<_>>())
        .unwrap_or_default();

    INSTALL_PATHS
        .iter()
        .map(PathBuf::from)
        .chain(
            on_path
                .iter()
                .flat_map(|dir| PATH_NAMES.iter().map(move |name| dir.join(name))),
        )
        .find(|candidate| candidate.is_file())
}

/// Download a Chromium build into the user cache directory
async fn fetch_chromium() -> BrowserResult<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("medical-sources")
        .join("chromium");
    std::fs::create_dir_all(&cache_dir)
        .map_err(|e| BrowserError::IoError(format!("{}: {e}", cache_dir.display())))?;

    info!("No local Chrome found, downloading Chromium into {}", cache_dir.display());
    let options = BrowserFetcherOptions::builder()
        .with_path(&cache_dir)
        .build()
        .map_err(|e| BrowserError::NotFound(format!("fetcher options: {e}")))?;
    let revision = BrowserFetcher::new(options)
        .fetch()
        .await
        .map_err(|e| BrowserError::NotFound(format!("Chromium download failed: {e}")))?;

    Ok(revision.executable_path)
}

/// Profile directory that is removed again unless the launch succeeds
struct ProfileDir {
    path: PathBuf,
    launched: bool,
}

impl ProfileDir {
    fn create(path: PathBuf) -> BrowserResult<Self> {
        std::fs::create_dir_all(&path)
            .map_err(|e| BrowserError::IoError(format!("{}: {e}", path.display())))?;
        Ok(Self { path, launched: false })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        if !self.launched
            && let Err(e) = std::fs::remove_dir_all(&self.path)
        {
            warn!("Failed to remove profile {}: {}", self.path.display(), e);
        }
    }
}

/// Launch Chrome with a desktop-sized viewport and the scraping switches
///
/// The handler task drains CDP events until the browser goes away; the
/// caller owns both the browser and the task.
pub async fn launch_browser(
    config: &BrowserConfig,
    user_data_dir: PathBuf,
) -> BrowserResult<(Browser, JoinHandle<()>)> {
    let executable = match locate_chrome() {
        Some(path) => path,
        None => fetch_chromium().await?,
    };
    debug!("Using Chrome at {}", executable.display());

    let mut profile = ProfileDir::create(user_data_dir)?;

    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(config.window.width, config.window.height)
        .viewport(Some(desktop_viewport(config)))
        .user_data_dir(profile.path())
        .chrome_executable(executable)
        .args(stealth_args(config));
    builder = if config.headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    let browser_config = builder.build().map_err(BrowserError::LaunchFailed)?;
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            match event {
                Err(e) if is_benign_cdp_error(&e.to_string()) => {
                    trace!("Ignoring unrecognized CDP message: {}", e)
                }
                Err(e) => error!("Browser handler error: {:?}", e),
                Ok(()) => {}
            }
        }
        debug!("Browser handler finished");
    });

    profile.launched = true;
    Ok((browser, handler_task))
}

/// Page viewport matching the configured window
fn desktop_viewport(config: &BrowserConfig) -> Viewport {
    Viewport {
        width: config.window.width,
        height: config.window.height,
        device_scale_factor: Some(1.0),
        ..Default::default()
    }
}

/// Chrome emits CDP events chromiumoxide has no type for
fn is_benign_cdp_error(message: &str) -> bool {
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}

/// Command-line switches for a scraping browser
///
/// The sandbox, GPU and shared-memory switches are always present: sessions
/// routinely run inside containers where none of them work.
pub fn stealth_args(config: &BrowserConfig) -> Vec<String> {
    let mut args: Vec<String> = [
        "--no-sandbox",
        "--disable-setuid-sandbox",
        "--disable-gpu",
        "--disable-accelerated-2d-canvas",
        "--disable-dev-shm-usage",
        "--disable-blink-features=AutomationControlled",
        "--disable-infobars",
        "--disable-notifications",
        "--no-first-run",
        "--no-default-browser-check",
        "--disable-extensions",
        "--disable-background-networking",
        "--disable-breakpad",
        "--disable-features=TranslateUI",
        "--password-store=basic",
        "--use-mock-keychain",
        "--hide-scrollbars",
        "--mute-audio",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    args.push(format!("--user-agent={}", CHROME_USER_AGENT));

    if config.disable_security {
        info!("WARNING: Disabling browser security features (disable_security=true)");
        args.extend(
            [
                "--disable-web-security",
                "--disable-features=IsolateOrigins,site-per-process",
                "--ignore-certificate-errors",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WindowConfig;

    #[test]
    fn test_stealth_args_always_disable_sandbox_and_gpu() {
        let args = stealth_args(&BrowserConfig::default());
        for flag in [
            "--no-sandbox",
            "--disable-setuid-sandbox",
            "--disable-gpu",
            "--disable-accelerated-2d-canvas",
            "--disable-dev-shm-usage",
            "--disable-blink-features=AutomationControlled",
        ] {
            assert!(args.iter().any(|a| a == flag), "missing {flag}");
        }
        assert!(args.iter().any(|a| a.starts_with("--user-agent=Mozilla/5.0")));
        assert!(!args.iter().any(|a| a == "--disable-web-security"));
    }

    #[test]
    fn test_disable_security_adds_flags() {
        let config = BrowserConfig {
            disable_security: true,
            ..BrowserConfig::default()
        };
        assert!(stealth_args(&config).iter().any(|a| a == "--disable-web-security"));
    }

    #[test]
    fn test_viewport_follows_window() {
        let viewport = desktop_viewport(&BrowserConfig::default());
        assert_eq!((viewport.width, viewport.height), (1366, 768));

        let config = BrowserConfig {
            window: WindowConfig {
                width: 1920,
                height: 1080,
            },
            ..BrowserConfig::default()
        };
        let viewport = desktop_viewport(&config);
        assert_eq!((viewport.width, viewport.height), (1920, 1080));
        assert!(!viewport.emulating_mobile);
    }

    #[test]
    fn test_benign_cdp_errors() {
        assert!(is_benign_cdp_error(
            "data did not match any variant of untagged enum Message"
        ));
        assert!(!is_benign_cdp_error("connection closed"));
    }

    #[test]
    fn test_failed_launch_removes_profile() {
        let path = std::env::temp_dir().join(format!("medical_sources_test_{}", uuid::Uuid::new_v4()));
        {
            let profile = ProfileDir::create(path.clone()).unwrap();
            assert!(profile.path().is_dir());
        }
        assert!(!path.exists());
    }
}
