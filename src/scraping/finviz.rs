// Screenshot of the finviz sector heat map
//
// Uses headless Chrome because the map is drawn client-side on a canvas.
// The capture is blocking; async callers should run it on a blocking thread.

use anyhow::{Context, Result};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions};
use std::ffi::OsStr;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_MAP_URL: &str = "https://finviz.com/map.ashx?t=sec_all&st=w4";

/// Caption sent alongside the captured image.
pub const MAP_CAPTION: &str = "현재 핀비즈 섹터 맵";

/// Width the capture is scaled to.
const TARGET_WIDTH: f64 = 1200.0;

/// Removes page chrome that would otherwise overlap the map.
const CLEANUP_SCRIPT: &str = r#"
document.querySelectorAll('header, footer, .fv-ad, .fv-right-panel, #cookie-notice, .modal, .banner')
    .forEach(el => el.remove());
document.body.style.margin = '0';
document.body.style.padding = '0';
true
"#;

/// Captures the finviz sector map as a PNG.
#[derive(Debug, Clone)]
pub struct MapCapture {
    pub url: String,
    pub selector: String,
    /// Time given to the page to draw the map after navigation.
    pub settle: Duration,
    pub element_timeout: Duration,
}

impl Default for MapCapture {
    fn default() -> Self {
        Self {
            url: DEFAULT_MAP_URL.to_string(),
            selector: "#map".to_string(),
            settle: Duration::from_secs(15),
            element_timeout: Duration::from_secs(30),
        }
    }
}

impl MapCapture {
    /// Launch Chrome, load the map page and screenshot the map element.
    pub fn capture(&self) -> Result<Vec<u8>> {
        info!("Launching headless Chrome browser for {}", self.url);

        let options = LaunchOptions {
            headless: true,
            sandbox: false,
            args: vec![
                OsStr::new("--disable-blink-features=AutomationControlled"),
                OsStr::new("--user-agent=Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--window-size=1920,1080"),
            ],
            idle_browser_timeout: self.settle + self.element_timeout + Duration::from_secs(60),
            ..Default::default()
        };

        let browser = Browser::new(options)
            .context("Failed to launch headless Chrome. Is Chrome/Chromium installed?")?;

        let tab = browser
            .new_tab()
            .context("Failed to create new browser tab")?;

        tab.navigate_to(&self.url)
            .context("Failed to navigate to finviz map")?;
        tab.wait_for_element_with_custom_timeout("body", Duration::from_secs(20))
            .context("Timed out waiting for finviz page to load")?;

        info!("Waiting {:?} for the map to render...", self.settle);
        std::thread::sleep(self.settle);

        if let Err(e) = tab.evaluate(CLEANUP_SCRIPT, false) {
            warn!("Failed to strip page overlays: {}", e);
        }

        let element = tab
            .wait_for_element_with_custom_timeout(&self.selector, self.element_timeout)
            .with_context(|| format!("Map element '{}' not found", self.selector))?;

        let mut clip = element
            .get_box_model()
            .context("Failed to measure map element")?
            .content_viewport();
        if clip.width > 0.0 {
            clip.scale = TARGET_WIDTH / clip.width;
        }

        let png = tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, Some(clip), true)
            .context("Failed to capture map screenshot")?;

        info!("Captured finviz map ({} bytes)", png.len());
        Ok(png)
    }
}
