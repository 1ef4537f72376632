use headless_chrome::{self, LaunchOptions};
use anyhow;
use url::{Url, ParseError};
use thiserror::Error;
use std::sync::Arc;
use std::time::Duration;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("ChromeError: {0}")]
    ChromeError(#[from] anyhow::Error),
    #[error("UrlError, can't parse given URL: {0}")]
    UrlError(#[from] ParseError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error)
}
pub type Result<T> = std::result::Result<T, BrowserError>;

/// One Chrome session for the whole run, reusing a single tab per page.
/// The session quits when this is dropped.
pub struct Browser {
    _browser: headless_chrome::Browser,
    tab: Arc<headless_chrome::Tab>,
}

impl Browser {

    /// Fixed wait for the page's data island to appear after navigation.
    const RENDER_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(headless: bool) -> Result<Self> {
        let browser = headless_chrome::Browser::new(LaunchOptions {
            headless,
            ..LaunchOptions::default()
        })?;
        let tab = browser.new_tab()?;

        Ok(Self { _browser: browser, tab })
    }

    /// Navigates to `url`, waits until `ready_selector` is present,
    /// then returns the rendered HTML.
    pub fn rendered_html(&self, url: &str, ready_selector: &str) -> Result<String> {

        Url::parse(url)?;

        self.tab.navigate_to(url)?.wait_until_navigated()?;
        self.tab.wait_for_element_with_custom_timeout(ready_selector, Self::RENDER_TIMEOUT)?;

        Ok(self.tab.get_content()?)
    }
}
