//! Opening a wallet's landing page for the user.

use tracing::{debug, error, info};

/// Opens external URLs on the user's behalf. Best effort: failures are logged, not returned.
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str);
}

/// Opens URLs in the system browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserUrlOpener;

impl UrlOpener for BrowserUrlOpener {
    fn open(&self, url: &str) {
        if url.is_empty() {
            debug!("Adapter has no URL to open");
            return;
        }
        match open::that(url) {
            Ok(()) => info!("Opened wallet page at {}", url),
            Err(e) => error!("Failed to open wallet page {}: {}", url, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_is_ignored() {
        BrowserUrlOpener.open("");
    }
}
