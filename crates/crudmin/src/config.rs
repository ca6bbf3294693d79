//! Site-wide settings.

use serde::Deserialize;

const DEFAULT_BRAND: &str = "Rust Admin";
const DEFAULT_URL_PREFIX: &str = "/admin";
const DEFAULT_PAGE_SIZE: usize = 100;
const DEFAULT_SHOW_PAGE_COUNT: usize = 8;

/// Settings shared by every model of a site.
///
/// Deserializes from any serde format; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Name shown in the page header.
    pub brand: String,
    /// Mount point of the admin routes.
    pub url_prefix: String,
    /// Records per list page.
    pub page_size: usize,
    /// Page links shown around the current page.
    pub show_page_count: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            brand: DEFAULT_BRAND.to_string(),
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            show_page_count: DEFAULT_SHOW_PAGE_COUNT,
        }
    }
}

impl AdminConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the brand name.
    #[must_use]
    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    /// Sets the mount point. A trailing `/` is dropped; an empty prefix
    /// mounts at the root.
    #[must_use]
    pub fn url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    /// Sets the list page size.
    #[must_use]
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets how many page links the list view shows.
    #[must_use]
    pub fn show_page_count(mut self, count: usize) -> Self {
        self.show_page_count = count;
        self
    }

    /// Page size, never zero.
    pub fn effective_page_size(&self) -> usize {
        self.page_size.max(1)
    }

    /// Page link count, never zero.
    pub fn effective_show_page_count(&self) -> usize {
        self.show_page_count.max(1)
    }

    /// Mount point without a trailing `/`.
    pub fn prefix(&self) -> &str {
        self.url_prefix.trim_end_matches('/')
    }
}
