//! Crawler module for category walking and article scraping
//!
//! This module contains the core crawling logic, including:
//! - HTML extraction of categories, article links, pagers, and article text
//! - HTTP fetching with retry logic
//! - Page-by-page walking of one category
//! - Scraping of single articles
//! - Overall crawl coordination

mod article;
mod coordinator;
mod extractor;
mod fetcher;
mod walker;

pub use article::{scrape_article, ScrapeError};
pub use coordinator::{crawl_all, Coordinator, CrawlReport};
pub use extractor::{
    extract_article_urls, extract_categories, extract_content, extract_next_page_url,
    extract_title, parse_article_page, parse_categories, parse_listing_page, resolve_href,
    resolve_next_page, ExtractError, ExtractResult, ListingPage, PARAGRAPH_SEPARATOR,
};
pub use fetcher::{build_http_client, fetch_url, FetchError, Fetcher};
pub use walker::{PaginationWalker, WalkHandle, WalkReport};
