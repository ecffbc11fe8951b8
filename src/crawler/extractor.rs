//! HTML extraction for the portal's page layouts
//!
//! Every function here is pure: it takes an already parsed [`Html`] document
//! and returns domain values. Markup the portal is expected to carry
//! (navigation, article heading and body) is a hard requirement and its
//! absence is an [`ExtractError`]. The article list on a listing page is
//! allowed to be missing or empty.
//!
//! Layout contract:
//!
//! | Item | Selector |
//! |------|----------|
//! | Navigation | `nav.nav` |
//! | Category entry N | `li.nav_color_N a[href]` |
//! | Article list | `div.article_list` |
//! | Article entry | `div.list_content a[href]` (first link) |
//! | Pager | `div.pager-link-option a.btn[href]` |
//! | Article title | first `h1` |
//! | Article body | `div.article p` |

use crate::model::Category;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Separator placed between paragraphs of an article body
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

const NAV_SELECTOR: &str = "nav.nav";
const NAV_ENTRY_SELECTOR: &str = "li[class*='nav_color_']";
const NAV_ENTRY_CLASS_PREFIX: &str = "nav_color_";
const ARTICLE_LIST_SELECTOR: &str = "div.article_list";
const ARTICLE_ENTRY_SELECTOR: &str = "div.list_content";
const PAGER_SELECTOR: &str = "div.pager-link-option";
const PAGER_LINK_SELECTOR: &str = "a.btn";
const TITLE_SELECTOR: &str = "h1";
const ARTICLE_BODY_SELECTOR: &str = "div.article";
const PARAGRAPH_SELECTOR: &str = "p";
const LINK_SELECTOR: &str = "a[href]";

/// Structural errors: the page does not have the markup the portal is known to use
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Missing element: {0}")]
    MissingElement(String),

    #[error("Element {element} has no {attribute} attribute")]
    MissingAttribute { element: String, attribute: String },

    #[error("Expected {expected} categories, found {found}")]
    CategoryCount { expected: usize, found: usize },

    #[error("Empty {0}")]
    EmptyValue(String),

    #[error("Invalid selector {selector}: {message}")]
    Selector { selector: String, message: String },
}

/// Result type for extraction
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Compiles a CSS selector
fn selector(css: &str) -> ExtractResult<Selector> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

/// Returns the first descendant of `scope` matching `css`
fn first_in<'a>(scope: ElementRef<'a>, css: &str) -> ExtractResult<Option<ElementRef<'a>>> {
    let sel = selector(css)?;
    let found = scope.select(&sel).next();
    Ok(found)
}

/// Concatenated text of an element and its descendants
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Reads the navigation's category entries
///
/// Entries are looked up by their `nav_color_1` .. `nav_color_N` classes, in
/// that order, where N is `expected`. The navigation must contain exactly
/// `expected` such entries; anything else means the site layout changed.
///
/// Category hrefs are returned as written in the markup.
pub fn extract_categories(document: &Html, expected: usize) -> ExtractResult<Vec<Category>> {
    let nav_selector = selector(NAV_SELECTOR)?;
    let nav = document
        .select(&nav_selector)
        .next()
        .ok_or_else(|| ExtractError::MissingElement(NAV_SELECTOR.to_string()))?;

    let entry_selector = selector(NAV_ENTRY_SELECTOR)?;
    let found = nav
        .select(&entry_selector)
        .filter(|li| {
            li.value()
                .classes()
                .any(|class| class.starts_with(NAV_ENTRY_CLASS_PREFIX))
        })
        .count();
    if found != expected {
        return Err(ExtractError::CategoryCount { expected, found });
    }

    let mut categories = Vec::with_capacity(expected);
    for index in 1..=expected {
        let entry_css = format!("li.{}{}", NAV_ENTRY_CLASS_PREFIX, index);
        let entry = first_in(nav, &entry_css)?
            .ok_or_else(|| ExtractError::MissingElement(entry_css.clone()))?;

        let link = first_in(entry, "a")?
            .ok_or_else(|| ExtractError::MissingElement(format!("{} a", entry_css)))?;
        let url = link
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .ok_or_else(|| ExtractError::MissingAttribute {
                element: format!("{} a", entry_css),
                attribute: "href".to_string(),
            })?;

        let name = element_text(link).trim().to_string();
        if name.is_empty() {
            return Err(ExtractError::EmptyValue(format!("category name in {}", entry_css)));
        }

        categories.push(Category::new(url, name));
    }

    Ok(categories)
}

/// Reads the article links of a listing page
///
/// Takes the first link of every entry in the article list. A page without
/// an article list, or entries without links, yields fewer (possibly zero)
/// URLs; that is a sparse page, not an error.
pub fn extract_article_urls(document: &Html) -> Vec<String> {
    let (Ok(list_selector), Ok(entry_selector), Ok(link_selector)) = (
        Selector::parse(ARTICLE_LIST_SELECTOR),
        Selector::parse(ARTICLE_ENTRY_SELECTOR),
        Selector::parse(LINK_SELECTOR),
    ) else {
        return Vec::new();
    };

    let Some(list) = document.select(&list_selector).next() else {
        tracing::debug!("Listing page has no {}", ARTICLE_LIST_SELECTOR);
        return Vec::new();
    };

    list.select(&entry_selector)
        .filter_map(|entry| entry.select(&link_selector).next())
        .filter_map(|link| link.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}

/// Finds the link to the next listing page
///
/// Returns `Ok(None)` when the page has no pager, which ends pagination.
/// The pager's href is a fragment appended verbatim to `current_url` with
/// its query string removed: `https://site/cat?page=2` and `?page=3` give
/// `https://site/cat?page=3`.
pub fn extract_next_page_url(document: &Html, current_url: &str) -> ExtractResult<Option<String>> {
    let pager_selector = selector(PAGER_SELECTOR)?;
    let Some(pager) = document.select(&pager_selector).next() else {
        return Ok(None);
    };

    let link = first_in(pager, PAGER_LINK_SELECTOR)?.ok_or_else(|| {
        ExtractError::MissingElement(format!("{} {}", PAGER_SELECTOR, PAGER_LINK_SELECTOR))
    })?;
    let fragment = link
        .value()
        .attr("href")
        .ok_or_else(|| ExtractError::MissingAttribute {
            element: format!("{} {}", PAGER_SELECTOR, PAGER_LINK_SELECTOR),
            attribute: "href".to_string(),
        })?;

    Ok(Some(resolve_next_page(current_url, fragment)))
}

/// Joins a pager fragment onto the query-less part of the current URL
pub fn resolve_next_page(current_url: &str, fragment: &str) -> String {
    let base = current_url.split('?').next().unwrap_or(current_url);
    format!("{}{}", base, fragment)
}

/// Makes an href from a category or article link absolute
///
/// Absolute hrefs are returned unchanged; relative ones are joined onto the
/// URL of the page they appeared on. Pager links do not go through here, see
/// [`resolve_next_page`].
pub fn resolve_href(page_url: &str, href: &str) -> String {
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    Url::parse(page_url)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Reads the text of the first `<h1>`
///
/// The text is returned as written, surrounding whitespace included, since it
/// is what the article's storage key is computed from. A heading without
/// text (an image logo, say) gives an empty title.
pub fn extract_title(document: &Html) -> ExtractResult<String> {
    let title_selector = selector(TITLE_SELECTOR)?;
    let heading = document
        .select(&title_selector)
        .next()
        .ok_or_else(|| ExtractError::MissingElement(TITLE_SELECTOR.to_string()))?;

    Ok(element_text(heading))
}

/// Joins the text of every paragraph in the article body with a blank line
pub fn extract_content(document: &Html) -> ExtractResult<String> {
    let body_selector = selector(ARTICLE_BODY_SELECTOR)?;
    let body = document
        .select(&body_selector)
        .next()
        .ok_or_else(|| ExtractError::MissingElement(ARTICLE_BODY_SELECTOR.to_string()))?;

    let paragraph_selector = selector(PARAGRAPH_SELECTOR)?;
    let paragraphs: Vec<String> = body.select(&paragraph_selector).map(element_text).collect();

    Ok(paragraphs.join(PARAGRAPH_SEPARATOR))
}

/// What the walker needs from one listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// Article hrefs in page order
    pub article_urls: Vec<String>,

    /// Next listing page, if the pager is present
    pub next_page_url: Option<String>,
}

/// Parses a listing page's markup
///
/// The parsed document does not outlive this call, so callers in async
/// code never hold it across an await point.
pub fn parse_listing_page(markup: &str, current_url: &str) -> ExtractResult<ListingPage> {
    let document = Html::parse_document(markup);
    Ok(ListingPage {
        article_urls: extract_article_urls(&document),
        next_page_url: extract_next_page_url(&document, current_url)?,
    })
}

/// Parses an article page into its title and body
pub fn parse_article_page(markup: &str) -> ExtractResult<(String, String)> {
    let document = Html::parse_document(markup);
    let title = extract_title(&document)?;
    let content = extract_content(&document)?;
    Ok((title, content))
}

/// Parses the portal root and reads its categories
pub fn parse_categories(markup: &str, expected: usize) -> ExtractResult<Vec<Category>> {
    let document = Html::parse_document(markup);
    extract_categories(&document, expected)
}
